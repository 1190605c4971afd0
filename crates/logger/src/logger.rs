//! Logger facade

use crate::config::Config;
use crate::error::Result;
use crate::formatter::Formatter;
use crate::routing::{Mode, RoutingPolicy};
use crate::sink::{ConsoleSink, Sink};
use crate::{Fields, Level, Record};

use std::borrow::Cow;
use std::fmt::{self, Display};
use std::sync::Arc;
use tracing::{debug, error};

/// Exit status used after a fatal record
pub const FATAL_EXIT_CODE: i32 = 1;

/// Called with [`FATAL_EXIT_CODE`] after a fatal record has been written
pub type ExitHandler = Arc<dyn Fn(i32) + Send + Sync>;

macro_rules! level_methods {
    ($($(#[$attr:meta])* $name:ident => $level:ident;)*) => {
        $(
            $(#[$attr])*
            #[inline]
            pub fn $name<'m>(&self, message: impl Into<Cow<'m, str>>) {
                self.log(Level::$level, message);
            }
        )*
    };
}

/// Leveled logger writing to the destinations selected by its [`Config`].
///
/// Records below the threshold are dropped before any formatting or I/O.
/// Writes are synchronous: each call returns once every destination has
/// accepted the line. Share it between threads with `Arc`.
pub struct Logger {
    threshold: Level,
    formatter: Formatter,
    routes: RoutingPolicy,
    exit: ExitHandler,
}

impl Logger {
    /// Build a logger writing console output to stdout
    ///
    /// # Errors
    ///
    /// Returns an error if a configured file cannot be opened or the
    /// timestamp pattern is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        Self::builder(config.clone()).build()
    }

    /// Start building a logger with custom console or exit behavior
    pub fn builder(config: Config) -> LoggerBuilder {
        LoggerBuilder {
            config,
            console: None,
            exit: None,
        }
    }

    /// The threshold level
    pub const fn level(&self) -> Level {
        self.threshold
    }

    /// Check if a level is enabled (for fast filtering)
    #[inline(always)]
    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.threshold
    }

    /// The output mode
    pub const fn mode(&self) -> Mode {
        self.routes.mode()
    }

    /// The formatter shared by all destinations
    pub const fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// Start a record carrying one field
    pub fn with_field(&self, key: impl Into<String>, value: impl Display) -> Entry<'_> {
        Entry {
            logger: self,
            fields: Fields::new().with(key, value),
        }
    }

    /// Start a record carrying `fields`
    pub fn with_fields(&self, fields: Fields) -> Entry<'_> {
        Entry {
            logger: self,
            fields,
        }
    }

    /// Log `message` at `level`
    pub fn log<'m>(&self, level: Level, message: impl Into<Cow<'m, str>>) {
        self.emit(level, &message.into(), None);
    }

    level_methods! {
        /// Log at trace level
        trace => Trace;
        /// Log at debug level
        debug => Debug;
        /// Log info
        info => Info;
        /// Log a warning
        warn => Warn;
        /// Log an error
        error => Error;
        /// Log, flush every destination, then exit the process with
        /// [`FATAL_EXIT_CODE`]
        fatal => Fatal;
        /// Log, then panic with the message
        panic => Panic;
    }

    /// Flush every destination
    pub fn flush(&self) {
        for sink in self.routes.sinks() {
            if let Err(e) = sink.flush() {
                error!(destination = %sink.destination(), "failed to flush log output: {e}");
            }
        }
    }

    fn emit(&self, level: Level, message: &str, fields: Option<&Fields>) {
        if self.is_enabled(level) {
            let mut record = Record::new(level, message);
            if let Some(fields) = fields {
                record = record.with_fields(fields);
            }
            self.dispatch(&record);
        }

        // Termination happens even if the record was filtered or its write failed
        match level {
            Level::Fatal => {
                self.flush();
                (self.exit)(FATAL_EXIT_CODE);
            }
            Level::Panic => panic!("{message}"),
            _ => {}
        }
    }

    fn dispatch(&self, record: &Record<'_>) {
        let mut plain = None;
        let mut colored = None;

        for sink in self.routes.route(record.level) {
            let line = if self.formatter.colorize(sink.is_interactive()) {
                colored.get_or_insert_with(|| self.formatter.format(record, true))
            } else {
                plain.get_or_insert_with(|| self.formatter.format(record, false))
            };

            if let Err(e) = sink.write(line) {
                error!(destination = %sink.destination(), "failed to write log record: {e}");
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("threshold", &self.threshold)
            .field("formatter", &self.formatter)
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

/// A record under construction: fields gathered so far, bound to a logger.
#[derive(Debug, Clone)]
pub struct Entry<'a> {
    logger: &'a Logger,
    fields: Fields,
}

impl Entry<'_> {
    /// Add or replace a field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.fields.insert(key, value);
        self
    }

    /// Add or replace several fields
    #[must_use]
    pub fn with_fields(mut self, fields: &Fields) -> Self {
        self.fields.merge(fields);
        self
    }

    /// Fields collected so far
    pub const fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Log `message` at `level` with the collected fields
    pub fn log<'m>(&self, level: Level, message: impl Into<Cow<'m, str>>) {
        self.logger.emit(level, &message.into(), Some(&self.fields));
    }

    level_methods! {
        /// Log at trace level
        trace => Trace;
        /// Log at debug level
        debug => Debug;
        /// Log info
        info => Info;
        /// Log a warning
        warn => Warn;
        /// Log an error
        error => Error;
        /// Log, flush, then exit the process
        fatal => Fatal;
        /// Log, then panic with the message
        panic => Panic;
    }
}

/// Builder for [`Logger`]
pub struct LoggerBuilder {
    config: Config,
    console: Option<Arc<dyn Sink>>,
    exit: Option<ExitHandler>,
}

impl LoggerBuilder {
    /// Use `sink` instead of stdout for console output
    #[must_use]
    pub fn console(mut self, sink: Arc<dyn Sink>) -> Self {
        self.console = Some(sink);
        self
    }

    /// Replace the process exit performed after fatal records
    #[must_use]
    pub fn exit_handler(mut self, handler: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.exit = Some(Arc::new(handler));
        self
    }

    /// Open the configured destinations and build the logger
    ///
    /// # Errors
    ///
    /// Returns an error if a configured file cannot be opened or the
    /// timestamp pattern is invalid.
    pub fn build(self) -> Result<Logger> {
        let threshold = self.config.threshold();
        let formatter = Formatter::from_config(&self.config)?;

        let console = self
            .console
            .unwrap_or_else(|| Arc::new(ConsoleSink::stdout()));
        let routes = RoutingPolicy::build(&self.config, threshold, console)?;

        debug!(mode = %routes.mode(), level = %threshold, "logger ready");

        Ok(Logger {
            threshold,
            formatter,
            routes,
            exit: self
                .exit
                .unwrap_or_else(|| Arc::new(|code| std::process::exit(code))),
        })
    }
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("config", &self.config)
            .field("console", &self.console)
            .finish_non_exhaustive()
    }
}
