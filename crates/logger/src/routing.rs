//! Selection of destinations per record

use crate::config::Config;
use crate::error::Result;
use crate::sink::Sink;
use crate::Level;

use proven_logger_file::{AppendFile, RotatingFile};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Records at or above this level also go to the error file in
/// [`Mode::DualFile`].
pub const ERROR_FILE_LEVEL: Level = Level::Warn;

/// Output mode, chosen by which file paths are configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No log file: everything goes to the console
    Console,
    /// Log file without error file: console plus one append-only file that
    /// is never rotated
    SingleFile,
    /// Log file and error file: two rotating files, no console
    DualFile,
}

impl Mode {
    /// Mode selected by `config`
    pub fn from_config(config: &Config) -> Self {
        match (config.log_file(), config.err_file()) {
            (None, _) => Self::Console,
            (Some(_), None) => Self::SingleFile,
            (Some(_), Some(_)) => Self::DualFile,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Console => "console",
            Self::SingleFile => "single-file",
            Self::DualFile => "dual-file",
        })
    }
}

/// Destinations of one record
pub type Route<'a> = SmallVec<[&'a dyn Sink; 2]>;

/// The sinks of a logger and the rule deciding which receive each record.
#[derive(Debug)]
pub struct RoutingPolicy {
    mode: Mode,
    threshold: Level,
    primary: Arc<dyn Sink>,
    secondary: Option<Arc<dyn Sink>>,
}

impl RoutingPolicy {
    /// Opens the sinks `config` calls for.
    ///
    /// `console` is used in the modes that write to the console.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured file cannot be opened.
    pub fn build(config: &Config, threshold: Level, console: Arc<dyn Sink>) -> Result<Self> {
        let mode = Mode::from_config(config);

        let (primary, secondary): (Arc<dyn Sink>, Option<Arc<dyn Sink>>) =
            match (config.log_file(), config.err_file()) {
                (None, _) => (console, None),
                (Some(log_file), None) => (console, Some(AppendFile::open(log_file)?)),
                (Some(log_file), Some(err_file)) => {
                    let policy = config.rotation_policy();
                    (
                        RotatingFile::open(log_file, policy)?,
                        Some(RotatingFile::open(err_file, policy)?),
                    )
                }
            };

        Ok(Self {
            mode,
            threshold,
            primary,
            secondary,
        })
    }

    /// The active mode
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Sinks that must receive a record at `level`
    pub fn route(&self, level: Level) -> Route<'_> {
        let mut route = Route::new();

        match self.mode {
            Mode::Console => route.push(self.primary.as_ref()),
            Mode::SingleFile => {
                if level >= self.threshold {
                    route.push(self.primary.as_ref());
                    route.extend(self.secondary.as_deref());
                }
            }
            Mode::DualFile => {
                if level >= self.threshold {
                    route.push(self.primary.as_ref());

                    if level >= ERROR_FILE_LEVEL {
                        if let Some(errors) = self.secondary.as_deref() {
                            // Both paths may name the same file
                            if !same_sink(self.primary.as_ref(), errors) {
                                route.push(errors);
                            }
                        }
                    }
                }
            }
        }

        route
    }

    /// Every distinct sink of this policy
    pub fn sinks(&self) -> Route<'_> {
        let mut sinks = Route::new();
        sinks.push(self.primary.as_ref());
        if let Some(secondary) = self.secondary.as_deref() {
            if !same_sink(self.primary.as_ref(), secondary) {
                sinks.push(secondary);
            }
        }
        sinks
    }
}

fn same_sink(a: &dyn Sink, b: &dyn Sink) -> bool {
    std::ptr::addr_eq(a, b)
}
