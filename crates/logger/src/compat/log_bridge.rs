//! Bridge from the `log` crate to proven-logger

use super::is_own_target;
use crate::{Fields, Level, Logger};

use log::kv::{self, Key, Value, VisitSource};
use log::{LevelFilter, Log, Metadata, Record as LogRecord};
use std::sync::Arc;

/// Wrapper to implement the log crate's Log trait
#[derive(Debug)]
pub struct LogBridge {
    logger: Arc<Logger>,
}

impl LogBridge {
    /// Create a new log bridge
    pub const fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }

    /// The most verbose `log` level the logger accepts
    pub fn max_level(&self) -> LevelFilter {
        level_filter(self.logger.level())
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        !is_own_target(metadata.target()) && self.logger.is_enabled(map_level(metadata.level()))
    }

    fn log(&self, record: &LogRecord<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = map_level(record.level());
        let message = record.args().to_string();

        let mut fields = FieldCollector(Fields::new());
        // Collection into memory only fails if a value refuses to render
        let _ = record.key_values().visit(&mut fields);

        if fields.0.is_empty() {
            self.logger.log(level, message);
        } else {
            self.logger.with_fields(fields.0).log(level, message);
        }
    }

    fn flush(&self) {
        self.logger.flush();
    }
}

struct FieldCollector(Fields);

impl<'kvs> VisitSource<'kvs> for FieldCollector {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        self.0.insert(key.as_str(), value);
        Ok(())
    }
}

/// Map log levels to our levels
fn map_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug => Level::Debug,
        log::Level::Trace => Level::Trace,
    }
}

fn level_filter(threshold: Level) -> LevelFilter {
    match threshold {
        Level::Trace => LevelFilter::Trace,
        Level::Debug => LevelFilter::Debug,
        Level::Info => LevelFilter::Info,
        Level::Warn => LevelFilter::Warn,
        Level::Error => LevelFilter::Error,
        // `log` has nothing above error
        Level::Fatal | Level::Panic => LevelFilter::Off,
    }
}

/// Initialize the log crate to use proven-logger
///
/// This will capture all logs from crates using the `log` crate macros.
///
/// # Example
/// ```no_run
/// use proven_logger::{Config, Logger, compat::init_log_bridge};
/// use std::sync::Arc;
///
/// let logger = Arc::new(Logger::new(&Config::default()).unwrap());
/// init_log_bridge(logger).expect("Failed to set log bridge");
/// ```
///
/// # Errors
///
/// Returns an error if a global `log` logger is already installed.
pub fn init_log_bridge(logger: Arc<Logger>) -> Result<(), log::SetLoggerError> {
    // log::set_logger requires 'static
    let bridge: &'static LogBridge = Box::leak(Box::new(LogBridge::new(logger)));

    log::set_logger(bridge)?;
    log::set_max_level(bridge.max_level());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Config;
    use crate::test_support::CaptureSink;

    fn bridge(level: &str) -> (LogBridge, CaptureSink) {
        let capture = CaptureSink::new();
        let logger = Logger::builder(Config::default().with_level(level))
            .console(Arc::new(capture.clone()))
            .build()
            .unwrap();
        (LogBridge::new(Arc::new(logger)), capture)
    }

    #[test]
    fn test_forwards_with_mapped_level() {
        let (bridge, capture) = bridge("trace");

        bridge.log(
            &LogRecord::builder()
                .level(log::Level::Warn)
                .target("my_app::db")
                .args(format_args!("pool exhausted"))
                .build(),
        );

        assert!(capture.contains("[WARN] pool exhausted"));
    }

    #[test]
    fn test_key_values_become_fields() {
        let (bridge, capture) = bridge("trace");
        let kvs: &[(&str, i64)] = &[("retries", 3)];

        bridge.log(
            &LogRecord::builder()
                .level(log::Level::Info)
                .target("my_app")
                .args(format_args!("reconnected"))
                .key_values(&kvs)
                .build(),
        );

        assert!(capture.contains("[INFO] reconnected retries=3"));
    }

    #[test]
    fn test_respects_threshold() {
        let (bridge, capture) = bridge("warn");

        bridge.log(
            &LogRecord::builder()
                .level(log::Level::Info)
                .target("my_app")
                .args(format_args!("hidden"))
                .build(),
        );

        assert!(capture.bytes().is_empty());
        assert_eq!(bridge.max_level(), LevelFilter::Warn);
    }

    #[test]
    fn test_skips_own_targets() {
        let (bridge, capture) = bridge("trace");

        bridge.log(
            &LogRecord::builder()
                .level(log::Level::Error)
                .target("proven_logger_file::rotating")
                .args(format_args!("failed to rotate log file"))
                .build(),
        );

        assert!(capture.bytes().is_empty());
    }

    #[test]
    fn test_forwards_crates_sharing_the_name_prefix() {
        let (bridge, capture) = bridge("trace");

        bridge.log(
            &LogRecord::builder()
                .level(log::Level::Error)
                .target("proven_logger_viewer::ui")
                .args(format_args!("viewer crashed"))
                .build(),
        );

        assert!(capture.contains("[ERRO] viewer crashed"));
    }

    #[test]
    fn test_level_filter_above_error_is_off() {
        assert_eq!(level_filter(Level::Fatal), LevelFilter::Off);
        assert_eq!(level_filter(Level::Trace), LevelFilter::Trace);
    }
}
