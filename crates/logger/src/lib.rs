//! Leveled logging to the console or to rotating files
//!
//! A [`Logger`] is built from a [`Config`] and picks one of three output
//! modes from the file paths it is given:
//! - no log file: every record goes to stdout
//! - a log file only: stdout plus an append-only file
//! - a log file and an error file: two size-rotated files, with warnings
//!   and worse duplicated into the error file
//!
//! Lines look like `2024-01-15 14:30:45.123 [INFO] message key=value`.
//! The level label is colored when the destination is a terminal.
//!
//! # Example
//! ```no_run
//! use proven_logger::{Config, Logger};
//!
//! let logger = Logger::new(&Config::default().with_level("debug"))?;
//! logger.info("service started");
//! logger.with_field("peer", "10.0.0.7").warn("slow handshake");
//! # Ok::<(), proven_logger::Error>(())
//! ```
//!
//! # Features
//! - `log-compat`: forward records of the `log` crate
//! - `tracing-compat`: forward tracing events through a subscriber layer
//! - `test-support`: an in-memory console sink for tests

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod formatter;
mod level;
mod logger;
mod record;
mod routing;
mod sink;

#[cfg(any(feature = "log-compat", feature = "tracing-compat"))]
pub mod compat;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{Config, DEFAULT_TIME_FORMAT};
pub use error::{Error, Result};
pub use formatter::Formatter;
pub use level::{Level, LevelParser, ParseLevelError};
pub use logger::{Entry, ExitHandler, FATAL_EXIT_CODE, Logger, LoggerBuilder};
pub use record::{Fields, Record};
pub use routing::{ERROR_FILE_LEVEL, Mode, Route, RoutingPolicy};
pub use sink::{ConsoleSink, Destination, Sink};

pub use proven_logger_file::RotationPolicy;
