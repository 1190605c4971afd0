//! Severity levels and lenient parsing of level names

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Log severity, ordered from most verbose to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Level {
    /// Finest-grained tracing
    Trace = 0,
    /// Debugging detail
    Debug = 1,
    /// Normal operation
    Info = 2,
    /// Something unexpected but recoverable
    Warn = 3,
    /// An operation failed
    Error = 4,
    /// Written, then the process exits
    Fatal = 5,
    /// Written, then the caller panics
    Panic = 6,
}

impl Level {
    /// Every level, most verbose first
    pub const ALL: [Self; 7] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Fatal,
        Self::Panic,
    ];

    /// Lowercase name, as accepted by the parser
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Panic => "panic",
        }
    }

    /// Full uppercase label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::Panic => "PANIC",
        }
    }

    /// Fixed four-character label
    pub const fn short_label(self) -> &'static str {
        match self {
            Self::Trace => "TRAC",
            Self::Debug => "DEBU",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERRO",
            Self::Fatal => "FATA",
            Self::Panic => "PANI",
        }
    }

    /// Parses `name`, falling back to [`Level::Trace`] on unknown input.
    pub fn parse_lenient(name: &str) -> Self {
        LevelParser::default().parse(name)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A level name that matched no known level
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a valid log level: {0:?}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        if name.eq_ignore_ascii_case("warning") {
            return Ok(Self::Warn);
        }

        Self::ALL
            .into_iter()
            .find(|level| name.eq_ignore_ascii_case(level.as_str()))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

/// Turns configured level names into levels, substituting `fallback` for
/// names it does not recognize.
///
/// The default fallback is [`Level::Trace`]: a misspelled level shows
/// everything rather than hiding output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelParser {
    fallback: Level,
}

impl Default for LevelParser {
    fn default() -> Self {
        Self::new(Level::Trace)
    }
}

impl LevelParser {
    /// Parser that maps unknown names to `fallback`
    pub const fn new(fallback: Level) -> Self {
        Self { fallback }
    }

    /// Level used for unrecognized names
    pub const fn fallback(&self) -> Level {
        self.fallback
    }

    /// Parses `name` case-insensitively. Never fails.
    pub fn parse(&self, name: &str) -> Level {
        name.parse().unwrap_or_else(|err: ParseLevelError| {
            tracing::debug!(fallback = %self.fallback, "{err}");
            self.fallback
        })
    }
}
