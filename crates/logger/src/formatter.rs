//! Rendering of records to text lines

use crate::config::Config;
use crate::error::{Error, Result};
use crate::{Level, Record};

use chrono::Local;
use chrono::format::{Item, StrftimeItems};
use std::io::Write;
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

/// Renders records as `<timestamp> [<LEVEL>] <message> key=value ...`.
///
/// Coloring is decided per destination: only interactive destinations are
/// colored, and never when colors are disabled. Files always receive plain
/// text.
#[derive(Debug, Clone)]
pub struct Formatter {
    time_format: String,
    show_full_level: bool,
    colors: bool,
}

impl Formatter {
    /// Create a formatter using a chrono strftime pattern for timestamps
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern contains an invalid specifier.
    pub fn new(time_format: impl Into<String>) -> Result<Self> {
        let time_format = time_format.into();

        if StrftimeItems::new(&time_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidTimeFormat(time_format));
        }

        Ok(Self {
            time_format,
            show_full_level: false,
            colors: true,
        })
    }

    /// Create a formatter from the timestamp and label settings of `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the configured pattern is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.format_time.as_str())?
            .with_full_level(config.show_full_level)
            .with_colors(!config.no_colors))
    }

    /// Print full level names instead of four-letter ones
    #[must_use]
    pub const fn with_full_level(mut self, show_full_level: bool) -> Self {
        self.show_full_level = show_full_level;
        self
    }

    /// Allow or forbid colors on interactive destinations
    #[must_use]
    pub const fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    /// Whether output for a destination should be colored
    #[inline]
    pub const fn colorize(&self, interactive: bool) -> bool {
        self.colors && interactive
    }

    /// Render `record` as one newline-terminated line
    pub fn format(&self, record: &Record<'_>, colorize: bool) -> Vec<u8> {
        let mut out = if colorize {
            Buffer::ansi()
        } else {
            Buffer::no_color()
        };

        let timestamp = record
            .timestamp
            .with_timezone(&Local)
            .format(&self.time_format);

        let label = if self.show_full_level {
            record.level.label()
        } else {
            record.level.short_label()
        };

        // Writes into an in-memory buffer cannot fail
        let _ = write!(out, "{timestamp} [");
        let _ = out.set_color(
            ColorSpec::new()
                .set_fg(Some(level_color(record.level)))
                .set_bold(true),
        );
        let _ = out.write_all(label.as_bytes());
        let _ = out.reset();
        let _ = write!(out, "] {}", record.message);

        for (key, value) in record.fields.iter() {
            if needs_quoting(value) {
                let _ = write!(out, " {key}={value:?}");
            } else {
                let _ = write!(out, " {key}={value}");
            }
        }

        let _ = out.write_all(b"\n");
        out.into_inner()
    }
}

const fn level_color(level: Level) -> Color {
    match level {
        Level::Trace | Level::Debug => Color::White,
        Level::Info => Color::Cyan,
        Level::Warn => Color::Yellow,
        Level::Error | Level::Fatal | Level::Panic => Color::Red,
    }
}

fn needs_quoting(value: &str) -> bool {
    value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '=' || c == '"')
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::Fields;
    use crate::config::DEFAULT_TIME_FORMAT;
    use chrono::{TimeZone, Utc};

    fn render(formatter: &Formatter, record: &Record<'_>) -> String {
        String::from_utf8(formatter.format(record, false)).unwrap()
    }

    #[test]
    fn test_plain_layout() {
        let formatter = Formatter::new(DEFAULT_TIME_FORMAT).unwrap();
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 45).unwrap();
        let fields = Fields::new().with("user", "alice").with("attempt", 2);
        let record = Record::new(Level::Info, "signed in")
            .with_fields(&fields)
            .with_timestamp(timestamp);

        let expected = format!(
            "{} [INFO] signed in user=alice attempt=2\n",
            timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S%.3f")
        );
        assert_eq!(render(&formatter, &record), expected);
    }

    #[test]
    fn test_short_and_full_labels() {
        let short = Formatter::new("%Y").unwrap();
        let full = short.clone().with_full_level(true);
        let record = Record::new(Level::Error, "boom");

        assert!(render(&short, &record).contains(" [ERRO] boom"));
        assert!(render(&full, &record).contains(" [ERROR] boom"));
    }

    #[test]
    fn test_colors_only_when_requested() {
        let formatter = Formatter::new("%Y").unwrap();
        let record = Record::new(Level::Warn, "careful");

        let colored = formatter.format(&record, true);
        let plain = formatter.format(&record, false);

        assert!(colored.contains(&0x1b));
        assert!(!plain.contains(&0x1b));
    }

    #[test]
    fn test_colorize_resolution() {
        let formatter = Formatter::new("%Y").unwrap();
        assert!(formatter.colorize(true));
        assert!(!formatter.colorize(false));

        let disabled = formatter.with_colors(false);
        assert!(!disabled.colorize(true));
    }

    #[test]
    fn test_values_needing_quotes() {
        let formatter = Formatter::new("%Y").unwrap();
        let fields = Fields::new()
            .with("path", "/tmp/a b")
            .with("empty", "")
            .with("plain", "ok");
        let record = Record::new(Level::Debug, "quoted").with_fields(&fields);

        let line = render(&formatter, &record);
        assert!(line.ends_with("[DEBU] quoted path=\"/tmp/a b\" empty=\"\" plain=ok\n"));
    }

    #[test]
    fn test_invalid_time_format() {
        assert!(matches!(
            Formatter::new("%Y %"),
            Err(Error::InvalidTimeFormat(_))
        ));
    }
}
