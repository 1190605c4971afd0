//! Destinations that accept formatted log lines

use crate::error::{Error, Result};

use parking_lot::Mutex;
use proven_logger_file::{AppendFile, RotatingFile};
use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

/// Identity of a destination
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    /// The console stream
    Console,
    /// A file on disk
    File(PathBuf),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => f.write_str("console"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A destination for formatted log lines.
///
/// Each call to [`Sink::write`] carries one complete line and must reach the
/// destination without interleaving with other writers.
pub trait Sink: Send + Sync + fmt::Debug + 'static {
    /// Write one formatted line
    fn write(&self, bytes: &[u8]) -> Result<()>;

    /// Flush buffered output through to the destination
    fn flush(&self) -> Result<()>;

    /// Whether the destination is a terminal that can show colors
    fn is_interactive(&self) -> bool {
        false
    }

    /// Which destination this is
    fn destination(&self) -> Destination;
}

/// Writes to stdout, or to any writer standing in for it.
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
    interactive: bool,
}

impl ConsoleSink {
    /// Console sink on the process stdout
    pub fn stdout() -> Self {
        Self {
            interactive: io::stdout().is_terminal(),
            out: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Console sink writing to `writer`
    pub fn from_writer(writer: impl Write + Send + 'static, interactive: bool) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            interactive,
        }
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("interactive", &self.interactive)
            .finish_non_exhaustive()
    }
}

impl Sink for ConsoleSink {
    fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut out = self.out.lock();
        out.write_all(bytes)
            .and_then(|()| out.flush())
            .map_err(|e| Error::Io("error writing to console", e))
    }

    fn flush(&self) -> Result<()> {
        self.out
            .lock()
            .flush()
            .map_err(|e| Error::Io("error flushing console", e))
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn destination(&self) -> Destination {
        Destination::Console
    }
}

impl Sink for AppendFile {
    fn write(&self, bytes: &[u8]) -> Result<()> {
        Ok(Self::write(self, bytes)?)
    }

    fn flush(&self) -> Result<()> {
        Ok(Self::flush(self)?)
    }

    fn destination(&self) -> Destination {
        Destination::File(self.path().to_path_buf())
    }
}

impl Sink for RotatingFile {
    fn write(&self, bytes: &[u8]) -> Result<()> {
        Ok(Self::write(self, bytes)?)
    }

    fn flush(&self) -> Result<()> {
        Ok(Self::flush(self)?)
    }

    fn destination(&self) -> Destination {
        Destination::File(self.path().to_path_buf())
    }
}
