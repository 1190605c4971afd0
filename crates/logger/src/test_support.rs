//! Test support utilities
//!
//! This module provides a sink that captures output in memory, for tests
//! that need to inspect what a logger wrote to the console.
//! It's only available when the `test-support` feature is enabled.

use crate::error::Result;
use crate::sink::{Destination, Sink};

use parking_lot::Mutex;
use std::sync::Arc;

/// A sink that captures everything written to it in memory
#[derive(Clone, Debug)]
pub struct CaptureSink {
    buffer: Arc<Mutex<Vec<u8>>>,
    interactive: bool,
}

impl CaptureSink {
    /// Create a non-interactive capture sink
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
            interactive: false,
        }
    }

    /// Create with the given interactive flag, to exercise colored output
    #[must_use]
    pub const fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Raw captured bytes
    pub fn bytes(&self) -> Vec<u8> {
        self.buffer.lock().clone()
    }

    /// Get all captured output
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    /// Captured output split into lines
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Check if output contains a specific string
    pub fn contains(&self, text: &str) -> bool {
        self.contents().contains(text)
    }

    /// Clear captured output
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Default for CaptureSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for CaptureSink {
    fn write(&self, bytes: &[u8]) -> Result<()> {
        self.buffer.lock().extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // No-op for in-memory sink
        Ok(())
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn destination(&self) -> Destination {
        Destination::Console
    }
}
