//! Bridge from tracing to proven-logger

use super::is_own_target;
use crate::{Fields, Level, Logger};

use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{Event, Subscriber};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

/// A tracing layer that forwards events to proven-logger
///
/// Event fields become record fields. Names of the enclosing spans, outermost
/// first, prefix the message as `outer::inner: message`.
#[derive(Debug, Clone)]
pub struct TracingBridge {
    logger: Arc<Logger>,
}

impl TracingBridge {
    /// Create a new tracing bridge
    pub const fn new(logger: Arc<Logger>) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for TracingBridge
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_own_target(metadata.target()) {
            return;
        }

        let level = map_level(*metadata.level());
        if !self.logger.is_enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let spans: Vec<&str> = ctx
            .event_scope(event)
            .into_iter()
            .flat_map(|scope| scope.from_root())
            .map(|span| span.name())
            .collect();

        let message = if spans.is_empty() {
            visitor.message
        } else {
            format!("{}: {}", spans.join("::"), visitor.message)
        };

        self.logger.with_fields(visitor.fields).log(level, message);
    }
}

/// Map tracing levels to our levels
fn map_level(level: tracing::Level) -> Level {
    match level {
        tracing::Level::ERROR => Level::Error,
        tracing::Level::WARN => Level::Warn,
        tracing::Level::INFO => Level::Info,
        tracing::Level::DEBUG => Level::Debug,
        tracing::Level::TRACE => Level::Trace,
    }
}

/// Splits the `message` field from the rest
#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Fields,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_owned();
        } else {
            self.fields.insert(field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.insert(field.name(), format!("{value:?}"));
        }
    }
}

/// Initialize tracing to forward to proven-logger
///
/// This sets up a global subscriber that captures all tracing events.
///
/// # Example
/// ```no_run
/// use proven_logger::{Config, Logger, compat::init_tracing_bridge};
/// use std::sync::Arc;
///
/// let logger = Arc::new(Logger::new(&Config::default()).unwrap());
/// init_tracing_bridge(logger).expect("Failed to set tracing bridge");
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing_bridge(logger: Arc<Logger>) -> Result<(), SetGlobalDefaultError> {
    use tracing_subscriber::prelude::*;

    // No `log` forwarder is installed here, see the log bridge
    tracing::subscriber::set_global_default(
        tracing_subscriber::registry().with(TracingBridge::new(logger)),
    )
}
