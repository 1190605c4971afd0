//! Compatibility bridges for other logging crates
//!
//! Events whose target belongs to this crate (or its file crate) are never
//! forwarded, so the logger's own diagnostics cannot loop back into it.

#[cfg(feature = "log-compat")]
pub mod log_bridge;

#[cfg(feature = "tracing-compat")]
pub mod tracing_bridge;

#[cfg(feature = "log-compat")]
pub use log_bridge::{LogBridge, init_log_bridge};

#[cfg(feature = "tracing-compat")]
pub use tracing_bridge::{TracingBridge, init_tracing_bridge};

const OWN_CRATES: [&str; 2] = ["proven_logger", "proven_logger_file"];

/// Whether `target` names the logger's crates or one of their modules
pub(crate) fn is_own_target(target: &str) -> bool {
    OWN_CRATES.iter().any(|krate| {
        target
            .strip_prefix(krate)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}
