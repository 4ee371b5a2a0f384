//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide tracing with the format selected by `LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Subscriber configuration (filters, output format).
pub mod tracing;

pub use tracing::{LogFormat, ParseLogFormatError};
