//! Structured logging for ImageGuard.
//!
//! Handles subscriber setup (console plus optional rolling NDJSON files),
//! secret/image redaction, and the per-invocation verdict event.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogger, Outcome, VerdictEvent};
pub use logger::{init_logger, LoggerGuard};
pub use redact::redact_sensitive_data;
