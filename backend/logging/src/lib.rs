//! Structured logging for chatcmd.
//!
//! Subscriber setup (console plus optional rolling NDJSON file), the command
//! event vocabulary emitted by activator resolution and dispatch, and secret
//! redaction applied to message text before it is logged.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{CommandEvent, EventLogEntry, EventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
