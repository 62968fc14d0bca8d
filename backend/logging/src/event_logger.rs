//! Command Event Logger
//!
//! Discrete events emitted while a message is matched against the registry
//! and dispatched, serialized onto the `command_events` tracing target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CommandEvent {
    PrefixMatched {
        prefix: String,
    },
    TriggerConsidered {
        command: String,
        trigger: String,
    },
    TriggerMatched {
        command: String,
        trigger: String,
    },
    TriggerOverridden {
        previous: String,
        trigger: String,
        command: String,
    },
    /// A matching trigger lost the tie-break against the current best.
    TriggerRejected {
        best: String,
        trigger: String,
    },
    CommandResolved {
        command: String,
        activator: String,
    },
    GuardRejected {
        command: String,
        guard: String,
    },
    ParseFailed {
        command: String,
        error: String,
    },
    CommandCompleted {
        command: String,
    },
    HandlerFailed {
        command: String,
        error: String,
    },
    /// The directory or a channel action failed mid-dispatch.
    CollaboratorFailed {
        command: String,
        stage: String,
        error: String,
    },
}

impl CommandEvent {
    /// Failure events are logged louder than matching chatter.
    fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ParseFailed { .. } | Self::HandlerFailed { .. } | Self::CollaboratorFailed { .. }
        )
    }

    fn is_matching_detail(&self) -> bool {
        matches!(
            self,
            Self::TriggerConsidered { .. }
                | Self::TriggerMatched { .. }
                | Self::TriggerOverridden { .. }
                | Self::TriggerRejected { .. }
        )
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: CommandEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Logs a command event, redacting free text that may carry user secrets.
    pub fn log_event(message_id: &str, mut event: CommandEvent) {
        match &mut event {
            CommandEvent::ParseFailed { error, .. }
            | CommandEvent::HandlerFailed { error, .. }
            | CommandEvent::CollaboratorFailed { error, .. } => {
                *error = redact_sensitive_data(error);
            }
            _ => {}
        }

        let entry = EventLogEntry {
            message_id: message_id.into(),
            timestamp: Utc::now(),
            event,
        };
        let payload = serde_json::to_string(&entry).unwrap_or_default();

        if entry.event.is_failure() {
            warn!(target: "command_events", event = %payload, "Command event");
        } else if entry.event.is_matching_detail() {
            debug!(target: "command_events", event = %payload, "Command event");
        } else {
            info!(target: "command_events", event = %payload, "Command event");
        }
    }
}
