/// Observability hook injected into activator resolution and dispatch.
use std::sync::{Mutex, PoisonError};

use chatcmd_logging::{CommandEvent, EventLogger};

/// Receives discrete events while a message is resolved and dispatched.
pub trait DispatchObserver: Send + Sync {
    fn observe(&self, message_id: &str, event: CommandEvent);
}

/// Forwards events to the structured event log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn observe(&self, message_id: &str, event: CommandEvent) {
        EventLogger::log_event(message_id, event);
    }
}

/// Keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CommandEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CommandEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl DispatchObserver for RecordingObserver {
    fn observe(&self, _message_id: &str, event: CommandEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}
