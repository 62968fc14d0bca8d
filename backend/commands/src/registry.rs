/// Command registry: validated specs paired with their handlers.
///
/// Readers take a snapshot (`Arc<Vec<..>>`) and never block writers for
/// longer than a pointer swap; a message dispatched mid-registration sees
/// either the old or the new list, never a half-updated entry.
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::dispatch::CommandHandler;
use crate::error::SchemaError;
use crate::format::validate_command;
use crate::slash::{SlashCommand, project_registry};
use crate::types::CommandSpec;

/// A registered command. Its `CommandSpec` never changes after registration.
pub struct Command {
    pub spec: CommandSpec,
    pub handler: Arc<dyn CommandHandler>,
}

impl Command {
    pub fn new(spec: CommandSpec, handler: Arc<dyn CommandHandler>) -> Self {
        Self { spec, handler }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("spec", &self.spec).finish_non_exhaustive()
    }
}

pub type Snapshot = Arc<Vec<Arc<Command>>>;

#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<Snapshot>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a command.
    ///
    /// Re-registering an existing name replaces it in place, keeping its
    /// position in iteration order.
    pub fn register(
        &self,
        spec: CommandSpec,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), SchemaError> {
        validate_command(&spec)?;
        let name = spec.name.clone();
        let entry = Arc::new(Command::new(spec, handler));

        let replaced = self.update(|commands| {
            match commands.iter_mut().find(|c| c.spec.name == entry.spec.name) {
                Some(slot) => {
                    *slot = entry;
                    true
                }
                None => {
                    commands.push(entry);
                    false
                }
            }
        });

        if replaced {
            info!(command = %name, "[Commands] Replaced command");
        } else {
            debug!(command = %name, "[Commands] Registered command");
        }
        Ok(())
    }

    /// Remove a command. Returns whether it was registered.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.update(|commands| {
            let before = commands.len();
            commands.retain(|c| c.spec.name != name);
            commands.len() != before
        });
        if removed {
            debug!(command = %name, "[Commands] Unregistered command");
        }
        removed
    }

    /// Swap the handler of a registered command, keeping its spec.
    pub fn set_handler(&self, name: &str, handler: Arc<dyn CommandHandler>) -> bool {
        self.update(|commands| match commands.iter_mut().find(|c| c.spec.name == name) {
            Some(slot) => {
                *slot = Arc::new(Command::new(slot.spec.clone(), handler));
                true
            }
            None => false,
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<Command>> {
        self.snapshot().iter().find(|c| c.spec.name == name).cloned()
    }

    /// Consistent view of all commands in registration order.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.commands.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn names(&self) -> Vec<String> {
        self.snapshot().iter().map(|c| c.spec.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Slash command declarations for every exportable command.
    ///
    /// Derived from the current specs on each call.
    pub fn slash_commands(&self) -> Vec<SlashCommand> {
        let snapshot = self.snapshot();
        project_registry(snapshot.iter().map(|c| &c.spec))
    }

    fn update<T>(&self, mutate: impl FnOnce(&mut Vec<Arc<Command>>) -> T) -> T {
        let mut guard = self.commands.write().unwrap_or_else(PoisonError::into_inner);
        let mut next: Vec<Arc<Command>> = guard.iter().cloned().collect();
        let result = mutate(&mut next);
        *guard = Arc::new(next);
        result
    }
}
