//! Prefix and activator resolution.
//!
//! The longest matching trigger wins regardless of registration order: a
//! later match replaces the current best only when it extends it, so
//! `shell` beats `sh` for `!shell status` whichever was registered first.

use std::sync::Arc;

use chatcmd_logging::CommandEvent;

use crate::observer::DispatchObserver;
use crate::registry::Command;

/// How prefixes and triggers are compared against message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    pub case_insensitive: bool,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self { case_insensitive: true }
    }
}

impl MatchPolicy {
    /// Strip `prefix` from the start of `text` under this policy.
    ///
    /// Returns the remainder as a slice of `text`, so byte offsets stay
    /// correct even when case folding changes character widths.
    pub fn strip<'t>(&self, text: &'t str, prefix: &str) -> Option<&'t str> {
        if !self.case_insensitive {
            return text.strip_prefix(prefix);
        }
        let mut chars = text.char_indices();
        let mut end = 0;
        for expected in prefix.chars() {
            let (index, actual) = chars.next()?;
            if actual != expected && !actual.to_lowercase().eq(expected.to_lowercase()) {
                return None;
            }
            end = index + actual.len_utf8();
        }
        Some(&text[end..])
    }

    pub fn starts_with(&self, text: &str, prefix: &str) -> bool {
        self.strip(text, prefix).is_some()
    }
}

/// A message that resolved to a command.
#[derive(Clone)]
pub struct Activation {
    /// The configured prefix that matched.
    pub prefix: String,
    pub command: Arc<Command>,
    /// The winning trigger, group-qualified where applicable.
    pub activator: String,
    /// Message text after prefix and activator, leading whitespace trimmed.
    pub remainder: String,
}

impl Activation {
    /// What the user typed to invoke the command, e.g. `!shell`.
    pub fn invocation(&self) -> String {
        format!("{}{}", self.prefix, self.activator)
    }
}

impl std::fmt::Debug for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Activation")
            .field("prefix", &self.prefix)
            .field("command", &self.command.spec.name)
            .field("activator", &self.activator)
            .field("remainder", &self.remainder)
            .finish()
    }
}

pub struct ActivatorResolver<'a> {
    policy: MatchPolicy,
    observer: &'a dyn DispatchObserver,
}

impl<'a> ActivatorResolver<'a> {
    pub fn new(policy: MatchPolicy, observer: &'a dyn DispatchObserver) -> Self {
        Self { policy, observer }
    }

    /// First configured prefix the message starts with, and the text after it.
    pub fn determine_prefix<'m>(
        &self,
        prefixes: &'m [String],
        message: &'m str,
    ) -> Option<(&'m str, &'m str)> {
        prefixes
            .iter()
            .find_map(|prefix| self.policy.strip(message, prefix).map(|rest| (prefix.as_str(), rest)))
    }

    /// Resolve `message` to a command, or `None` if it is not a command.
    ///
    /// Every command is examined; there is no early exit on first match.
    pub fn resolve(
        &self,
        commands: &[Arc<Command>],
        prefixes: &[String],
        message: &str,
        message_id: &str,
    ) -> Option<Activation> {
        let (prefix, rest) = self.determine_prefix(prefixes, message)?;
        self.emit(message_id, CommandEvent::PrefixMatched { prefix: prefix.to_string() });

        let mut best: Option<(String, &Arc<Command>)> = None;

        for command in commands {
            let name = &command.spec.name;
            for trigger in command.spec.effective_triggers() {
                self.emit(
                    message_id,
                    CommandEvent::TriggerConsidered { command: name.clone(), trigger: trigger.clone() },
                );
                if !self.policy.starts_with(rest, &trigger) {
                    continue;
                }

                match best.as_ref().map(|(current, _)| current.clone()) {
                    None => {
                        self.emit(
                            message_id,
                            CommandEvent::TriggerMatched { command: name.clone(), trigger: trigger.clone() },
                        );
                        best = Some((trigger, command));
                    }
                    Some(previous) if self.extends(&trigger, &previous) => {
                        self.emit(
                            message_id,
                            CommandEvent::TriggerOverridden {
                                previous,
                                trigger: trigger.clone(),
                                command: name.clone(),
                            },
                        );
                        best = Some((trigger, command));
                    }
                    Some(previous) => {
                        self.emit(message_id, CommandEvent::TriggerRejected { best: previous, trigger });
                    }
                }
            }
        }

        let (activator, command) = best?;
        let remainder = self
            .policy
            .strip(rest, &activator)
            .unwrap_or_default()
            .trim_start()
            .to_string();

        self.emit(
            message_id,
            CommandEvent::CommandResolved {
                command: command.spec.name.clone(),
                activator: activator.clone(),
            },
        );

        Some(Activation {
            prefix: prefix.to_string(),
            command: Arc::clone(command),
            activator,
            remainder,
        })
    }

    /// A candidate replaces the best only if it is strictly longer and
    /// begins with it; an identical trigger keeps the earlier registration.
    fn extends(&self, candidate: &str, best: &str) -> bool {
        candidate.chars().count() > best.chars().count() && self.policy.starts_with(candidate, best)
    }

    fn emit(&self, message_id: &str, event: CommandEvent) {
        self.observer.observe(message_id, event);
    }
}
