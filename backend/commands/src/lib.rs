//! Text command registry, activator resolution, typed argument parsing and
//! dispatch for chat bots.

pub mod activator;
pub mod args;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod observer;
pub mod parser;
pub mod reader;
pub mod registry;
pub mod slash;
pub mod types;

#[cfg(test)]
mod testing;

pub use activator::{Activation, ActivatorResolver, MatchPolicy};
pub use args::{ArgValue, ArgumentMap, Arguments};
pub use dispatch::{
    CommandContext, CommandDispatcher, CommandHandler, CommandResponse, DispatchOutcome,
    DispatchSettings, GuardFailure, Notification, Outcome, ResolvedFlags, Responder,
};
pub use error::{DispatchError, ParseError, SchemaError};
pub use format::{validate_arguments, validate_command};
pub use observer::{DispatchObserver, RecordingObserver, TracingObserver};
pub use parser::ArgumentParser;
pub use reader::TextReader;
pub use registry::{Command, CommandRegistry};
pub use slash::{SlashChoice, SlashCommand, SlashOption, SlashOptionKind, project_command, project_registry};
pub use types::{ArgDefault, ArgKind, ArgumentSpec, Choice, CommandFlags, CommandSpec, Literal};
