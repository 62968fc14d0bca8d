//! Error taxonomy: registration-time schema errors, per-message parse
//! errors, and collaborator failures surfaced by the dispatcher.

use thiserror::Error;

use crate::types::ArgKind;

/// A command or argument schema was rejected at registration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("command name cannot be empty")]
    EmptyCommandName,

    #[error("command '{command}' declares an empty trigger")]
    EmptyTrigger { command: String },

    #[error("command '{command}' is missing a description")]
    MissingCommandDescription { command: String },

    #[error("command '{command}' has a description of {length} characters (max {max})")]
    CommandDescriptionTooLong { command: String, length: usize, max: usize },

    #[error("command '{command}' is owner-only and cannot be exported as a slash command")]
    OwnerOnlyExported { command: String },

    #[error("command '{command}' overrides its slash trigger but is text-only")]
    SlashTriggerOnTextOnly { command: String },

    #[error("command '{command}' is flattened but belongs to no group")]
    FlattenedWithoutGroup { command: String },

    #[error("argument #{position} has an empty symbol")]
    EmptySymbol { position: usize },

    #[error("argument '{symbol}' is declared more than once")]
    DuplicateSymbol { symbol: String },

    #[error("argument '{symbol}' is required but follows an optional argument")]
    RequiredAfterOptional { symbol: String },

    #[error("argument '{symbol}' is missing a description")]
    MissingArgumentDescription { symbol: String },

    #[error("argument '{symbol}' has a description of {length} characters (max {max})")]
    ArgumentDescriptionTooLong { symbol: String, length: usize, max: usize },

    #[error("argument '{symbol}' of type {kind} cannot declare choices")]
    ChoicesNotAllowed { symbol: String, kind: ArgKind },

    #[error("argument '{symbol}' declares {count} choices (max {max})")]
    TooManyChoices { symbol: String, count: usize, max: usize },

    #[error("choice '{choice}' of argument '{symbol}' is not a valid {kind}")]
    ChoiceTypeMismatch { symbol: String, choice: String, kind: ArgKind },

    #[error("choice '{choice}' of argument '{symbol}' falls outside its length or range limits")]
    ChoiceOutsideLimits { symbol: String, choice: String },

    #[error("argument '{symbol}' of type {kind} cannot declare a maximum length")]
    MaxLengthNotAllowed { symbol: String, kind: ArgKind },

    #[error("argument '{symbol}' of type {kind} cannot declare numeric bounds")]
    BoundsNotAllowed { symbol: String, kind: ArgKind },

    #[error("argument '{symbol}' has min_value {min} above max_value {max}")]
    InvertedBounds { symbol: String, min: f64, max: f64 },

    #[error("argument '{symbol}' declares a default but is not optional")]
    DefaultOnRequired { symbol: String },

    #[error("default of argument '{symbol}' is not a valid {kind}")]
    DefaultTypeMismatch { symbol: String, kind: ArgKind },
}

/// Message text could not be decoded against a command's schema.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("not enough arguments: '{symbol}' ({kind}) is required")]
    NotEnoughArguments { symbol: String, kind: ArgKind },

    #[error("'{token}' is not a valid integer for '{symbol}'")]
    InvalidInteger { symbol: String, token: String },

    #[error("'{token}' is not a valid number for '{symbol}'")]
    InvalidNumber { symbol: String, token: String },

    #[error("'{token}' is not a valid boolean for '{symbol}' (use yes/no, true/false, 1/0)")]
    InvalidBoolean { symbol: String, token: String },

    #[error("'{symbol}' is {length} characters long (max {max})")]
    MaxLengthExceeded { symbol: String, max: usize, length: usize },

    #[error("{value} is outside the allowed range for '{symbol}'")]
    OutOfRange { symbol: String, value: f64, min: Option<f64>, max: Option<f64> },

    #[error("'{token}' is not a valid choice for '{symbol}' (expected one of: {})", .choices.join(", "))]
    InvalidChoice { symbol: String, token: String, choices: Vec<String> },

    #[error("no user found for '{token}'")]
    UserNotFound { symbol: String, token: String },

    #[error("no channel found for '{token}'")]
    ChannelNotFound { symbol: String, token: String },

    /// The directory itself failed, as opposed to finding nothing.
    #[error("directory lookup for '{symbol}' failed: {cause}")]
    Directory { symbol: String, cause: anyhow::Error },
}

impl ParseError {
    /// The schema symbol the failure is attributed to.
    pub fn symbol(&self) -> &str {
        match self {
            ParseError::NotEnoughArguments { symbol, .. }
            | ParseError::InvalidInteger { symbol, .. }
            | ParseError::InvalidNumber { symbol, .. }
            | ParseError::InvalidBoolean { symbol, .. }
            | ParseError::MaxLengthExceeded { symbol, .. }
            | ParseError::OutOfRange { symbol, .. }
            | ParseError::InvalidChoice { symbol, .. }
            | ParseError::UserNotFound { symbol, .. }
            | ParseError::ChannelNotFound { symbol, .. }
            | ParseError::Directory { symbol, .. } => symbol,
        }
    }
}

/// A collaborator failed while a message was being dispatched.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("directory lookup failed while parsing '{command}': {cause}")]
    Directory { command: String, cause: anyhow::Error },

    #[error("channel action '{action}' failed: {cause}")]
    Action { action: &'static str, cause: anyhow::Error },

    #[error("responder failed: {0}")]
    Responder(anyhow::Error),
}

impl DispatchError {
    /// Which collaborator failed: `directory`, `responder`, or the action name.
    pub fn stage(&self) -> &'static str {
        match self {
            DispatchError::Directory { .. } => "directory",
            DispatchError::Action { action, .. } => *action,
            DispatchError::Responder(_) => "responder",
        }
    }
}
