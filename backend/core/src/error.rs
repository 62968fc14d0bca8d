use thiserror::Error;

/// Top-level error type for front ends built on chatcmd.
///
/// Library crates keep their own precise errors; this is what a binary
/// reports once those have been classified.
#[derive(Debug, Error)]
pub enum ChatCmdError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("command '{command}' rejected at registration: {message}")]
    RegistrationFailed { command: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
