//! `chatcmd-config`: bot configuration loading.
//!
//! Provides:
//! - Typed config schema
//! - YAML reading with `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with warnings and errors

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config_value, parse_config_value};
pub use schema::{BotConfig, ChannelSeed, DirectorySeed, LoggingConfig, UserSeed};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Load a config file, substitute env vars, apply defaults and validate.
///
/// Validation findings are logged. Whether errors are fatal is up to the
/// caller, which gets the report back.
pub async fn load_and_prepare(path: &Path) -> Result<(BotConfig, ValidationReport)> {
    let prepared = load_unlogged(path).await?;
    log_report(&prepared.1);
    Ok(prepared)
}

/// [`load_and_prepare`] without logging the report, for callers that set up
/// logging from the config itself.
pub async fn load_unlogged(path: &Path) -> Result<(BotConfig, ValidationReport)> {
    let value = load_config_value(path).await?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    prepare(value)
}

/// The in-memory half of [`load_and_prepare`], with an explicit environment.
pub fn prepare_with(value: &Value, env: &HashMap<String, String>) -> Result<(BotConfig, ValidationReport)> {
    let value = resolve_env_vars_with(value, env).context("Failed to resolve env vars in config")?;
    prepare(value)
}

fn prepare(value: Value) -> Result<(BotConfig, ValidationReport)> {
    let config: BotConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    let config = apply_all_defaults(config);
    let report = validate(&config);
    Ok((config, report))
}

pub fn log_report(report: &ValidationReport) {
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
}
