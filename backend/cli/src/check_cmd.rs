//! `chatcmd check`: validate the config and the command schemas.

use std::path::Path;

use chatcmd_config::{BotConfig, ValidationReport};
use chatcmd_core::ChatCmdError;

use crate::demo::build_registry;
use crate::terminal_output::{note_error, note_info, note_ok, note_warn};

/// `referenced` lists the `${VAR}` names the raw config file substitutes.
pub fn run(
    path: &Path,
    config: &BotConfig,
    report: &ValidationReport,
    referenced: &[String],
) -> Result<(), ChatCmdError> {
    println!("\n🔍 Checking {}\n", path.display());
    if !path.exists() {
        note_info("Config file not found; built-in defaults are in effect");
    }

    note_info(&format!("Prefixes: {}", config.prefix_list().join(" ")));
    note_info(&format!("Owners: {}", config.owners.len()));
    note_info(&format!(
        "Matching: {}",
        if config.case_insensitive { "case-insensitive" } else { "case-sensitive" }
    ));
    if !referenced.is_empty() {
        note_info(&format!("Environment: {}", env_summary(referenced)));
    }

    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }

    let registry = build_registry()?;
    note_info(&format!("{} commands registered", registry.len()));

    println!();
    if report.is_valid() {
        note_ok("Configuration is valid");
        Ok(())
    } else {
        Err(ChatCmdError::ConfigError(format!("{} error(s) in {}", report.errors.len(), path.display())))
    }
}

fn env_summary(referenced: &[String]) -> String {
    referenced.iter().map(|name| format!("${{{name}}}")).collect::<Vec<_>>().join(" ")
}
