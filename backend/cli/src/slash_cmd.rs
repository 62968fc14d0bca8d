//! `chatcmd slash`: print slash command declarations as JSON.

use anyhow::{Context, Result};
use chatcmd_commands::SlashCommand;

use crate::demo::build_registry;

pub fn render(commands: &[SlashCommand], compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(commands)
    } else {
        serde_json::to_string_pretty(commands)
    };
    json.context("Failed to serialize slash commands")
}

pub fn run(compact: bool) -> Result<()> {
    let registry = build_registry()?;
    println!("{}", render(&registry.slash_commands(), compact)?);
    Ok(())
}
