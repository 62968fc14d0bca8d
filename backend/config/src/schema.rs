//! Bot configuration schema.
//!
//! Field names are camelCase on disk. Optional sections are filled in by
//! [`crate::defaults::apply_all_defaults`] after loading.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_true() -> bool {
    true
}

/// Root configuration for a chatcmd bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Command prefixes, tried in order. `None` means "use the default".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefixes: Option<Vec<String>>,

    /// User ids allowed to run owner-only commands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners: Vec<String>,

    /// Match prefixes and triggers ignoring case.
    #[serde(default = "default_true")]
    pub case_insensitive: bool,

    /// Show a typing indicator for commands that leave `typing` unset.
    #[serde(default)]
    pub typing_default: bool,

    /// Delete the invoking message for commands that leave `delete_activator` unset.
    #[serde(default)]
    pub delete_activators: bool,

    /// Dispatch messages written by other bots.
    #[serde(default)]
    pub parse_bots: bool,

    /// Ignore every text message.
    #[serde(default)]
    pub disable_text_commands: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Entities known to the console front end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<DirectorySeed>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            prefixes: None,
            owners: Vec::new(),
            case_insensitive: true,
            typing_default: false,
            delete_activators: false,
            parse_bots: false,
            disable_text_commands: false,
            logging: None,
            directory: None,
        }
    }
}

impl BotConfig {
    /// Configured prefixes, or an empty slice before defaults are applied.
    pub fn prefix_list(&self) -> &[String] {
        self.prefixes.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `chatcmd_commands=debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Directory for the daily JSON log file. No file logging when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Emit console logs as JSON lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub users: Vec<UserSeed>,
    #[serde(default)]
    pub channels: Vec<ChannelSeed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSeed {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSeed {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_serde_defaults() {
        let config: BotConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, BotConfig::default());
        assert!(config.case_insensitive);
        assert!(config.prefix_list().is_empty());
    }

    #[test]
    fn parses_camel_case_fields() {
        let yaml = r#"
prefixes: ["!", "?"]
owners: ["42"]
caseInsensitive: false
typingDefault: true
parseBots: true
logging:
  level: debug
  json: true
directory:
  users:
    - { id: "1", name: ana }
    - { id: "7", name: robot, bot: true }
  channels:
    - { id: "10", name: general }
"#;
        let config: BotConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.prefix_list(), ["!", "?"]);
        assert_eq!(config.owners, ["42"]);
        assert!(!config.case_insensitive);
        assert!(config.typing_default);
        assert!(!config.delete_activators);
        assert!(config.parse_bots);
        let logging = config.logging.unwrap();
        assert_eq!(logging.level.as_deref(), Some("debug"));
        assert_eq!(logging.json, Some(true));
        let directory = config.directory.unwrap();
        assert!(directory.users[1].bot);
        assert_eq!(directory.channels[0].name, "general");
    }
}
