//! Mapping from the loaded config onto runtime collaborators.

use std::path::PathBuf;

use chatcmd_commands::{DispatchSettings, MatchPolicy};
use chatcmd_config::defaults::DEFAULT_LOG_LEVEL;
use chatcmd_config::BotConfig;
use chatcmd_core::{ChannelRef, StaticDirectory, UserRef};

pub fn dispatch_settings(config: &BotConfig) -> DispatchSettings {
    DispatchSettings {
        prefixes: config.prefix_list().to_vec(),
        owners: config.owners.clone(),
        policy: MatchPolicy { case_insensitive: config.case_insensitive },
        typing_default: config.typing_default,
        delete_activators: config.delete_activators,
        parse_bots: config.parse_bots,
        disable_text_commands: config.disable_text_commands,
    }
}

/// Static directory seeded from the config, or empty.
pub fn directory(config: &BotConfig) -> StaticDirectory {
    let Some(seed) = &config.directory else {
        return StaticDirectory::default();
    };
    let users = seed
        .users
        .iter()
        .map(|u| if u.bot { UserRef::bot(&u.id, &u.name) } else { UserRef::new(&u.id, &u.name) })
        .collect();
    let channels = seed.channels.iter().map(|c| ChannelRef::new(&c.id, &c.name)).collect();
    StaticDirectory::new(users, channels)
}

/// Logging options as `(dir, level, json)`.
pub fn logging(config: &BotConfig) -> (Option<PathBuf>, String, bool) {
    match &config.logging {
        Some(logging) => (
            logging.dir.clone(),
            logging.level.clone().unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            logging.json.unwrap_or(false),
        ),
        None => (None, DEFAULT_LOG_LEVEL.to_string(), false),
    }
}
