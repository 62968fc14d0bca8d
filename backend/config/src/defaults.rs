//! Default values applied to a freshly loaded config.

use crate::schema::{BotConfig, LoggingConfig};

/// Prefix used when the config names none.
pub const DEFAULT_PREFIX: &str = "!";

/// Log filter used when the config names none.
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub fn apply_all_defaults(config: BotConfig) -> BotConfig {
    let config = apply_prefix_defaults(config);
    apply_logging_defaults(config)
}

/// An absent prefix list becomes `["!"]`; an explicit empty list is left for
/// validation to reject.
fn apply_prefix_defaults(mut config: BotConfig) -> BotConfig {
    if config.prefixes.is_none() {
        config.prefixes = Some(vec![DEFAULT_PREFIX.to_string()]);
    }
    config
}

fn apply_logging_defaults(mut config: BotConfig) -> BotConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.json.is_none() {
        logging.json = Some(false);
    }
    config
}
