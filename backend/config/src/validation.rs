//! Config validation with path-qualified messages.

use crate::schema::BotConfig;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

/// Validate a config after defaults have been applied.
pub fn validate(config: &BotConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_prefixes(config, &mut report);
    validate_owners(config, &mut report);
    validate_directory(config, &mut report);
    report
}

fn validate_prefixes(config: &BotConfig, report: &mut ValidationReport) {
    let prefixes = config.prefix_list();
    if prefixes.is_empty() {
        report.error("prefixes", "At least one prefix is required");
        return;
    }

    let fold = |p: &str| if config.case_insensitive { p.to_lowercase() } else { p.to_string() };

    for (i, prefix) in prefixes.iter().enumerate() {
        let path = format!("prefixes[{i}]");
        if prefix.is_empty() {
            report.error(&path, "Prefix cannot be empty");
            continue;
        }
        let folded = fold(prefix);
        for earlier in prefixes[..i].iter().filter(|p| !p.is_empty()) {
            let earlier_folded = fold(earlier);
            if earlier_folded == folded {
                report.warn(&path, format!("Duplicate prefix '{prefix}'"));
                break;
            }
            if folded.starts_with(&earlier_folded) {
                report.warn(
                    &path,
                    format!("Prefix '{prefix}' never matches; earlier prefix '{earlier}' is tried first"),
                );
                break;
            }
        }
    }
}

fn validate_owners(config: &BotConfig, report: &mut ValidationReport) {
    for (i, owner) in config.owners.iter().enumerate() {
        if owner.trim().is_empty() {
            report.error(format!("owners[{i}]"), "Owner id cannot be blank");
        }
    }
}

fn validate_directory(config: &BotConfig, report: &mut ValidationReport) {
    let Some(directory) = &config.directory else { return };

    let mut seen = HashSet::new();
    for (i, user) in directory.users.iter().enumerate() {
        if user.id.trim().is_empty() {
            report.error(format!("directory.users[{i}].id"), "User id cannot be blank");
        } else if !seen.insert(user.id.as_str()) {
            report.warn(format!("directory.users[{i}].id"), format!("Duplicate user id '{}'", user.id));
        }
    }

    let mut seen = HashSet::new();
    for (i, channel) in directory.channels.iter().enumerate() {
        if channel.id.trim().is_empty() {
            report.error(format!("directory.channels[{i}].id"), "Channel id cannot be blank");
        } else if !seen.insert(channel.id.as_str()) {
            report.warn(
                format!("directory.channels[{i}].id"),
                format!("Duplicate channel id '{}'", channel.id),
            );
        }
    }
}
