//! Registration-time validation of command and argument schemas.
//!
//! Validation walks the schema in declared order and stops at the first
//! violation; a schema is either accepted whole or rejected.

use std::collections::HashSet;

use crate::error::SchemaError;
use crate::parser::check_limits;
use crate::types::{ArgDefault, ArgKind, ArgumentSpec, CommandSpec};

/// Longest description the interaction system accepts.
pub const MAX_DESCRIPTION_LENGTH: usize = 100;

/// Most choices a single argument may declare.
pub const MAX_CHOICES: usize = 25;

/// Validate a whole command, including its argument schema.
pub fn validate_command(spec: &CommandSpec) -> Result<(), SchemaError> {
    let command = || spec.name.clone();

    if spec.name.trim().is_empty() {
        return Err(SchemaError::EmptyCommandName);
    }
    if spec.flags.owners_only && spec.text_only == Some(false) {
        return Err(SchemaError::OwnerOnlyExported { command: command() });
    }
    let text_only = spec.is_text_only();
    if text_only && spec.slash_trigger.is_some() {
        return Err(SchemaError::SlashTriggerOnTextOnly { command: command() });
    }
    if spec.flattened && spec.group.is_none() {
        return Err(SchemaError::FlattenedWithoutGroup { command: command() });
    }
    if spec.triggers.iter().any(|t| t.trim().is_empty()) {
        return Err(SchemaError::EmptyTrigger { command: command() });
    }

    if !text_only {
        let description = spec
            .description
            .as_deref()
            .ok_or_else(|| SchemaError::MissingCommandDescription { command: command() })?;
        let length = description.chars().count();
        if length > MAX_DESCRIPTION_LENGTH {
            return Err(SchemaError::CommandDescriptionTooLong {
                command: command(),
                length,
                max: MAX_DESCRIPTION_LENGTH,
            });
        }
    }

    match &spec.arguments {
        Some(schema) => validate_arguments(schema, !text_only),
        None => Ok(()),
    }
}

/// Validate an argument schema on its own.
///
/// `require_descriptions` is false only for text-only commands.
pub fn validate_arguments(
    schema: &[ArgumentSpec],
    require_descriptions: bool,
) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    let mut seen_optional = false;

    for (position, arg) in schema.iter().enumerate() {
        if arg.symbol.trim().is_empty() {
            return Err(SchemaError::EmptySymbol { position });
        }
        if !seen.insert(arg.symbol.as_str()) {
            return Err(SchemaError::DuplicateSymbol { symbol: arg.symbol.clone() });
        }
        if seen_optional && !arg.optional {
            return Err(SchemaError::RequiredAfterOptional { symbol: arg.symbol.clone() });
        }
        validate_argument(arg, require_descriptions)?;
        seen_optional |= arg.optional;
    }
    Ok(())
}

fn validate_argument(arg: &ArgumentSpec, require_descriptions: bool) -> Result<(), SchemaError> {
    let symbol = || arg.symbol.clone();

    match arg.description.as_deref() {
        None if require_descriptions => {
            return Err(SchemaError::MissingArgumentDescription { symbol: symbol() });
        }
        Some(description) if description.chars().count() > MAX_DESCRIPTION_LENGTH => {
            return Err(SchemaError::ArgumentDescriptionTooLong {
                symbol: symbol(),
                length: description.chars().count(),
                max: MAX_DESCRIPTION_LENGTH,
            });
        }
        _ => {}
    }

    if let Some(choices) = &arg.choices {
        if !arg.kind.accepts_choices() {
            return Err(SchemaError::ChoicesNotAllowed { symbol: symbol(), kind: arg.kind });
        }
        if choices.len() > MAX_CHOICES {
            return Err(SchemaError::TooManyChoices {
                symbol: symbol(),
                count: choices.len(),
                max: MAX_CHOICES,
            });
        }
        if let Some(bad) = choices.iter().find(|c| c.value.to_value(arg.kind).is_none()) {
            return Err(SchemaError::ChoiceTypeMismatch {
                symbol: symbol(),
                choice: bad.name.clone(),
                kind: arg.kind,
            });
        }
    }

    if arg.max_length.is_some() && !arg.kind.accepts_max_length() {
        return Err(SchemaError::MaxLengthNotAllowed { symbol: symbol(), kind: arg.kind });
    }

    if arg.min_value.is_some() || arg.max_value.is_some() {
        if !arg.kind.accepts_bounds() {
            return Err(SchemaError::BoundsNotAllowed { symbol: symbol(), kind: arg.kind });
        }
        if let (Some(min), Some(max)) = (arg.min_value, arg.max_value) {
            if min > max {
                return Err(SchemaError::InvertedBounds { symbol: symbol(), min, max });
            }
        }
    }

    // Choices must decode the same whether picked by name or typed as a value.
    if let Some(outside) = arg.choices.iter().flatten().find(|c| {
        c.value.to_value(arg.kind).is_some_and(|value| check_limits(arg, &value).is_err())
    }) {
        return Err(SchemaError::ChoiceOutsideLimits { symbol: symbol(), choice: outside.name.clone() });
    }

    if let Some(default) = &arg.default {
        if !arg.optional {
            return Err(SchemaError::DefaultOnRequired { symbol: symbol() });
        }
        let fits = match default {
            ArgDefault::CurrentUser => arg.kind == ArgKind::User,
            ArgDefault::CurrentChannel => arg.kind == ArgKind::Channel,
            ArgDefault::Literal(literal) => literal.to_value(arg.kind).is_some(),
        };
        if !fits {
            return Err(SchemaError::DefaultTypeMismatch { symbol: symbol(), kind: arg.kind });
        }
    }

    Ok(())
}
