/// Command and argument schema types.
///
/// Everything here is plain data: it is validated once at registration and
/// never mutated by the dispatch path.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::args::ArgValue;

// ---------------------------------------------------------------------------
// Argument kinds
// ---------------------------------------------------------------------------

/// The closed set of argument types a schema may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    String,
    Integer,
    Number,
    Boolean,
    User,
    Channel,
    /// Consumes everything left in the message, ignoring quoting.
    Remaining,
}

impl ArgKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArgKind::String => "string",
            ArgKind::Integer => "integer",
            ArgKind::Number => "number",
            ArgKind::Boolean => "boolean",
            ArgKind::User => "user",
            ArgKind::Channel => "channel",
            ArgKind::Remaining => "remaining",
        }
    }

    pub fn accepts_choices(self) -> bool {
        matches!(self, ArgKind::String | ArgKind::Integer | ArgKind::Number)
    }

    pub fn accepts_max_length(self) -> bool {
        matches!(self, ArgKind::String | ArgKind::Remaining)
    }

    pub fn accepts_bounds(self) -> bool {
        matches!(self, ArgKind::Integer | ArgKind::Number)
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Literals, choices, defaults
// ---------------------------------------------------------------------------

/// A constant written into a schema: a choice value or a literal default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
}

impl Literal {
    /// Convert into a decoded value of `kind`, if the literal fits that kind.
    ///
    /// Integer literals widen to `number`; nothing else converts.
    pub fn to_value(&self, kind: ArgKind) -> Option<ArgValue> {
        match (self, kind) {
            (Literal::String(s), ArgKind::String | ArgKind::Remaining) => {
                Some(ArgValue::String(s.clone()))
            }
            (Literal::Integer(i), ArgKind::Integer) => Some(ArgValue::Integer(*i)),
            (Literal::Integer(i), ArgKind::Number) => Some(ArgValue::Number(*i as f64)),
            (Literal::Number(n), ArgKind::Number) => Some(ArgValue::Number(*n)),
            (Literal::Boolean(b), ArgKind::Boolean) => Some(ArgValue::Boolean(*b)),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Boolean(b) => write!(f, "{b}"),
            Literal::Integer(i) => write!(f, "{i}"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => f.write_str(s),
        }
    }
}

/// One entry of an enumerated choice set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Shown to users; also accepted as input in text invocations.
    pub name: String,
    pub value: Literal,
}

impl Choice {
    pub fn new(name: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Number(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

/// Value used for an optional argument that received no token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgDefault {
    /// The author of the invoking message.
    CurrentUser,
    /// The channel the message was posted in.
    CurrentChannel,
    #[serde(untagged)]
    Literal(Literal),
}

// ---------------------------------------------------------------------------
// Argument spec
// ---------------------------------------------------------------------------

/// One declared, typed slot in a command's argument schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSpec {
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: ArgKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ArgDefault>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl ArgumentSpec {
    pub fn new(symbol: impl Into<String>, kind: ArgKind, description: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
            description: Some(description.into()),
            optional: false,
            default: None,
            choices: None,
            max_length: None,
            min_value: None,
            max_value: None,
        }
    }

    /// A slot without a description, for text-only commands.
    pub fn bare(symbol: impl Into<String>, kind: ArgKind) -> Self {
        Self { description: None, ..Self::new(symbol, kind, "") }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark optional and fall back to `default` when no token is left.
    pub fn default_to(mut self, default: ArgDefault) -> Self {
        self.optional = true;
        self.default = Some(default);
        self
    }

    pub fn choices(mut self, choices: impl IntoIterator<Item = Choice>) -> Self {
        self.choices = Some(choices.into_iter().collect());
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }
}

// ---------------------------------------------------------------------------
// Command spec
// ---------------------------------------------------------------------------

/// Per-command behaviour flags. Unset `Option`s inherit the global settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandFlags {
    pub owners_only: bool,
    pub server_only: bool,
    pub delete_activator: Option<bool>,
    pub typing: Option<bool>,
    /// Owners skip the permission check.
    pub owner_override: bool,
    pub required_permissions: Vec<String>,
}

/// A command as registered: identity, activation, schema and flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Strings that activate the command. Empty means `[name]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Grouped, but invoked in text without the group name.
    #[serde(default)]
    pub flattened: bool,
    /// `None` means the handler receives raw whitespace-split words.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<ArgumentSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_only: Option<bool>,
    /// Overrides the exported slash command name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slash_trigger: Option<String>,
    #[serde(flatten)]
    pub flags: CommandFlags,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            triggers: Vec::new(),
            group: None,
            flattened: false,
            arguments: None,
            text_only: None,
            slash_trigger: None,
            flags: CommandFlags::default(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.triggers = triggers.into_iter().map(Into::into).collect();
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn flattened(mut self) -> Self {
        self.flattened = true;
        self
    }

    pub fn arguments(mut self, arguments: Vec<ArgumentSpec>) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn text_only(mut self) -> Self {
        self.text_only = Some(true);
        self
    }

    pub fn slash_trigger(mut self, name: impl Into<String>) -> Self {
        self.slash_trigger = Some(name.into());
        self
    }

    pub fn owners_only(mut self) -> Self {
        self.flags.owners_only = true;
        self
    }

    pub fn server_only(mut self) -> Self {
        self.flags.server_only = true;
        self
    }

    pub fn typing(mut self, typing: bool) -> Self {
        self.flags.typing = Some(typing);
        self
    }

    pub fn delete_activator(mut self, delete: bool) -> Self {
        self.flags.delete_activator = Some(delete);
        self
    }

    pub fn owner_override(mut self) -> Self {
        self.flags.owner_override = true;
        self
    }

    pub fn require_permission(mut self, permission: impl Into<String>) -> Self {
        self.flags.required_permissions.push(permission.into());
        self
    }

    /// Owner-only commands are never exported to the interaction system.
    pub fn is_text_only(&self) -> bool {
        self.text_only.unwrap_or(false) || self.flags.owners_only
    }

    /// Name used when exporting the command as a slash command.
    pub fn exported_name(&self) -> &str {
        self.slash_trigger.as_deref().unwrap_or(&self.name)
    }

    /// Triggers as typed after the prefix, group-qualified unless flattened.
    pub fn effective_triggers(&self) -> Vec<String> {
        let base: Vec<&str> = if self.triggers.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.triggers.iter().map(String::as_str).collect()
        };
        match (&self.group, self.flattened) {
            (Some(group), false) => base.iter().map(|t| format!("{group} {t}")).collect(),
            _ => base.iter().map(|t| t.to_string()).collect(),
        }
    }
}
