//! Projection of command schemas onto slash command declarations.
//!
//! One-directional: internal schema in, interaction-system declaration out.
//! Grouped commands become sub-commands of one top-level command per group.

use serde::{Serialize, Serializer};

use crate::types::{ArgKind, ArgumentSpec, CommandSpec, Literal};

/// Option type codes used by the interaction API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashOptionKind {
    SubCommand,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Number,
}

impl SlashOptionKind {
    pub fn code(self) -> u8 {
        match self {
            SlashOptionKind::SubCommand => 1,
            SlashOptionKind::String => 3,
            SlashOptionKind::Integer => 4,
            SlashOptionKind::Boolean => 5,
            SlashOptionKind::User => 6,
            SlashOptionKind::Channel => 7,
            SlashOptionKind::Number => 10,
        }
    }
}

impl From<ArgKind> for SlashOptionKind {
    fn from(kind: ArgKind) -> Self {
        match kind {
            ArgKind::String | ArgKind::Remaining => SlashOptionKind::String,
            ArgKind::Integer => SlashOptionKind::Integer,
            ArgKind::Number => SlashOptionKind::Number,
            ArgKind::Boolean => SlashOptionKind::Boolean,
            ArgKind::User => SlashOptionKind::User,
            ArgKind::Channel => SlashOptionKind::Channel,
        }
    }
}

impl Serialize for SlashOptionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlashChoice {
    pub name: String,
    pub value: Literal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlashOption {
    #[serde(rename = "type")]
    pub kind: SlashOptionKind,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<SlashChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SlashOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlashCommand {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SlashOption>,
}

/// Map each argument to its nearest option declaration.
pub fn project_options(schema: &[ArgumentSpec]) -> Vec<SlashOption> {
    schema
        .iter()
        .map(|arg| SlashOption {
            kind: arg.kind.into(),
            name: arg.symbol.clone(),
            description: arg.description.clone().unwrap_or_default(),
            required: !arg.optional,
            choices: arg
                .choices
                .iter()
                .flatten()
                .map(|c| SlashChoice { name: c.name.clone(), value: c.value.clone() })
                .collect(),
            min_value: arg.min_value,
            max_value: arg.max_value,
            max_length: arg.max_length,
            options: Vec::new(),
        })
        .collect()
}

/// Declaration for a single ungrouped command; `None` for text-only ones.
pub fn project_command(spec: &CommandSpec) -> Option<SlashCommand> {
    if spec.is_text_only() {
        return None;
    }
    Some(SlashCommand {
        name: spec.exported_name().to_string(),
        description: spec.description.clone().unwrap_or_default(),
        options: spec.arguments.as_deref().map(project_options).unwrap_or_default(),
    })
}

/// Declarations for a whole registry.
///
/// Grouped commands are folded into one command per group, in order of the
/// group's first appearance, each member becoming a sub-command.
pub fn project_registry<'a>(specs: impl IntoIterator<Item = &'a CommandSpec>) -> Vec<SlashCommand> {
    let mut out: Vec<SlashCommand> = Vec::new();
    let mut groups: Vec<(String, usize)> = Vec::new();

    for spec in specs {
        let Some(command) = project_command(spec) else { continue };
        let Some(group) = &spec.group else {
            out.push(command);
            continue;
        };

        let sub = SlashOption {
            kind: SlashOptionKind::SubCommand,
            name: command.name,
            description: command.description,
            required: false,
            choices: Vec::new(),
            min_value: None,
            max_value: None,
            max_length: None,
            options: command.options,
        };

        match groups.iter().find(|(name, _)| name == group) {
            Some((_, index)) => out[*index].options.push(sub),
            None => {
                groups.push((group.clone(), out.len()));
                out.push(SlashCommand {
                    name: group.clone(),
                    description: format!("Commands in the {group} group"),
                    options: vec![sub],
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Choice;

    #[test]
    fn maps_argument_types_and_required() {
        let schema = vec![
            ArgumentSpec::new("text", ArgKind::Remaining, "Text").max_length(50),
            ArgumentSpec::new("who", ArgKind::User, "Who").optional(),
        ];
        let options = project_options(&schema);
        assert_eq!(options[0].kind, SlashOptionKind::String);
        assert!(options[0].required);
        assert_eq!(options[0].max_length, Some(50));
        assert_eq!(options[1].kind, SlashOptionKind::User);
        assert!(!options[1].required);
    }

    #[test]
    fn carries_choices_and_bounds() {
        let schema = vec![
            ArgumentSpec::new("level", ArgKind::Integer, "Level")
                .choices([Choice::new("low", 1i64)])
                .range(Some(1.0), Some(5.0)),
        ];
        let json = serde_json::to_value(project_options(&schema)).unwrap();
        assert_eq!(json[0]["type"], 4);
        assert_eq!(json[0]["choices"][0]["name"], "low");
        assert_eq!(json[0]["choices"][0]["value"], 1);
        assert_eq!(json[0]["min_value"], 1.0);
        assert!(json[0].get("max_length").is_none());
    }

    #[test]
    fn slash_trigger_renames_export() {
        let spec = CommandSpec::new("help").description("Help").slash_trigger("assist");
        assert_eq!(project_command(&spec).unwrap().name, "assist");
    }

    #[test]
    fn groups_become_sub_commands() {
        let specs = vec![
            CommandSpec::new("ping").description("Ping"),
            CommandSpec::new("say").description("Say").group("admin"),
            CommandSpec::new("kick").description("Kick").group("admin").flattened(),
            CommandSpec::new("eval").group("admin").owners_only(),
        ];
        let exported = project_registry(&specs);
        assert_eq!(exported.len(), 2);
        assert_eq!(exported[1].name, "admin");
        let subs: Vec<&str> = exported[1].options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(subs, vec!["say", "kick"]);
        assert_eq!(exported[1].options[0].kind, SlashOptionKind::SubCommand);
    }
}
