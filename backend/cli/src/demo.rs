//! Demo commands served by the console front end.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chatcmd_commands::{
    ArgDefault, ArgKind, ArgumentMap, ArgumentSpec, Arguments, Choice, CommandContext,
    CommandHandler, CommandRegistry, CommandResponse, CommandSpec, Literal,
};
use chatcmd_core::ChatCmdError;
use rand::Rng;

fn parsed(args: &Arguments) -> Result<&ArgumentMap> {
    args.parsed().ok_or_else(|| anyhow!("command was registered without an argument schema"))
}

struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
    async fn handle(&self, _ctx: &CommandContext, _args: &Arguments, _raw: &str) -> Result<CommandResponse> {
        Ok(CommandResponse::ok("Pong!"))
    }
}

struct EchoHandler;

#[async_trait]
impl CommandHandler for EchoHandler {
    async fn handle(&self, _ctx: &CommandContext, args: &Arguments, _raw: &str) -> Result<CommandResponse> {
        let text = parsed(args)?.str("text").unwrap_or_default();
        Ok(CommandResponse::ok(text))
    }
}

/// Shell commands only describe what they would run.
struct ShellHandler;

#[async_trait]
impl CommandHandler for ShellHandler {
    async fn handle(&self, ctx: &CommandContext, args: &Arguments, _raw: &str) -> Result<CommandResponse> {
        let words = args.words();
        if words.is_empty() {
            return Ok(CommandResponse::ephemeral(format!("Usage: {} <command> [args...]", ctx.invocation())));
        }
        Ok(CommandResponse::ok(format!("[{}] would run `{}`", ctx.command, words.join(" "))))
    }
}

struct RollHandler;

#[async_trait]
impl CommandHandler for RollHandler {
    async fn handle(&self, _ctx: &CommandContext, args: &Arguments, _raw: &str) -> Result<CommandResponse> {
        let map = parsed(args)?;
        let sides = map.i64("sides").unwrap_or(6);
        let count = map.i64("count").unwrap_or(1);
        let rolls: Vec<i64> = {
            let mut rng = rand::thread_rng();
            (0..count).map(|_| rng.gen_range(1..=sides)).collect()
        };
        let listed: Vec<String> = rolls.iter().map(i64::to_string).collect();
        let text = match map.str("mode") {
            Some("list") => format!("🎲 {}", listed.join(", ")),
            _ => format!("🎲 {} (total {})", listed.join(" + "), rolls.iter().sum::<i64>()),
        };
        Ok(CommandResponse::ok(text))
    }
}

struct WhoisHandler;

#[async_trait]
impl CommandHandler for WhoisHandler {
    async fn handle(&self, _ctx: &CommandContext, args: &Arguments, _raw: &str) -> Result<CommandResponse> {
        let map = parsed(args)?;
        let user = map.user("user").ok_or_else(|| anyhow!("no user resolved"))?;
        let mut text = format!("{} (id {})", user.name, user.id);
        if user.bot {
            text.push_str(" [bot]");
        }
        if let Some(channel) = map.channel("where") {
            text.push_str(&format!(", seen in #{}", channel.name));
        }
        Ok(CommandResponse::ok(text))
    }
}

struct SayHandler;

#[async_trait]
impl CommandHandler for SayHandler {
    async fn handle(&self, _ctx: &CommandContext, args: &Arguments, _raw: &str) -> Result<CommandResponse> {
        let map = parsed(args)?;
        let channel = map.channel("channel").ok_or_else(|| anyhow!("no channel resolved"))?;
        let text = map.str("text").unwrap_or_default();
        Ok(CommandResponse::ok(format!("#{}: {}", channel.name, text)))
    }
}

type Entry = (CommandSpec, Arc<dyn CommandHandler>);

fn entry(spec: CommandSpec, handler: impl CommandHandler + 'static) -> Entry {
    (spec, Arc::new(handler))
}

/// Specs and handlers of every demo command, in registration order.
pub fn demo_commands() -> Vec<Entry> {
    vec![
        entry(CommandSpec::new("ping").description("Check that the bot is alive"), PingHandler),
        entry(
            CommandSpec::new("echo")
                .description("Repeat a message back")
                .arguments(vec![ArgumentSpec::new("text", ArgKind::Remaining, "Text to repeat").max_length(200)]),
            EchoHandler,
        ),
        entry(CommandSpec::new("sh").owners_only(), ShellHandler),
        entry(CommandSpec::new("shell").owners_only(), ShellHandler),
        entry(
            CommandSpec::new("roll").triggers(["roll", "dice"]).description("Roll some dice").arguments(vec![
                ArgumentSpec::new("sides", ArgKind::Integer, "Sides per die")
                    .optional()
                    .default_to(ArgDefault::Literal(Literal::Integer(6)))
                    .range(Some(2.0), Some(1000.0)),
                ArgumentSpec::new("count", ArgKind::Integer, "Number of dice")
                    .optional()
                    .default_to(ArgDefault::Literal(Literal::Integer(1)))
                    .range(Some(1.0), Some(20.0)),
                ArgumentSpec::new("mode", ArgKind::String, "How to show the result")
                    .optional()
                    .choices([Choice::new("sum", "sum"), Choice::new("list", "list")]),
            ]),
            RollHandler,
        ),
        entry(
            CommandSpec::new("whois").description("Show who someone is").arguments(vec![
                ArgumentSpec::new("user", ArgKind::User, "User to look up")
                    .optional()
                    .default_to(ArgDefault::CurrentUser),
                ArgumentSpec::new("where", ArgKind::Channel, "Channel to mention")
                    .optional()
                    .default_to(ArgDefault::CurrentChannel),
            ]),
            WhoisHandler,
        ),
        entry(
            CommandSpec::new("say")
                .group("admin")
                .description("Post a message as the bot")
                .require_permission("manage_messages")
                .owner_override()
                .arguments(vec![
                    ArgumentSpec::new("channel", ArgKind::Channel, "Where to post"),
                    ArgumentSpec::new("text", ArgKind::Remaining, "What to say"),
                ]),
            SayHandler,
        ),
    ]
}

pub fn build_registry() -> Result<Arc<CommandRegistry>, ChatCmdError> {
    let registry = CommandRegistry::new();
    for (spec, handler) in demo_commands() {
        let name = spec.name.clone();
        registry
            .register(spec, handler)
            .map_err(|err| ChatCmdError::RegistrationFailed { command: name, message: err.to_string() })?;
    }
    Ok(Arc::new(registry))
}
