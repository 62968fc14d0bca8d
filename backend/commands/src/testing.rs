//! Test doubles shared by the unit tests in this crate.

use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use async_trait::async_trait;
use chatcmd_core::{ChannelActions, MessageContext};

use crate::args::Arguments;
use crate::dispatch::{CommandContext, CommandHandler, CommandResponse, Notification, Outcome, Responder};
use crate::registry::Command;
use crate::types::CommandSpec;

pub fn command(spec: CommandSpec) -> Arc<Command> {
    Arc::new(Command::new(spec, Arc::new(NoopHandler)))
}

pub struct NoopHandler;

#[async_trait]
impl CommandHandler for NoopHandler {
    async fn handle(&self, _ctx: &CommandContext, _args: &Arguments, _raw: &str) -> Result<CommandResponse> {
        Ok(CommandResponse::silent())
    }
}

pub struct ReplyHandler {
    text: String,
}

impl ReplyHandler {
    pub fn new(text: &str) -> Self {
        Self { text: text.to_string() }
    }
}

#[async_trait]
impl CommandHandler for ReplyHandler {
    async fn handle(&self, _ctx: &CommandContext, _args: &Arguments, _raw: &str) -> Result<CommandResponse> {
        Ok(CommandResponse::ok(self.text.clone()))
    }
}

/// Records every invocation as (command, args, raw).
#[derive(Default)]
pub struct RecordingHandler {
    pub calls: Mutex<Vec<(String, Arguments, String)>>,
}

#[async_trait]
impl CommandHandler for RecordingHandler {
    async fn handle(&self, ctx: &CommandContext, args: &Arguments, raw: &str) -> Result<CommandResponse> {
        self.calls.lock().unwrap().push((ctx.command.clone(), args.clone(), raw.to_string()));
        Ok(CommandResponse::ok("done"))
    }
}

pub struct FailingHandler;

#[async_trait]
impl CommandHandler for FailingHandler {
    async fn handle(&self, _ctx: &CommandContext, _args: &Arguments, _raw: &str) -> Result<CommandResponse> {
        bail!("database unavailable")
    }
}

/// A flattened copy of a notification; parse errors are not `Clone`.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub command: String,
    pub footer: String,
    pub kind: &'static str,
    pub detail: String,
}

#[derive(Default)]
pub struct RecordingResponder {
    pub notifications: Mutex<Vec<Recorded>>,
}

impl RecordingResponder {
    pub fn recorded(&self) -> Vec<Recorded> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn notify(&self, _ctx: &MessageContext, notification: &Notification) -> Result<()> {
        let (kind, detail) = match &notification.outcome {
            Outcome::Completed(response) => ("completed", response.text.clone().unwrap_or_default()),
            Outcome::Rejected(failure) => ("rejected", failure.name().to_string()),
            Outcome::InvalidArguments(err) => ("invalid_arguments", err.to_string()),
            Outcome::HandlerFailed(err) => ("handler_failed", err.clone()),
            Outcome::Unavailable { stage, .. } => ("unavailable", stage.to_string()),
        };
        self.notifications.lock().unwrap().push(Recorded {
            command: notification.command.clone(),
            footer: notification.footer.clone(),
            kind,
            detail,
        });
        Ok(())
    }
}

/// Records guard side effects in call order and grants a fixed permission set.
#[derive(Default)]
pub struct RecordingActions {
    pub log: Mutex<Vec<String>>,
    pub granted: Vec<String>,
}

impl RecordingActions {
    pub fn granting(permissions: &[&str]) -> Self {
        Self {
            log: Mutex::default(),
            granted: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelActions for RecordingActions {
    async fn delete_message(&self, _ctx: &MessageContext) -> Result<()> {
        self.log.lock().unwrap().push("delete".into());
        Ok(())
    }

    async fn start_typing(&self, _ctx: &MessageContext) -> Result<()> {
        self.log.lock().unwrap().push("typing".into());
        Ok(())
    }

    async fn has_permission(&self, _ctx: &MessageContext, permission: &str) -> Result<bool> {
        self.log.lock().unwrap().push(format!("permission:{permission}"));
        Ok(self.granted.iter().any(|p| p == permission))
    }
}
