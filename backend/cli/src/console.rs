//! Console transport: stdin lines in, rendered notifications out.

use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chatcmd_commands::{CommandDispatcher, DispatchOutcome, GuardFailure, Notification, Outcome, Responder};
use chatcmd_core::{ChannelActions, ChannelRef, MessageContext, UserRef};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::terminal_output::{paint, supports_color, DIM, GREEN, RED};

/// Identity the console speaks as.
#[derive(Debug, Clone)]
pub struct ConsoleSession {
    pub author: UserRef,
    pub channel: ChannelRef,
    /// `None` simulates a direct message.
    pub server_id: Option<String>,
    pub self_id: String,
}

impl ConsoleSession {
    pub fn message(&self, sequence: u64, line: &str) -> MessageContext {
        let mut ctx = MessageContext::new(line, self.author.clone(), self.channel.clone())
            .with_self_id(self.self_id.clone());
        ctx.message_id = sequence.to_string();
        ctx.server_id = self.server_id.clone();
        ctx
    }
}

fn describe_guard(failure: &GuardFailure) -> Option<String> {
    match failure {
        GuardFailure::ServerOnly => Some("This command can only be used in a server.".into()),
        GuardFailure::MissingPermission { permission } => {
            Some(format!("You need the `{permission}` permission to use this command."))
        }
        GuardFailure::OwnersOnly => Some("Only bot owners can use this command.".into()),
        // Replying to bots invites loops.
        GuardFailure::BotAuthor | GuardFailure::OwnMessage => None,
    }
}

/// Text shown for a notification, or `None` when nothing should be printed.
pub fn render(notification: &Notification, color: bool) -> Option<String> {
    let body = match &notification.outcome {
        Outcome::Completed(response) => paint(GREEN, response.text.as_deref()?, color),
        Outcome::Rejected(failure) => paint(RED, &describe_guard(failure)?, color),
        Outcome::InvalidArguments(err) => paint(RED, &format!("Invalid arguments: {err}"), color),
        Outcome::HandlerFailed(err) => paint(RED, &format!("Command failed: {err}"), color),
        Outcome::Unavailable { stage, .. } => {
            paint(RED, &format!("Command unavailable right now ({stage} failed)."), color)
        }
    };
    Some(format!("{body}\n  {}", paint(DIM, &notification.footer, color)))
}

pub struct ConsoleResponder;

#[async_trait]
impl Responder for ConsoleResponder {
    async fn notify(&self, _ctx: &MessageContext, notification: &Notification) -> Result<()> {
        if let Some(text) = render(notification, supports_color()) {
            println!("{text}");
        }
        Ok(())
    }
}

/// Side effects are printed; permissions come from a fixed grant list.
pub struct ConsoleActions {
    granted: HashSet<String>,
}

impl ConsoleActions {
    pub fn new(granted: impl IntoIterator<Item = String>) -> Self {
        Self { granted: granted.into_iter().collect() }
    }
}

#[async_trait]
impl ChannelActions for ConsoleActions {
    async fn delete_message(&self, ctx: &MessageContext) -> Result<()> {
        println!("{}", paint(DIM, &format!("(message {} deleted)", ctx.message_id), supports_color()));
        Ok(())
    }

    async fn start_typing(&self, ctx: &MessageContext) -> Result<()> {
        println!("{}", paint(DIM, &format!("(typing in #{})", ctx.channel.name), supports_color()));
        Ok(())
    }

    async fn has_permission(&self, _ctx: &MessageContext, permission: &str) -> Result<bool> {
        Ok(self.granted.contains(permission) || self.granted.contains("administrator"))
    }
}

/// Dispatch every non-blank line of `input`. Returns how many were commands.
pub async fn run_lines<R>(input: R, dispatcher: &CommandDispatcher, session: &ConsoleSession) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut sequence = 0u64;
    let mut handled = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        if line.trim().is_empty() {
            continue;
        }
        sequence += 1;
        let ctx = session.message(sequence, &line);
        match dispatcher.dispatch(&ctx).await {
            Ok(DispatchOutcome::Ignored) => debug!(message_id = %ctx.message_id, "Not a command"),
            Ok(outcome) => {
                handled += 1;
                debug!(message_id = %ctx.message_id, ?outcome, "Command handled");
            }
            Err(err) => {
                handled += 1;
                warn!(message_id = %ctx.message_id, error = %err, "Dispatch failed");
            }
        }
    }

    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use chatcmd_commands::{CommandResponse, DispatchSettings, RecordingObserver};
    use chatcmd_core::StaticDirectory;

    use crate::demo::build_registry;

    #[derive(Default)]
    struct CapturingResponder {
        lines: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Responder for CapturingResponder {
        async fn notify(&self, _ctx: &MessageContext, notification: &Notification) -> Result<()> {
            if let Some(text) = render(notification, false) {
                self.lines.lock().unwrap().push(text);
            }
            Ok(())
        }
    }

    fn session() -> ConsoleSession {
        ConsoleSession {
            author: UserRef::new("1", "ana"),
            channel: ChannelRef::new("10", "general"),
            server_id: Some("console".into()),
            self_id: "0".into(),
        }
    }

    fn dispatcher(settings: DispatchSettings, grants: &[&str]) -> (CommandDispatcher, Arc<CapturingResponder>) {
        let responder = Arc::new(CapturingResponder::default());
        let directory = StaticDirectory::default()
            .with_user(UserRef::new("1", "ana"))
            .with_user(UserRef::new("2", "ben"))
            .with_channel(ChannelRef::new("10", "general"))
            .with_channel(ChannelRef::new("11", "news"));
        let dispatcher = CommandDispatcher::new(
            build_registry().unwrap(),
            settings,
            Arc::new(directory),
            Arc::new(ConsoleActions::new(grants.iter().map(|g| g.to_string()))),
            responder.clone(),
            Arc::new(RecordingObserver::new()),
        );
        (dispatcher, responder)
    }

    async fn run(input: &str, settings: DispatchSettings, grants: &[&str]) -> (usize, Vec<String>) {
        let (dispatcher, responder) = dispatcher(settings, grants);
        let handled = run_lines(input.as_bytes(), &dispatcher, &session()).await.unwrap();
        let lines = responder.lines.lock().unwrap().clone();
        (handled, lines)
    }

    #[tokio::test]
    async fn plain_chat_is_ignored() {
        let (handled, lines) = run("hello there\n\n!nothing\n", DispatchSettings::default(), &[]).await;
        assert_eq!(handled, 0);
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn ping_and_echo_reply() {
        let (handled, lines) = run("!ping\n!ECHO  hi   there\n", DispatchSettings::default(), &[]).await;
        assert_eq!(handled, 2);
        assert_eq!(lines[0], "Pong!\n  Command: `!ping`");
        assert_eq!(lines[1], "hi   there\n  Command: `!echo`");
    }

    #[tokio::test]
    async fn roll_defaults_and_bounds() {
        let (_, lines) = run("!roll\n!dice 1\n!roll 6 3 list\n", DispatchSettings::default(), &[]).await;
        assert!(lines[0].starts_with("🎲 "));
        assert!(lines[0].contains("total"));
        assert!(lines[1].starts_with("Invalid arguments"));
        assert!(lines[1].ends_with("Command: `!dice`"));
        assert_eq!(lines[2].lines().next().unwrap().matches(", ").count(), 2);
    }

    #[tokio::test]
    async fn whois_defaults_to_author_and_channel() {
        let (_, lines) = run("!whois\n!whois <@2> news\n", DispatchSettings::default(), &[]).await;
        assert!(lines[0].starts_with("ana (id 1), seen in #general"));
        assert!(lines[1].starts_with("ben (id 2), seen in #news"));
    }

    #[tokio::test]
    async fn shell_commands_need_an_owner() {
        let settings = DispatchSettings { owners: vec!["1".into()], ..Default::default() };
        let (_, lines) = run("!shell ls -la\n!sh uptime\n", settings, &[]).await;
        assert!(lines[0].starts_with("[shell] would run `ls -la`"));
        assert!(lines[1].starts_with("[sh] would run `uptime`"));

        let (_, lines) = run("!shell ls\n", DispatchSettings::default(), &[]).await;
        assert!(lines[0].starts_with("Only bot owners"));
    }

    #[tokio::test]
    async fn admin_say_checks_permissions() {
        let (_, lines) = run("!admin say news hello\n", DispatchSettings::default(), &[]).await;
        assert!(lines[0].contains("`manage_messages`"));

        let (_, lines) = run("!admin say news hello\n", DispatchSettings::default(), &["manage_messages"]).await;
        assert!(lines[0].starts_with("#news: hello"));
        assert!(lines[0].ends_with("Command: `!admin say`"));
    }

    #[test]
    fn silent_responses_render_nothing() {
        let notification = Notification {
            command: "ping".into(),
            footer: "Command: `!ping`".into(),
            outcome: Outcome::Completed(CommandResponse::silent()),
        };
        assert_eq!(render(&notification, false), None);

        let notification = Notification { outcome: Outcome::Rejected(GuardFailure::BotAuthor), ..notification };
        assert_eq!(render(&notification, false), None);
    }

    #[test]
    fn unavailable_collaborators_are_reported() {
        let notification = Notification {
            command: "whois".into(),
            footer: "Command: `!whois`".into(),
            outcome: Outcome::Unavailable { stage: "directory", error: "offline".into() },
        };
        let text = render(&notification, false).unwrap();
        assert!(text.starts_with("Command unavailable right now (directory failed)."));
        assert!(text.ends_with("Command: `!whois`"));
    }
}
