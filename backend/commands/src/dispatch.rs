/// Command dispatch: resolve, guard, parse, run, report.
///
/// Guards run in a fixed order: delete activator, server-only, bot/self
/// filter, typing indicator, permissions, owner-only. Every resolved message
/// produces exactly one responder notification; unresolved messages produce
/// none. A failing collaborator is reported as `Outcome::Unavailable` before
/// its `DispatchError` is returned.
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chatcmd_core::{ChannelActions, Directory, MessageContext};
use chatcmd_logging::CommandEvent;
use tracing::{debug, info};

use crate::activator::{Activation, ActivatorResolver, MatchPolicy};
use crate::args::Arguments;
use crate::error::{DispatchError, ParseError};
use crate::observer::DispatchObserver;
use crate::parser::ArgumentParser;
use crate::reader::TextReader;
use crate::registry::CommandRegistry;
use crate::types::CommandFlags;

// ---------------------------------------------------------------------------
// Handler and responder contracts
// ---------------------------------------------------------------------------

/// Context passed to every command handler.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub message: MessageContext,
    pub command: String,
    pub prefix: String,
    pub activator: String,
}

impl CommandContext {
    /// What the user typed to invoke the command, e.g. `!shell`.
    pub fn invocation(&self) -> String {
        format!("{}{}", self.prefix, self.activator)
    }
}

/// What a handler wants sent back to the invoker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResponse {
    pub text: Option<String>,
    pub ephemeral: bool, // only visible to the invoker
}

impl CommandResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ephemeral: false }
    }

    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ephemeral: true }
    }

    /// The handler replied on its own, or has nothing to say.
    pub fn silent() -> Self {
        Self::default()
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// `raw` is the message text after the activator, leading whitespace trimmed.
    async fn handle(&self, ctx: &CommandContext, args: &Arguments, raw: &str) -> Result<CommandResponse>;
}

/// Why a guard stopped a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardFailure {
    ServerOnly,
    BotAuthor,
    OwnMessage,
    MissingPermission { permission: String },
    OwnersOnly,
}

impl GuardFailure {
    pub fn name(&self) -> &'static str {
        match self {
            GuardFailure::ServerOnly => "server_only",
            GuardFailure::BotAuthor => "bot_author",
            GuardFailure::OwnMessage => "own_message",
            GuardFailure::MissingPermission { .. } => "permission",
            GuardFailure::OwnersOnly => "owners_only",
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Completed(CommandResponse),
    Rejected(GuardFailure),
    InvalidArguments(ParseError),
    /// The handler returned an error; carries its rendered chain.
    HandlerFailed(String),
    /// The directory or a channel action failed, so the command never ran.
    Unavailable { stage: &'static str, error: String },
}

/// Structured report of one dispatched message.
#[derive(Debug)]
pub struct Notification {
    pub command: String,
    /// Context line for the reply, e.g. ``Command: `!shell` ``.
    pub footer: String,
    pub outcome: Outcome,
}

impl Notification {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Completed(_))
    }
}

/// Delivers notifications back to where the message came from.
///
/// Rendering (embeds, plain text, silence for bots) is up to the implementor.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn notify(&self, ctx: &MessageContext, notification: &Notification) -> Result<()>;
}

/// Summary returned to the transport after a message is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command: no prefix or no trigger matched.
    Ignored,
    Rejected(GuardFailure),
    InvalidArguments,
    Completed,
    HandlerFailed,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Global dispatch settings; per-command flags fall back to these.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub prefixes: Vec<String>,
    pub owners: Vec<String>,
    pub policy: MatchPolicy,
    pub typing_default: bool,
    pub delete_activators: bool,
    pub parse_bots: bool,
    pub disable_text_commands: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            prefixes: vec!["!".to_string()],
            owners: Vec::new(),
            policy: MatchPolicy::default(),
            typing_default: false,
            delete_activators: false,
            parse_bots: false,
            disable_text_commands: false,
        }
    }
}

impl DispatchSettings {
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owners.iter().any(|o| o == user_id)
    }
}

/// Flags for one dispatch, computed fresh from the command and settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFlags {
    pub owners_only: bool,
    pub server_only: bool,
    pub delete_activator: bool,
    pub typing: bool,
    pub owner_override: bool,
}

impl ResolvedFlags {
    pub fn resolve(flags: &CommandFlags, settings: &DispatchSettings) -> Self {
        Self {
            owners_only: flags.owners_only,
            server_only: flags.server_only,
            delete_activator: flags.delete_activator.unwrap_or(settings.delete_activators),
            typing: flags.typing.unwrap_or(settings.typing_default),
            owner_override: flags.owner_override,
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
    settings: DispatchSettings,
    directory: Arc<dyn Directory>,
    actions: Arc<dyn ChannelActions>,
    responder: Arc<dyn Responder>,
    observer: Arc<dyn DispatchObserver>,
}

impl CommandDispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        settings: DispatchSettings,
        directory: Arc<dyn Directory>,
        actions: Arc<dyn ChannelActions>,
        responder: Arc<dyn Responder>,
        observer: Arc<dyn DispatchObserver>,
    ) -> Self {
        Self { registry, settings, directory, actions, responder, observer }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Handle one inbound message end to end.
    pub async fn dispatch(&self, ctx: &MessageContext) -> Result<DispatchOutcome, DispatchError> {
        if self.settings.disable_text_commands {
            return Ok(DispatchOutcome::Ignored);
        }

        let commands = self.registry.snapshot();
        let resolver = ActivatorResolver::new(self.settings.policy, self.observer.as_ref());
        let Some(activation) =
            resolver.resolve(&commands, &self.settings.prefixes, &ctx.content, &ctx.message_id)
        else {
            return Ok(DispatchOutcome::Ignored);
        };

        let flags = ResolvedFlags::resolve(&activation.command.spec.flags, &self.settings);
        let guard = match self.run_guards(ctx, &activation, flags).await {
            Ok(guard) => guard,
            Err(err) => return self.unavailable(ctx, &activation, err).await,
        };
        if let Some(failure) = guard {
            self.observe(ctx, CommandEvent::GuardRejected {
                command: activation.command.spec.name.clone(),
                guard: failure.name().to_string(),
            });
            self.notify(ctx, &activation, Outcome::Rejected(failure.clone())).await?;
            return Ok(DispatchOutcome::Rejected(failure));
        }

        let args = match self.parse_arguments(ctx, &activation).await {
            Ok(args) => args,
            Err(ParseError::Directory { cause, .. }) => {
                let err = DispatchError::Directory { command: activation.command.spec.name.clone(), cause };
                return self.unavailable(ctx, &activation, err).await;
            }
            Err(err) => {
                self.observe(ctx, CommandEvent::ParseFailed {
                    command: activation.command.spec.name.clone(),
                    error: err.to_string(),
                });
                self.notify(ctx, &activation, Outcome::InvalidArguments(err)).await?;
                return Ok(DispatchOutcome::InvalidArguments);
            }
        };

        let command_ctx = CommandContext {
            message: ctx.clone(),
            command: activation.command.spec.name.clone(),
            prefix: activation.prefix.clone(),
            activator: activation.activator.clone(),
        };
        info!("[Commands] Dispatching {} in channel {}", activation.invocation(), ctx.channel.id);

        match activation.command.handler.handle(&command_ctx, &args, &activation.remainder).await {
            Ok(response) => {
                self.observe(ctx, CommandEvent::CommandCompleted { command: command_ctx.command.clone() });
                self.notify(ctx, &activation, Outcome::Completed(response)).await?;
                Ok(DispatchOutcome::Completed)
            }
            Err(err) => {
                let error = format!("{err:#}");
                self.observe(ctx, CommandEvent::HandlerFailed {
                    command: command_ctx.command.clone(),
                    error: error.clone(),
                });
                self.notify(ctx, &activation, Outcome::HandlerFailed(error)).await?;
                Ok(DispatchOutcome::HandlerFailed)
            }
        }
    }

    async fn run_guards(
        &self,
        ctx: &MessageContext,
        activation: &Activation,
        flags: ResolvedFlags,
    ) -> Result<Option<GuardFailure>, DispatchError> {
        if flags.delete_activator {
            self.actions
                .delete_message(ctx)
                .await
                .map_err(|cause| DispatchError::Action { action: "delete_message", cause })?;
        }

        if flags.server_only && ctx.is_private() {
            return Ok(Some(GuardFailure::ServerOnly));
        }

        if ctx.is_from_self() {
            return Ok(Some(GuardFailure::OwnMessage));
        }
        if ctx.author.bot && !self.settings.parse_bots {
            return Ok(Some(GuardFailure::BotAuthor));
        }

        if flags.typing {
            self.actions
                .start_typing(ctx)
                .await
                .map_err(|cause| DispatchError::Action { action: "start_typing", cause })?;
        }

        let is_owner = self.settings.is_owner(&ctx.author.id);
        if !(flags.owner_override && is_owner) {
            for permission in &activation.command.spec.flags.required_permissions {
                let granted = self
                    .actions
                    .has_permission(ctx, permission)
                    .await
                    .map_err(|cause| DispatchError::Action { action: "has_permission", cause })?;
                if !granted {
                    return Ok(Some(GuardFailure::MissingPermission { permission: permission.clone() }));
                }
            }
        }

        if flags.owners_only && !is_owner {
            return Ok(Some(GuardFailure::OwnersOnly));
        }

        Ok(None)
    }

    async fn parse_arguments(
        &self,
        ctx: &MessageContext,
        activation: &Activation,
    ) -> Result<Arguments, ParseError> {
        let Some(schema) = &activation.command.spec.arguments else {
            let words = activation.remainder.split_whitespace().map(str::to_string).collect();
            return Ok(Arguments::Raw(words));
        };
        let mut reader = TextReader::new(&activation.remainder);
        let parser = ArgumentParser::new(self.directory.as_ref(), ctx);
        let map = parser.parse(schema, &mut reader).await?;
        debug!(command = %activation.command.spec.name, parsed = map.len(), "Arguments parsed");
        Ok(Arguments::Parsed(map))
    }

    /// Report a collaborator failure to the invoker, then hand it back to the caller.
    async fn unavailable(
        &self,
        ctx: &MessageContext,
        activation: &Activation,
        err: DispatchError,
    ) -> Result<DispatchOutcome, DispatchError> {
        let stage = err.stage();
        let error = err.to_string();
        self.observe(ctx, CommandEvent::CollaboratorFailed {
            command: activation.command.spec.name.clone(),
            stage: stage.to_string(),
            error: error.clone(),
        });
        self.notify(ctx, activation, Outcome::Unavailable { stage, error }).await?;
        Err(err)
    }

    async fn notify(
        &self,
        ctx: &MessageContext,
        activation: &Activation,
        outcome: Outcome,
    ) -> Result<(), DispatchError> {
        let notification = Notification {
            command: activation.command.spec.name.clone(),
            footer: format!("Command: `{}`", activation.invocation()),
            outcome,
        };
        self.responder.notify(ctx, &notification).await.map_err(DispatchError::Responder)
    }

    fn observe(&self, ctx: &MessageContext, event: CommandEvent) {
        self.observer.observe(&ctx.message_id, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ArgValue;
    use crate::observer::RecordingObserver;
    use crate::testing::{FailingHandler, RecordingActions, RecordingHandler, RecordingResponder};
    use crate::types::{ArgKind, ArgumentSpec, CommandSpec};
    use anyhow::anyhow;
    use chatcmd_core::{ChannelRef, StaticDirectory, UserRef};

    struct Harness {
        dispatcher: CommandDispatcher,
        responder: Arc<RecordingResponder>,
        actions: Arc<RecordingActions>,
        handler: Arc<RecordingHandler>,
        observer: Arc<RecordingObserver>,
    }

    fn harness(settings: DispatchSettings, actions: RecordingActions, specs: Vec<CommandSpec>) -> Harness {
        let registry = Arc::new(CommandRegistry::new());
        let handler = Arc::new(RecordingHandler::default());
        for spec in specs {
            registry.register(spec, handler.clone()).unwrap();
        }
        let responder = Arc::new(RecordingResponder::default());
        let actions = Arc::new(actions);
        let observer = Arc::new(RecordingObserver::new());
        let directory = StaticDirectory::default()
            .with_user(UserRef::new("1", "ana"))
            .with_user(UserRef::new("2", "ben"));
        let dispatcher = CommandDispatcher::new(
            registry,
            settings,
            Arc::new(directory),
            actions.clone(),
            responder.clone(),
            observer.clone(),
        );
        Harness { dispatcher, responder, actions, handler, observer }
    }

    fn simple(specs: Vec<CommandSpec>) -> Harness {
        harness(DispatchSettings::default(), RecordingActions::default(), specs)
    }

    fn message(content: &str) -> MessageContext {
        MessageContext::new(content, UserRef::new("1", "ana"), ChannelRef::new("10", "general"))
            .in_server("500")
    }

    fn ping() -> CommandSpec {
        CommandSpec::new("ping").description("Replies with pong")
    }

    #[tokio::test]
    async fn unprefixed_message_is_silent() {
        let h = simple(vec![ping()]);
        let outcome = h.dispatcher.dispatch(&message("ping")).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert!(h.responder.recorded().is_empty());
        assert!(h.handler.calls.lock().unwrap().is_empty());
        assert!(h.observer.events().is_empty());
    }

    #[tokio::test]
    async fn unknown_command_is_silent() {
        let h = simple(vec![ping()]);
        assert_eq!(h.dispatcher.dispatch(&message("!pong")).await.unwrap(), DispatchOutcome::Ignored);
        assert!(h.responder.recorded().is_empty());
    }

    #[tokio::test]
    async fn raw_commands_get_whitespace_split_words() {
        let h = simple(vec![ping()]);
        let outcome = h.dispatcher.dispatch(&message("!ping  a   \"b c\"")).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Completed);
        let calls = h.handler.calls.lock().unwrap();
        let (command, args, raw) = &calls[0];
        assert_eq!(command, "ping");
        assert_eq!(args.words(), ["a", "\"b", "c\""]);
        assert_eq!(raw, "a   \"b c\"");
        let recorded = h.responder.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].kind, "completed");
        assert_eq!(recorded[0].footer, "Command: `!ping`");
    }

    #[tokio::test]
    async fn schema_commands_get_parsed_arguments() {
        let spec = CommandSpec::new("greet").description("Greet someone").arguments(vec![
            ArgumentSpec::new("who", ArgKind::User, "Who to greet"),
            ArgumentSpec::new("times", ArgKind::Integer, "How often").optional(),
        ]);
        let h = simple(vec![spec]);
        h.dispatcher.dispatch(&message("!greet <@2> 3")).await.unwrap();
        let calls = h.handler.calls.lock().unwrap();
        let map = calls[0].1.parsed().unwrap();
        assert_eq!(map.user("who").unwrap().name, "ben");
        assert_eq!(map.get("times"), Some(&ArgValue::Integer(3)));
    }

    #[tokio::test]
    async fn parse_failure_notifies_and_skips_handler() {
        let spec = CommandSpec::new("roll").description("Roll dice").arguments(vec![ArgumentSpec::new(
            "sides",
            ArgKind::Integer,
            "Sides",
        )]);
        let h = simple(vec![spec]);
        let outcome = h.dispatcher.dispatch(&message("!roll many")).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::InvalidArguments);
        assert!(h.handler.calls.lock().unwrap().is_empty());
        let recorded = h.responder.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].kind, "invalid_arguments");
        assert!(recorded[0].detail.contains("many"));
    }

    #[tokio::test]
    async fn longest_trigger_dispatches_to_shell() {
        let h = simple(vec![
            CommandSpec::new("sh").description("Short"),
            CommandSpec::new("shell").description("Long"),
        ]);
        h.dispatcher.dispatch(&message("!shell status")).await.unwrap();
        let calls = h.handler.calls.lock().unwrap();
        assert_eq!(calls[0].0, "shell");
        assert_eq!(calls[0].2, "status");
    }

    #[tokio::test]
    async fn server_only_rejects_direct_messages() {
        let h = simple(vec![ping().server_only()]);
        let dm = MessageContext::new("!ping", UserRef::new("1", "ana"), ChannelRef::new("9", "dm"));
        let outcome = h.dispatcher.dispatch(&dm).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Rejected(GuardFailure::ServerOnly));
        assert_eq!(h.responder.recorded()[0].detail, "server_only");
        assert!(h.handler.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bots_are_filtered_unless_enabled() {
        let h = simple(vec![ping()]);
        let mut ctx = message("!ping");
        ctx.author = UserRef::bot("3", "robot");
        assert_eq!(
            h.dispatcher.dispatch(&ctx).await.unwrap(),
            DispatchOutcome::Rejected(GuardFailure::BotAuthor)
        );

        let settings = DispatchSettings { parse_bots: true, ..Default::default() };
        let h = harness(settings, RecordingActions::default(), vec![ping()]);
        assert_eq!(h.dispatcher.dispatch(&ctx).await.unwrap(), DispatchOutcome::Completed);
    }

    #[tokio::test]
    async fn own_messages_are_filtered() {
        let settings = DispatchSettings { parse_bots: true, ..Default::default() };
        let h = harness(settings, RecordingActions::default(), vec![ping()]);
        let ctx = message("!ping").with_self_id("1");
        assert_eq!(
            h.dispatcher.dispatch(&ctx).await.unwrap(),
            DispatchOutcome::Rejected(GuardFailure::OwnMessage)
        );
    }

    #[tokio::test]
    async fn guards_run_in_fixed_order() {
        let spec = ping()
            .delete_activator(true)
            .typing(true)
            .require_permission("manage_messages")
            .require_permission("kick_members");
        let h = harness(
            DispatchSettings::default(),
            RecordingActions::granting(&["manage_messages"]),
            vec![spec],
        );
        let outcome = h.dispatcher.dispatch(&message("!ping")).await.unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Rejected(GuardFailure::MissingPermission { permission: "kick_members".into() })
        );
        assert_eq!(
            h.actions.log(),
            vec!["delete", "typing", "permission:manage_messages", "permission:kick_members"]
        );
    }

    #[tokio::test]
    async fn global_defaults_fill_unset_flags() {
        let settings = DispatchSettings { typing_default: true, delete_activators: true, ..Default::default() };
        let h = harness(settings, RecordingActions::default(), vec![ping().typing(false)]);
        h.dispatcher.dispatch(&message("!ping")).await.unwrap();
        assert_eq!(h.actions.log(), vec!["delete"]);
        assert_eq!(h.responder.recorded().len(), 1);
    }

    #[tokio::test]
    async fn owners_only_rejects_others() {
        let settings = DispatchSettings { owners: vec!["99".into()], ..Default::default() };
        let h = harness(settings, RecordingActions::default(), vec![CommandSpec::new("eval").owners_only()]);
        assert_eq!(
            h.dispatcher.dispatch(&message("!eval 1+1")).await.unwrap(),
            DispatchOutcome::Rejected(GuardFailure::OwnersOnly)
        );
        let mut owner = message("!eval 1+1");
        owner.author = UserRef::new("99", "root");
        assert_eq!(h.dispatcher.dispatch(&owner).await.unwrap(), DispatchOutcome::Completed);
    }

    #[tokio::test]
    async fn owner_override_skips_permission_checks() {
        let settings = DispatchSettings { owners: vec!["1".into()], ..Default::default() };
        let spec = ping().require_permission("administrator").owner_override();
        let h = harness(settings, RecordingActions::default(), vec![spec]);
        assert_eq!(h.dispatcher.dispatch(&message("!ping")).await.unwrap(), DispatchOutcome::Completed);
        assert!(h.actions.log().is_empty());
    }

    #[tokio::test]
    async fn handler_errors_are_reported() {
        let registry = Arc::new(CommandRegistry::new());
        registry.register(ping(), Arc::new(FailingHandler)).unwrap();
        let responder = Arc::new(RecordingResponder::default());
        let dispatcher = CommandDispatcher::new(
            registry,
            DispatchSettings::default(),
            Arc::new(StaticDirectory::default()),
            Arc::new(RecordingActions::default()),
            responder.clone(),
            Arc::new(RecordingObserver::new()),
        );
        let outcome = dispatcher.dispatch(&message("!ping")).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::HandlerFailed);
        let recorded = responder.recorded();
        assert_eq!(recorded[0].kind, "handler_failed");
        assert_eq!(recorded[0].detail, "database unavailable");
    }

    #[tokio::test]
    async fn disabled_text_commands_ignore_everything() {
        let settings = DispatchSettings { disable_text_commands: true, ..Default::default() };
        let h = harness(settings, RecordingActions::default(), vec![ping()]);
        assert_eq!(h.dispatcher.dispatch(&message("!ping")).await.unwrap(), DispatchOutcome::Ignored);
        assert!(h.responder.recorded().is_empty());
    }

    struct FailingResponder;

    #[async_trait]
    impl Responder for FailingResponder {
        async fn notify(&self, _ctx: &MessageContext, _notification: &Notification) -> Result<()> {
            Err(anyhow!("socket closed"))
        }
    }

    #[tokio::test]
    async fn responder_failure_propagates() {
        let registry = Arc::new(CommandRegistry::new());
        registry.register(ping(), Arc::new(RecordingHandler::default())).unwrap();
        let dispatcher = CommandDispatcher::new(
            registry,
            DispatchSettings::default(),
            Arc::new(StaticDirectory::default()),
            Arc::new(RecordingActions::default()),
            Arc::new(FailingResponder),
            Arc::new(RecordingObserver::new()),
        );
        let err = dispatcher.dispatch(&message("!ping")).await.unwrap_err();
        assert!(matches!(err, DispatchError::Responder(_)));
    }

    struct OfflineDirectory;

    #[async_trait]
    impl Directory for OfflineDirectory {
        async fn user_by_id(&self, _id: &str) -> Result<Option<UserRef>> {
            Err(anyhow!("gateway offline"))
        }
        async fn users_by_name(&self, _name: &str) -> Result<Vec<UserRef>> {
            Err(anyhow!("gateway offline"))
        }
        async fn channel_by_id(&self, _id: &str) -> Result<Option<ChannelRef>> {
            Err(anyhow!("gateway offline"))
        }
        async fn channels_by_name(&self, _name: &str) -> Result<Vec<ChannelRef>> {
            Err(anyhow!("gateway offline"))
        }
    }

    struct TypingDown;

    #[async_trait]
    impl ChannelActions for TypingDown {
        async fn delete_message(&self, _ctx: &MessageContext) -> Result<()> {
            Ok(())
        }
        async fn start_typing(&self, _ctx: &MessageContext) -> Result<()> {
            Err(anyhow!("rate limited"))
        }
        async fn has_permission(&self, _ctx: &MessageContext, _permission: &str) -> Result<bool> {
            Ok(true)
        }
    }

    struct Collaborators {
        dispatcher: CommandDispatcher,
        responder: Arc<RecordingResponder>,
        handler: Arc<RecordingHandler>,
        observer: Arc<RecordingObserver>,
    }

    fn with_collaborators(
        spec: CommandSpec,
        directory: Arc<dyn Directory>,
        actions: Arc<dyn ChannelActions>,
    ) -> Collaborators {
        let registry = Arc::new(CommandRegistry::new());
        let handler = Arc::new(RecordingHandler::default());
        registry.register(spec, handler.clone()).unwrap();
        let responder = Arc::new(RecordingResponder::default());
        let observer = Arc::new(RecordingObserver::new());
        let dispatcher = CommandDispatcher::new(
            registry,
            DispatchSettings::default(),
            directory,
            actions,
            responder.clone(),
            observer.clone(),
        );
        Collaborators { dispatcher, responder, handler, observer }
    }

    #[tokio::test]
    async fn directory_failure_notifies_once_and_returns_typed_error() {
        let spec = CommandSpec::new("whois")
            .description("Look someone up")
            .arguments(vec![ArgumentSpec::new("who", ArgKind::User, "Who")]);
        let c = with_collaborators(spec, Arc::new(OfflineDirectory), Arc::new(RecordingActions::default()));

        let err = c.dispatcher.dispatch(&message("!whois ana")).await.unwrap_err();
        assert!(matches!(err, DispatchError::Directory { ref command, .. } if command == "whois"));
        assert!(c.handler.calls.lock().unwrap().is_empty());

        let recorded = c.responder.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].kind, "unavailable");
        assert_eq!(recorded[0].detail, "directory");
        assert!(c.observer.events().iter().any(|e| matches!(
            e,
            CommandEvent::CollaboratorFailed { stage, .. } if stage == "directory"
        )));
    }

    #[tokio::test]
    async fn action_failure_notifies_once_and_returns_typed_error() {
        let spec = ping().typing(true);
        let c = with_collaborators(spec, Arc::new(StaticDirectory::default()), Arc::new(TypingDown));

        let err = c.dispatcher.dispatch(&message("!ping")).await.unwrap_err();
        assert!(matches!(err, DispatchError::Action { action: "start_typing", .. }));
        assert!(c.handler.calls.lock().unwrap().is_empty());

        let recorded = c.responder.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].kind, "unavailable");
        assert_eq!(recorded[0].detail, "start_typing");
    }

    #[test]
    fn resolved_flags_do_not_touch_the_spec() {
        let spec = ping();
        let settings = DispatchSettings { typing_default: true, ..Default::default() };
        let flags = ResolvedFlags::resolve(&spec.flags, &settings);
        assert!(flags.typing);
        assert_eq!(spec.flags.typing, None);
    }
}
