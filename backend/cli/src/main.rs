mod check_cmd;
mod console;
mod demo;
mod settings;
mod slash_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::info;

use chatcmd_commands::{CommandDispatcher, TracingObserver};
use chatcmd_config::{
    collect_referenced_vars, config_dir, config_file_path, load_config_value, load_unlogged, log_report,
};
use chatcmd_core::{ChannelRef, ChatCmdError, Directory, UserRef};
use chatcmd_logging::init_logger;

use console::{ConsoleActions, ConsoleResponder, ConsoleSession};

#[derive(Parser)]
#[command(name = "chatcmd")]
#[command(about = "Chat command dispatcher with a console front end")]
#[command(version)]
struct Cli {
    /// Config file (default: $CHATCMD_CONFIG_DIR/config.yaml or ~/.chatcmd/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read messages from stdin, one per line, and dispatch them
    Run {
        /// User id (or name from the config directory) to speak as
        #[arg(long, default_value = "1")]
        user: String,
        /// Channel id (or name) the messages are posted in
        #[arg(long, default_value = "10")]
        channel: String,
        /// Simulate a direct message instead of a server channel
        #[arg(long)]
        dm: bool,
        /// Permission granted to the speaker; repeatable
        #[arg(long = "grant")]
        grants: Vec<String>,
    },
    /// Validate the config file and command schemas
    Check,
    /// Print slash command declarations for the demo commands as JSON
    Slash {
        #[arg(long)]
        compact: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = cli.config.clone().unwrap_or_else(|| config_file_path(&config_dir()));

    let (config, report) = load_unlogged(&path).await?;
    let (log_dir, level, json) = settings::logging(&config);
    init_logger(log_dir.as_deref(), &level, json);
    log_report(&report);

    match cli.command {
        Commands::Check => {
            let referenced = collect_referenced_vars(&load_config_value(&path).await?);
            check_cmd::run(&path, &config, &report, &referenced)?
        }
        Commands::Slash { compact } => slash_cmd::run(compact)?,
        Commands::Run { user, channel, dm, grants } => {
            if !report.is_valid() {
                return Err(ChatCmdError::ConfigError(format!(
                    "{} error(s) in {}; run `chatcmd check` for details",
                    report.errors.len(),
                    path.display()
                ))
                .into());
            }

            let directory = settings::directory(&config);
            let author = directory
                .resolve_user(&user)
                .await?
                .unwrap_or_else(|| UserRef::new(&user, "console"));
            let channel = directory
                .resolve_channel(&channel)
                .await?
                .unwrap_or_else(|| ChannelRef::new(&channel, "console"));
            let session = ConsoleSession {
                author,
                channel,
                server_id: (!dm).then(|| "console".to_string()),
                self_id: "0".to_string(),
            };

            let dispatcher = CommandDispatcher::new(
                demo::build_registry()?,
                settings::dispatch_settings(&config),
                Arc::new(directory),
                Arc::new(ConsoleActions::new(grants)),
                Arc::new(ConsoleResponder),
                Arc::new(TracingObserver),
            );

            info!(
                user = %session.author,
                channel = %session.channel,
                prefixes = ?dispatcher.settings().prefixes,
                "Console ready; type messages, Ctrl-D to quit"
            );
            let handled = console::run_lines(BufReader::new(tokio::io::stdin()), &dispatcher, &session).await?;
            info!(handled, "Input closed");
        }
    }

    Ok(())
}
