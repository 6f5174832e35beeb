//! Nostrkit Demo CLI
//!
//! Command-line interface for creating and opening private Nostr envelopes.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod identity;
mod settings;
mod ui;

#[derive(Parser)]
#[command(name = "nostrkit-demo")]
#[command(about = "Nostrkit Demo CLI - Build and open private Nostr envelopes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Custom storage directory
    #[arg(long, global = true, env = "NOSTRKIT_DEMO_DIR")]
    storage_dir: Option<PathBuf>,

    /// Messaging config file (TOML). Defaults to <storage-dir>/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and save a new identity
    Keygen {
        /// Name for this identity
        #[arg(short, long)]
        name: String,

        /// Overwrite an existing identity with the same name
        #[arg(long)]
        force: bool,
    },

    /// Show the public key of a saved identity
    Whoami {
        /// Identity name
        #[arg(short, long)]
        name: String,
    },

    /// Encrypt a message for one recipient
    Send {
        /// Sending identity
        #[arg(long)]
        from: String,

        /// Recipient public key (hex)
        #[arg(long)]
        to: String,

        /// Privacy level (giftwrapped, encrypted, standard)
        #[arg(short, long)]
        level: Option<String>,

        /// Gift-wrap delay in minutes
        #[arg(short, long)]
        delay: Option<u32>,

        /// Write the envelope here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Message text
        message: String,
    },

    /// Decrypt an envelope produced by `send` or `group-send`
    Open {
        /// Receiving identity
        #[arg(long = "as")]
        identity: String,

        /// Counterpart public key for pairwise envelopes
        #[arg(long)]
        sender: Option<String>,

        /// Envelope file, or - for stdin
        input: String,
    },

    /// Fan a group message out to every member
    GroupSend {
        /// Sending identity
        #[arg(long)]
        from: String,

        /// Channel id (hex)
        #[arg(long)]
        channel: String,

        /// Member public key (repeatable)
        #[arg(long = "member", required = true)]
        members: Vec<String>,

        /// Privacy level (giftwrapped, encrypted, standard)
        #[arg(short, long)]
        level: Option<String>,

        /// Gift-wrap delay in minutes
        #[arg(short, long)]
        delay: Option<u32>,

        /// Mark the message as requiring guardian approval
        #[arg(long)]
        approval: bool,

        /// Write the delivery report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Message text
        message: String,
    },

    /// Report kind and id validity of an event or envelope
    Inspect {
        /// Event file, or - for stdin
        input: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays pipeable
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("nostrkit_demo_cli=debug,nostrkit_lib=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("nostrkit_demo_cli=info,nostrkit_lib=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let storage_dir = cli.storage_dir.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nostrkit-demo")
    });

    let result = match cli.command {
        Commands::Keygen { name, force } => {
            commands::keygen::run(&storage_dir, &name, force, cli.verbose).await
        }
        Commands::Whoami { name } => commands::whoami::run(&storage_dir, &name).await,
        Commands::Send {
            from,
            to,
            level,
            delay,
            output,
            message,
        } => {
            let config = settings::load(cli.config.as_deref(), &storage_dir)?;
            commands::send::run(
                &storage_dir,
                &config,
                commands::send::SendArgs {
                    from: &from,
                    to: &to,
                    level: level.as_deref(),
                    delay,
                    output: output.as_deref(),
                    message: &message,
                },
            )
            .await
        }
        Commands::Open {
            identity,
            sender,
            input,
        } => commands::open::run(&storage_dir, &identity, sender.as_deref(), &input).await,
        Commands::GroupSend {
            from,
            channel,
            members,
            level,
            delay,
            approval,
            output,
            message,
        } => {
            let config = settings::load(cli.config.as_deref(), &storage_dir)?;
            commands::group::send(
                &storage_dir,
                &config,
                commands::group::GroupSendArgs {
                    from: &from,
                    channel: &channel,
                    members,
                    level: level.as_deref(),
                    delay,
                    approval,
                    output: output.as_deref(),
                    message: &message,
                },
            )
            .await
        }
        Commands::Inspect { input } => commands::inspect::run(&input).await,
    };

    if let Err(err) = result {
        ui::error(&format!("{:#}", err));
        std::process::exit(1);
    }
    Ok(())
}
