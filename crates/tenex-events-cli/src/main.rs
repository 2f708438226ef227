use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tenex_events::{RelayStopPublisher, SortOrder, StopDispatcher};
use tenex_events_cli::cli::commands::{outcome_to_json, stop_succeeded, validate_stop_targets};
use tenex_events_cli::cli::{
    keys_from_secret, load_events, run_dedupe, run_metadata, run_operations, run_stop, CliConfig,
};
use tenex_events_cli::tracing_setup::init_tracing;
use tracing::info;

#[derive(Parser)]
#[command(name = "tenex-events")]
#[command(about = "Inspect TENEX event dumps and send stop commands")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short, global = true)]
    pretty: bool,

    /// Path to JSON config file (relayUrl, credentials, protocol overrides)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Keep the newest event per reference tag value, sorted by time
    Dedupe {
        /// JSON array or JSON lines of events
        file: PathBuf,
        /// Grouping tag (defaults to the configured root reference tag)
        #[arg(long)]
        tag: Option<String>,
        /// Oldest first instead of newest first
        #[arg(long)]
        ascending: bool,
    },

    /// Project conversation metadata (kind:513) events
    Metadata {
        file: PathBuf,
    },

    /// List operations still running after replaying status (kind:24133) events
    Operations {
        file: PathBuf,
        /// Only operations for this project (a-tag format)
        #[arg(long)]
        project: Option<String>,
    },

    /// Publish a stop command (kind:24134) for events or conversations
    Stop {
        /// Project ID (a-tag format)
        #[arg(long)]
        project: String,
        /// Event or conversation IDs to stop
        #[arg(required = true)]
        event_ids: Vec<String>,
        /// Only stop these agents (can be specified multiple times)
        #[arg(long = "agent")]
        agents: Vec<String>,
        /// nsec, hex or ncryptsec key (overrides config credentials)
        #[arg(long)]
        key: Option<String>,
        /// Password for an ncryptsec key
        #[arg(long)]
        password: Option<String>,
        /// Relay URL (overrides config)
        #[arg(long)]
        relay: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Warning: {:#}", e);
    }

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false when the command ran but did not succeed
async fn run(cli: Cli) -> Result<bool> {
    let config = CliConfig::resolve(cli.config.as_deref())?;
    let protocol = &config.protocol;

    let (output, ok) = match cli.command {
        Commands::Dedupe { file, tag, ascending } => {
            let events = load_events(&file)?;
            let tag = tag.unwrap_or_else(|| protocol.tags.root_ref.clone());
            let order = if ascending {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            };
            (run_dedupe(events, &tag, order), true)
        }
        Commands::Metadata { file } => {
            let events = load_events(&file)?;
            (run_metadata(&events, protocol), true)
        }
        Commands::Operations { file, project } => {
            let events = load_events(&file)?;
            (run_operations(&events, protocol, project.as_deref()), true)
        }
        Commands::Stop {
            project,
            event_ids,
            agents,
            key,
            password,
            relay,
        } => {
            validate_stop_targets(&event_ids)?;
            let (secret, password) = match key {
                Some(key) => (key, password),
                None => {
                    let creds = config
                        .credentials
                        .clone()
                        .context("No key given and no credentials in config")?;
                    (creds.key, password.or(creds.password))
                }
            };
            let keys = keys_from_secret(&secret, password.as_deref())?;
            let relay_url = relay.as_deref().unwrap_or_else(|| config.relay_url());

            info!(relay = %relay_url, pubkey = %keys.public_key().to_hex(), "Connecting to relay");
            let publisher = RelayStopPublisher::connect(relay_url, keys, protocol.clone()).await?;
            let dispatcher = StopDispatcher::new(publisher, protocol);
            let outcome = run_stop(&dispatcher, &project, &event_ids, &agents).await;
            dispatcher.publisher().disconnect().await;

            let outcome = outcome?;
            (outcome_to_json(&outcome), stop_succeeded(&outcome))
        }
    };

    print_json(&output, cli.pretty)?;
    Ok(ok)
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}
