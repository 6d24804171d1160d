//! Command-line entry point for the PharmaSignal diagnostic engine.
//!
//! Every subcommand reads the file-backed mention store, runs one read-only
//! analysis for a drug and prints the result as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pharmasignal_common::{
    validate_window_days, Config, DiagnosticResult, LogFormat, MentionStore, NodeMode,
};
use pharmasignal_graph::{
    analyze_belief_trajectory, emotion_timeline, perception_counts, summarize,
};

#[derive(Parser)]
#[command(name = "pharmasignal")]
#[command(about = "Directional perception diagnostics for tracked drugs")]
#[command(version)]
struct Cli {
    /// Path to the mention store (overrides STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Drug(DrugCommand),

    /// JSON Schema of the propagation diagnostic result
    Schema,
}

/// Analyses scoped to one drug; each one reads the mention store.
#[derive(Subcommand)]
enum DrugCommand {
    /// Cluster diagnostics over the reply graph of one drug
    Propagation {
        drug_id: i64,

        /// Node grouping: "mention" or "thread" (defaults to NODE_MODE)
        #[arg(long)]
        node_mode: Option<String>,
    },

    /// Coarse belief trajectory from perception counts
    Trajectory { drug_id: i64 },

    /// Perceived-effectiveness distribution
    Perception { drug_id: i64 },

    /// Primary-emotion distribution over a recent window
    Timeline {
        drug_id: i64,

        /// Window length in days (defaults to TIMELINE_WINDOW_DAYS)
        #[arg(long)]
        window_days: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    init_tracing(config.log_format)?;
    config.log_redacted();

    let output = match cli.command {
        Commands::Schema => serde_json::to_value(schemars::schema_for!(DiagnosticResult))?,
        Commands::Drug(command) => {
            let store = MentionStore::load(&config.store_path).await?;
            info!(
                mentions = store.mention_count(),
                path = %config.store_path.display(),
                "Mention store loaded"
            );
            analyze(&store, &config, command)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn analyze(store: &MentionStore, config: &Config, command: DrugCommand) -> Result<Value> {
    let value = match command {
        DrugCommand::Propagation { drug_id, node_mode } => {
            let mode: NodeMode = match node_mode {
                Some(raw) => raw.parse()?,
                None => config.node_mode,
            };
            serde_json::to_value(summarize(&store.snapshot(drug_id), mode))?
        }
        DrugCommand::Trajectory { drug_id } => {
            serde_json::to_value(analyze_belief_trajectory(&store.snapshot(drug_id)))?
        }
        DrugCommand::Perception { drug_id } => {
            serde_json::to_value(perception_counts(&store.snapshot(drug_id)))?
        }
        DrugCommand::Timeline {
            drug_id,
            window_days,
        } => {
            let window_days = match window_days {
                Some(days) => validate_window_days(days)?,
                None => config.timeline_window_days,
            };
            serde_json::to_value(emotion_timeline(
                &store.snapshot(drug_id),
                window_days,
                chrono::Utc::now(),
            ))?
        }
    };
    Ok(value)
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("pharmasignal=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}
