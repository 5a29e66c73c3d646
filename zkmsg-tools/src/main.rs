use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zkmsg_aggregator::{
    AgentReport, AggregateProof, AggregatorConfig, MaxTracker, MessageProver,
};
use zkmsg_common::hash_bytes_hex;

mod config;
mod demo;

use config::{ZkmsgConfig, CONFIG_ENV};

#[derive(Parser)]
#[command(name = "zkmsg", about = "Drive zkmsg aggregation, tracking and demo scenarios")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fold a JSON list of agent reports into one aggregate proof.
    Aggregate(AggregateArgs),
    /// Feed aggregate proofs to a max tracker and print its state.
    Track(TrackArgs),
    /// Run the eligibility / one-shot deposit scenario.
    DepositDemo,
    /// Run the agent mailbox anti-replay scenario.
    MailboxDemo,
    /// Print the effective configuration.
    ShowConfig,
}

#[derive(Args)]
struct AggregateArgs {
    /// JSON file holding an array of reports.
    #[arg(long)]
    input: PathBuf,
    /// Proof to continue folding from.
    #[arg(long)]
    prev: Option<PathBuf>,
    /// Where to write the proof; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Override the configured seed.
    #[arg(long)]
    seed: Option<u32>,
}

#[derive(Args)]
struct TrackArgs {
    /// Proof files, submitted in order.
    #[arg(required = true)]
    proofs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ZkmsgConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Aggregate(args) => aggregate(config, args),
        Commands::Track(args) => track(config, args),
        Commands::DepositDemo => print_json(&demo::run_deposit(config.deposit)?),
        Commands::MailboxDemo => print_json(&demo::run_mailbox(config.mailbox)?),
        Commands::ShowConfig => print_json(&config),
    }
}

fn aggregate(mut config: ZkmsgConfig, args: AggregateArgs) -> Result<()> {
    if let Some(seed) = args.seed {
        config.aggregator.seed = seed;
    }
    let reports: Vec<AgentReport> = read_json(&args.input)?;
    let prev = args
        .prev
        .as_ref()
        .map(|path| read_json::<AggregateProof>(path))
        .transpose()?;

    let prover = shared_prover(config.aggregator)?;
    let proof = prover
        .batch_messages(&reports, prev)
        .context("failed to fold reports")?;

    let json = proof.to_json()?;
    match args.output {
        Some(path) => {
            fs::write(&path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                path = %path.display(),
                output = proof.public_output,
                fingerprint = %hash_bytes_hex(json.as_bytes()),
                "proof written"
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn track(config: ZkmsgConfig, args: TrackArgs) -> Result<()> {
    let mut tracker = MaxTracker::new(shared_prover(config.aggregator)?);
    for path in &args.proofs {
        let proof: AggregateProof = read_json(path)?;
        tracker
            .step(&proof)
            .with_context(|| format!("proof {} rejected", path.display()))?;
    }
    print_json(&tracker.state())
}

/// Proofs cross process boundaries here, so the key must come from config.
fn shared_prover(config: AggregatorConfig) -> Result<MessageProver> {
    if config.secret.is_none() {
        bail!("aggregator.secret must be set to produce or track proofs across runs");
    }
    Ok(MessageProver::new(config))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
