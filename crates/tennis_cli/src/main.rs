//! tennis_sim CLI
//!
//! Reads simulation requests from disk, runs the core, writes JSON reports.
//! Logs go to stderr so stdout stays machine-readable.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tennis_core::api::ScoreResponse;
use tennis_core::data::builtin_rulesets;
use tennis_core::{
    AggregateResult, FlatSummary, MatchCounters, MonteCarloRunner, RulesetRegistry, SimConfig,
    SimulationRequest, SCHEMA_VERSION, VERSION,
};

#[derive(Parser, Debug)]
#[command(name = "tennis_sim")]
#[command(about = "Monte Carlo tennis match simulator", long_about = None)]
struct Cli {
    /// Runner config (JSON or YAML). Falls back to $TENNIS_SIM_CONFIG_PATH.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate a matchup from a JSON request file
    Simulate {
        /// Request JSON file path
        #[arg(long)]
        request: PathBuf,

        /// Override the request's trial count
        #[arg(long)]
        trials: Option<u32>,

        /// Override the request's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the request's fantasy ruleset
        #[arg(long)]
        ruleset: Option<String>,

        /// Custom rulesets YAML file
        #[arg(long)]
        rulesets: Option<PathBuf>,

        /// Stop launching trials after this many milliseconds
        #[arg(long)]
        time_budget_ms: Option<u64>,

        /// Emit the flat per-match record instead of the full result
        #[arg(long, default_value = "false")]
        flat: bool,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Score one counters record
    Score {
        /// Counters JSON file path
        #[arg(long)]
        counters: PathBuf,

        #[arg(long)]
        ruleset: Option<String>,

        /// Custom rulesets YAML file
        #[arg(long)]
        rulesets: Option<PathBuf>,
    },

    /// Print ruleset tables as YAML
    Rulesets {
        /// Custom rulesets YAML file
        #[arg(long)]
        rulesets: Option<PathBuf>,
    },

    /// Print the JSON schema of a simulation request
    Schema,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ReportBody {
    Full(AggregateResult),
    Flat(FlatSummary),
}

#[derive(Serialize)]
struct Report {
    generated_at: String,
    engine_version: &'static str,
    result: ReportBody,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    match path {
        Some(path) => SimConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => SimConfig::from_env().context("Failed to load config from environment"),
    }
}

fn load_registry(path: Option<&Path>) -> Result<RulesetRegistry> {
    match path {
        Some(path) => {
            let yaml = fs::read_to_string(path)
                .with_context(|| format!("Failed to read rulesets from {}", path.display()))?;
            RulesetRegistry::from_yaml(&yaml)
                .with_context(|| format!("Invalid rulesets in {}", path.display()))
        }
        None => Ok(builtin_rulesets().clone()),
    }
}

#[allow(clippy::too_many_arguments)]
fn simulate(
    config: SimConfig,
    request_path: &Path,
    trials: Option<u32>,
    seed: Option<u64>,
    ruleset: Option<String>,
    rulesets: Option<&Path>,
    time_budget_ms: Option<u64>,
    flat: bool,
) -> Result<String> {
    let content = fs::read_to_string(request_path)
        .with_context(|| format!("Failed to read request from {}", request_path.display()))?;
    let mut request: SimulationRequest = serde_json::from_str(&content)
        .with_context(|| format!("Invalid request JSON in {}", request_path.display()))?;
    anyhow::ensure!(
        request.schema_version == SCHEMA_VERSION,
        "Unsupported schema version: {}",
        request.schema_version
    );

    if trials.is_some() {
        request.trials = trials;
    }
    if seed.is_some() {
        request.seed = seed;
    }
    if ruleset.is_some() {
        request.ruleset = ruleset;
    }

    let mut config = config;
    if time_budget_ms.is_some() {
        config.time_budget_ms = time_budget_ms;
    }

    let runner = MonteCarloRunner::new(config)?.with_registry(load_registry(rulesets)?);
    let result = runner.run(&request)?;
    info!(
        trials = result.trials_completed,
        seed = result.seed,
        cancelled = result.cancelled,
        "simulation complete"
    );

    let report = Report {
        generated_at: chrono::Utc::now().to_rfc3339(),
        engine_version: VERSION,
        result: if flat { ReportBody::Flat(result.to_flat()) } else { ReportBody::Full(result) },
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn score(counters_path: &Path, ruleset: Option<&str>, rulesets: Option<&Path>) -> Result<String> {
    let content = fs::read_to_string(counters_path)
        .with_context(|| format!("Failed to read counters from {}", counters_path.display()))?;
    let counters: MatchCounters = serde_json::from_str(&content)
        .with_context(|| format!("Invalid counters JSON in {}", counters_path.display()))?;

    let registry = load_registry(rulesets)?;
    let resolved = registry.resolve(ruleset);
    let response = ScoreResponse {
        schema_version: SCHEMA_VERSION,
        points: resolved.table.score(&counters),
        ruleset_requested: resolved.requested,
        ruleset: resolved.resolved,
        ruleset_fallback: resolved.fell_back,
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

fn request_schema() -> Result<String> {
    let schema = schemars::schema_for!(SimulationRequest);
    Ok(serde_json::to_string_pretty(&schema)?)
}

fn write_output(output: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{output}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            request,
            trials,
            seed,
            ruleset,
            rulesets,
            time_budget_ms,
            flat,
            out,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let report = simulate(
                config,
                &request,
                trials,
                seed,
                ruleset,
                rulesets.as_deref(),
                time_budget_ms,
                flat,
            )?;
            write_output(&report, out.as_deref())?;
        }

        Commands::Score { counters, ruleset, rulesets } => {
            let output = score(&counters, ruleset.as_deref(), rulesets.as_deref())?;
            write_output(&output, None)?;
        }

        Commands::Rulesets { rulesets } => {
            let registry = load_registry(rulesets.as_deref())?;
            write_output(&registry.to_yaml()?, None)?;
        }

        Commands::Schema => {
            write_output(&request_schema()?, None)?;
        }
    }

    Ok(())
}
