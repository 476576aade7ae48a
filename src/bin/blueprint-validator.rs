//! Batch driver over a directory of exported blueprint assets.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use blueprint_validator::batch::{
    AssetFilter, BatchAction, BatchDriver, DirectoryRegistry, EXIT_FAILURE, NodeAction,
};
use blueprint_validator::config::ValidatorConfig;
use blueprint_validator::validate::BlueprintGraphValidator;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ActionArg {
    Validate,
    CountNodes,
    RefreshNodes,
    DeleteNodes,
    Stats,
}

#[derive(Debug, Parser)]
#[command(name = "blueprint-validator", version, about = "Validate blueprint graphs in batch")]
struct Cli {
    /// Directory containing exported blueprint `*.json` files.
    #[arg(long)]
    assets: PathBuf,

    /// Validator settings JSON; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "validate")]
    action: ActionArg,

    /// Only process assets whose object path starts with one of these prefixes.
    #[arg(long = "filter", value_name = "PATH_PREFIX")]
    filters: Vec<String>,

    /// CSV output file for `--action stats`.
    #[arg(long, default_value = "blueprint_stats.csv")]
    out: PathBuf,

    /// Validate independent assets on a worker pool.
    #[arg(long)]
    parallel: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(EXIT_FAILURE as u8)
        }
    }
}

fn run(cli: Cli) -> Result<i32, blueprint_validator::error::ValidatorError> {
    let config = match &cli.config {
        Some(path) => ValidatorConfig::from_path(path)?,
        None => ValidatorConfig::default(),
    };
    let mut registry = DirectoryRegistry::open(&cli.assets)?;

    let action = match cli.action {
        ActionArg::Validate => BatchAction::Validate,
        ActionArg::CountNodes => BatchAction::FindNodes(NodeAction::Count),
        ActionArg::RefreshNodes => BatchAction::FindNodes(NodeAction::Refresh),
        ActionArg::DeleteNodes => BatchAction::FindNodes(NodeAction::Delete),
        ActionArg::Stats => BatchAction::BlueprintStats { out_file: cli.out.clone() },
    };

    let filter = AssetFilter {
        path_prefixes: cli.filters,
        blueprints_only: true,
    };
    let driver = BatchDriver::new(BlueprintGraphValidator::new(config), filter).with_parallel(cli.parallel);
    let outcome = driver.run(&action, &mut registry)?;
    if outcome.matched_nothing() {
        tracing::error!(root = %registry.root().display(), "no assets matched the filter");
    }
    if !outcome.saved_packages.is_empty() {
        tracing::info!(packages = ?outcome.saved_packages, "saved packages");
    }

    Ok(outcome.exit_status(&action))
}
