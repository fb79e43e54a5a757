//! CLI for Tokenmeter
//!
//! Modes:
//! - `tokenmeter <scenario.json>`: run one scenario
//! - `tokenmeter --all`: run every scenario in the scenario directory
//! - `tokenmeter --compare a.json b.json`: compare specific scenarios

use crate::report::{self, OutputFormat};
use crate::simulator::Simulator;
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Tokenmeter CLI
#[derive(Parser, Debug)]
#[command(name = "tokenmeter")]
#[command(about = "Monthly cost projection for multi-provider LLM workloads")]
#[command(version)]
pub struct Cli {
    /// Path to a scenario JSON file
    pub scenario: Option<PathBuf>,

    /// Run all scenarios in the scenario directory
    #[arg(long)]
    pub all: bool,

    /// Compare multiple scenario files
    #[arg(long, num_args = 1.., value_name = "FILE")]
    pub compare: Vec<PathBuf>,

    /// Force refresh price data from the remote feed
    #[arg(long)]
    pub refresh: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save the rendered report to a file
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,

    /// Directory scanned by --all
    #[arg(long, default_value = "scenarios", value_name = "DIR")]
    pub scenario_dir: PathBuf,

    /// Directory for the price cache and overrides file
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> Result<()> {
    if cli.scenario.is_none() && !cli.all && cli.compare.is_empty() {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(());
    }

    let cache_dir = cli.cache_dir.clone().unwrap_or_else(default_cache_dir);
    let mut simulator = Simulator::new(&cache_dir)?;

    let rendered = if cli.all {
        let files = scenario_files(&cli.scenario_dir)?;
        info!(count = files.len(), "running all scenarios");
        simulator.load_prices(cli.refresh).await?;
        let results = simulator.compare_scenarios(&files).await?;
        report::render_comparison(&results, cli.output)?
    } else if !cli.compare.is_empty() {
        for file in &cli.compare {
            if !file.exists() {
                bail!("scenario file not found: {}", file.display());
            }
        }
        simulator.load_prices(cli.refresh).await?;
        let results = simulator.compare_scenarios(&cli.compare).await?;
        report::render_comparison(&results, cli.output)?
    } else {
        // Presence checked above.
        let path = cli.scenario.as_deref().context("scenario path missing")?;
        if !path.exists() {
            bail!("scenario file not found: {}", path.display());
        }
        let (_, result) = simulator.run_scenario_file(path, cli.refresh).await?;
        report::render(&result, cli.output)?
    };

    println!("{rendered}");

    if let Some(save_path) = &cli.save {
        if let Some(parent) = save_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(save_path, &rendered)
            .with_context(|| format!("failed to save report to {}", save_path.display()))?;
        info!(path = %save_path.display(), "results saved");
    }

    Ok(())
}

/// Scenario files under `dir`, sorted by name, excluding the template
fn scenario_files(dir: &std::path::Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read scenario directory {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "json")
                && path
                    .file_name()
                    .is_some_and(|name| name != "template.json")
        })
        .collect();
    files.sort();

    if files.is_empty() {
        bail!("no scenario files found in {}", dir.display());
    }
    Ok(files)
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("tokenmeter"))
        .unwrap_or_else(|| PathBuf::from("data"))
}
