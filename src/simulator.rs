//! Simulation orchestrator
//!
//! Loads price data once, loads scenario files, and runs them through the
//! calculation engine. Scenarios are independent of each other; they share
//! only the read-only price table held by the calculator.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokenmeter_core::{CostCalculator, PriceTable, Scenario, SimulationResult};
use tokenmeter_prices::{PriceFetcher, SystemClock};
use tracing::info;

/// Orchestrates pricing simulations
pub struct Simulator {
    fetcher: Option<PriceFetcher>,
    calculator: Option<CostCalculator>,
}

impl Simulator {
    /// Create a simulator fetching prices into `cache_dir`
    pub fn new(cache_dir: impl AsRef<Path>) -> Result<Self> {
        let fetcher = PriceFetcher::new(cache_dir, Arc::new(SystemClock))
            .context("failed to initialize price fetcher")?;
        Ok(Self {
            fetcher: Some(fetcher),
            calculator: None,
        })
    }

    /// Create a simulator over an already-loaded price table
    ///
    /// Embedding and test seam: no cache directory, no network.
    #[must_use]
    pub fn with_prices(prices: PriceTable) -> Self {
        Self {
            fetcher: None,
            calculator: Some(CostCalculator::new(prices)),
        }
    }

    /// Load price data from cache/remote and build the calculator
    pub async fn load_prices(&mut self, force_refresh: bool) -> Result<()> {
        let Some(fetcher) = &self.fetcher else {
            // Prices were injected; nothing to fetch.
            return Ok(());
        };

        let prices = fetcher
            .fetch_prices(force_refresh)
            .await
            .context("failed to load price data")?;
        info!(models = prices.len(), "loaded model prices");
        self.calculator = Some(CostCalculator::new(prices));
        Ok(())
    }

    /// Load a scenario from a JSON file
    pub fn load_scenario(path: &Path) -> Result<Scenario> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid scenario file {}", path.display()))
    }

    /// Run one scenario against the loaded prices
    pub fn run_scenario(&self, scenario: &Scenario) -> Result<SimulationResult> {
        let Some(calculator) = &self.calculator else {
            bail!("prices must be loaded before running scenarios");
        };

        info!(
            scenario = %scenario.name,
            models = scenario.models.len(),
            intent_groups = scenario.intent_groups.len(),
            "running scenario"
        );
        Ok(calculator.calculate(scenario)?)
    }

    /// Load prices if needed, then load and run a scenario file
    pub async fn run_scenario_file(
        &mut self,
        path: &Path,
        force_refresh: bool,
    ) -> Result<(String, SimulationResult)> {
        if self.calculator.is_none() || force_refresh {
            self.load_prices(force_refresh).await?;
        }

        let scenario = Self::load_scenario(path)?;
        let result = self.run_scenario(&scenario)?;
        Ok((scenario.name, result))
    }

    /// Run multiple scenario files against one price load
    pub async fn compare_scenarios(
        &mut self,
        paths: &[impl AsRef<Path>],
    ) -> Result<Vec<(String, SimulationResult)>> {
        if self.calculator.is_none() {
            self.load_prices(false).await?;
        }

        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            let scenario = Self::load_scenario(path.as_ref())?;
            let result = self.run_scenario(&scenario)?;
            results.push((scenario.name, result));
        }
        Ok(results)
    }
}
