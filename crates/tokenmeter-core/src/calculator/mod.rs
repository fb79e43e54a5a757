//! Cost Calculation Engine
//!
//! Evaluates a [`Scenario`] against a price table to produce a
//! [`SimulationResult`]. Pure arithmetic over in-memory data: the only side
//! effect is a warning when a model id is missing from the price table.
//! Identical inputs always produce identical results.

use crate::error::{Error, Result};
use crate::price::{ModelPrice, PriceOverride, PriceTable};
use crate::result::{GroupCost, ModelCost, ResultMeta, SimulationResult, StepCost};
use crate::scenario::{FlowStep, Frequency, IntentGroup, ModelSelector, Scenario, TokenStrategy};
use tracing::warn;


/// Assumed prompt size (tokens) for the from-prompt strategy when no fixed
/// value is given. Placeholder until real prompt text is measured.
const DEFAULT_PROMPT_TOKENS: u64 = 150;

/// Insertion-ordered cost accumulator
///
/// Keeps breakdown lists deterministic without depending on hash ordering.
/// Entry counts are small (tracked models, step names), so linear scans are
/// fine.
#[derive(Debug, Default)]
struct CostLedger {
    entries: Vec<(String, f64)>,
}

impl CostLedger {
    /// Ensure a key exists, so zero-cost models still appear in the output
    fn seed(&mut self, key: &str) {
        if !self.entries.iter().any(|(k, _)| k == key) {
            self.entries.push((key.to_string(), 0.0));
        }
    }

    fn add(&mut self, key: &str, amount: f64) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 += amount;
        } else {
            self.entries.push((key.to_string(), amount));
        }
    }
}

/// Round a currency figure to 2 decimals, at the point of output only
fn round_usd(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Calculates costs for LLM usage scenarios
///
/// Holds a read-only price table for its lifetime; stateless across calls.
#[derive(Debug, Clone)]
pub struct CostCalculator {
    prices: PriceTable,
}

impl CostCalculator {
    /// Create a calculator over a price table
    #[must_use]
    pub fn new(prices: PriceTable) -> Self {
        Self { prices }
    }

    /// Calculate monthly costs for a complete scenario
    ///
    /// # Errors
    ///
    /// Returns a configuration error (no partial result) when a custom
    /// frequency lacks its run count, or a step's input token strategy
    /// depends on a previous output that does not exist.
    pub fn calculate(&self, scenario: &Scenario) -> Result<SimulationResult> {
        let mut total_cost = 0.0;
        let mut total_calls: u64 = 0;

        let mut by_model = CostLedger::default();
        for model_id in &scenario.models {
            by_model.seed(model_id);
        }
        let mut by_step = CostLedger::default();
        let mut by_intent_group = Vec::with_capacity(scenario.intent_groups.len());

        for group in &scenario.intent_groups {
            let (group_cost, group_calls) =
                self.calculate_intent_group(group, scenario, &mut by_model, &mut by_step)?;

            by_intent_group.push(GroupCost {
                name: group.name.clone(),
                cost_usd: round_usd(group_cost),
                calls: group_calls,
                // Per-step token aggregates are not tracked; reported as zero.
                input_tokens: 0,
                output_tokens: 0,
            });

            total_cost += group_cost;
            total_calls += group_calls;
        }

        Ok(SimulationResult {
            total_monthly_cost_usd: round_usd(total_cost),
            by_model: by_model
                .entries
                .into_iter()
                .map(|(model, cost)| ModelCost {
                    model,
                    cost_usd: round_usd(cost),
                })
                .collect(),
            by_intent_group,
            by_step: by_step
                .entries
                .into_iter()
                .map(|(step, cost)| StepCost {
                    step,
                    cost_usd: round_usd(cost),
                })
                .collect(),
            total_calls_per_month: total_calls,
            total_input_tokens_per_month: 0,
            total_output_tokens_per_month: 0,
            meta: self.price_metadata(),
        })
    }

    /// Walk one intent group's flow steps, accumulating into the shared
    /// by-model and by-step ledgers. Returns (group cost, group call count).
    fn calculate_intent_group(
        &self,
        group: &IntentGroup,
        scenario: &Scenario,
        by_model: &mut CostLedger,
        by_step: &mut CostLedger,
    ) -> Result<(f64, u64)> {
        let runs_per_month = runs_per_month(group, scenario.days_per_month)?;
        let total_prompts = group.total_prompts();

        let mut group_cost = 0.0;
        let mut previous_output_tokens: Option<u64> = None;

        for step in &group.flow_steps {
            let input_tokens = resolve_input_tokens(step, previous_output_tokens)?;

            // A step pinned to one model still processes the fan-out output
            // of every tracked model, so its prompt count is multiplied by
            // the tracked model count. Local to this step only.
            let (models_for_step, effective_prompts): (Vec<&str>, u64) = match &step.uses_model {
                ModelSelector::AllTracked => (
                    scenario.models.iter().map(String::as_str).collect(),
                    total_prompts,
                ),
                ModelSelector::Model(id) => (
                    vec![id.as_str()],
                    total_prompts * scenario.models.len() as u64,
                ),
            };

            let mut step_cost = 0.0;
            for model_id in models_for_step {
                let single_call = self.single_call_cost(
                    model_id,
                    input_tokens,
                    step.expected_output_tokens,
                    step.use_cached_input,
                    scenario.price_overrides.get(model_id),
                );

                let model_cost = single_call
                    * effective_prompts as f64
                    * runs_per_month as f64
                    * step.runs_per_prompt as f64;

                by_model.add(model_id, model_cost);
                step_cost += model_cost;
            }

            by_step.add(&step.name, step_cost);
            group_cost += step_cost;

            previous_output_tokens = Some(step.expected_output_tokens);
        }

        // Call accounting always assumes full fan-out across tracked models,
        // independent of each step's model selector.
        let group_calls: u64 = group
            .flow_steps
            .iter()
            .map(|step| {
                scenario.models.len() as u64 * total_prompts * runs_per_month * step.runs_per_prompt
            })
            .sum();

        Ok((group_cost, group_calls))
    }

    /// Cost of a single call for one model, with scenario overrides and
    /// cached-input pricing applied. Unknown models cost zero and warn.
    fn single_call_cost(
        &self,
        model_id: &str,
        input_tokens: u64,
        output_tokens: u64,
        use_cached_input: bool,
        overrides: Option<&PriceOverride>,
    ) -> f64 {
        let Some(price) = self.prices.get(model_id) else {
            warn!(model = model_id, "model not found in price table, using $0");
            return 0.0;
        };

        effective_price(price, use_cached_input, overrides)
            .calculate_cost(input_tokens, output_tokens)
    }

    /// Freshest `updated_at` across the table plus the model count
    fn price_metadata(&self) -> ResultMeta {
        let latest_update = self.prices.values().map(|price| price.updated_at).max();

        ResultMeta {
            price_source_updated_at: latest_update
                .map_or_else(|| "unknown".to_string(), |ts| ts.to_rfc3339()),
            models_count: self.prices.len(),
        }
    }
}

/// Apply scenario overrides and cached-input substitution to a table price
///
/// Override fields win over the table field by field. Cached-input pricing,
/// when requested and available, replaces the effective input price.
fn effective_price(
    price: &ModelPrice,
    use_cached_input: bool,
    overrides: Option<&PriceOverride>,
) -> ModelPrice {
    let mut effective = price.clone();
    if let Some(overrides) = overrides {
        if let Some(input) = overrides.input_per_million {
            effective.input_per_million = input;
        }
        if let Some(output) = overrides.output_per_million {
            effective.output_per_million = output;
        }
        if let Some(cached) = overrides.input_cached_per_million {
            effective.input_cached_per_million = Some(cached);
        }
    }
    if use_cached_input {
        if let Some(cached) = effective.input_cached_per_million {
            effective.input_per_million = cached;
        }
    }
    effective
}

/// Convert a group's frequency to a monthly run count
fn runs_per_month(group: &IntentGroup, days_per_month: u64) -> Result<u64> {
    match group.frequency {
        Frequency::Hourly => Ok(24 * days_per_month),
        Frequency::TwoHourly => Ok(12 * days_per_month),
        Frequency::FourHourly => Ok(6 * days_per_month),
        Frequency::Daily => Ok(days_per_month),
        Frequency::Weekly => Ok(days_per_month / 7),
        Frequency::Custom => group
            .custom_runs_per_month
            .ok_or_else(|| Error::MissingCustomRuns {
                group: group.name.clone(),
            }),
    }
}

/// Resolve a step's input token count from its strategy
fn resolve_input_tokens(step: &FlowStep, previous_output_tokens: Option<u64>) -> Result<u64> {
    match step.input_tokens_strategy {
        // Would come from actual prompt text; fixed placeholder for now.
        TokenStrategy::FromPrompt => {
            Ok(step.fixed_input_tokens.unwrap_or(DEFAULT_PROMPT_TOKENS))
        }
        TokenStrategy::Fixed => Ok(step.fixed_input_tokens.unwrap_or(0)),
        TokenStrategy::FromPreviousOutput => {
            previous_output_tokens.ok_or_else(|| Error::MissingPreviousOutput {
                step: step.name.clone(),
            })
        }
        TokenStrategy::PercentOfPreviousOutput => {
            let previous =
                previous_output_tokens.ok_or_else(|| Error::MissingPreviousOutput {
                    step: step.name.clone(),
                })?;
            let percent = step.percent_of_previous.ok_or_else(|| Error::MissingPercent {
                step: step.name.clone(),
            })?;
            Ok((previous as f64 * percent).floor() as u64)
        }
    }
}
