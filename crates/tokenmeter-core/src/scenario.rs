//! Scenario model - declarative description of a usage pattern
//!
//! A scenario says which models are tracked, what is asked (intent groups
//! with phrasing variants), how often the prompt set re-runs, and the chain
//! of flow steps each prompt instance passes through. It is an immutable
//! input to one calculation.

use crate::price::PriceOverride;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How input tokens are sized for a flow step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStrategy {
    /// Sized from the prompt text; placeholder for now, behaves like `Fixed`
    /// with a 150-token default
    FromPrompt,
    /// A fixed token count (`fixed_input_tokens`, default 0)
    Fixed,
    /// Exactly the previous step's expected output token count
    FromPreviousOutput,
    /// `floor(previous output × percent_of_previous)`
    PercentOfPreviousOutput,
}

/// Which model(s) a flow step is charged against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelSelector {
    /// Charge every tracked model independently (wire sentinel `"current"`)
    AllTracked,
    /// Charge one specific model, processing the fan-out of all tracked models
    Model(String),
}

/// Wire sentinel for [`ModelSelector::AllTracked`]
const ALL_TRACKED_SENTINEL: &str = "current";

impl From<String> for ModelSelector {
    fn from(value: String) -> Self {
        if value == ALL_TRACKED_SENTINEL {
            Self::AllTracked
        } else {
            Self::Model(value)
        }
    }
}

impl From<ModelSelector> for String {
    fn from(value: ModelSelector) -> Self {
        match value {
            ModelSelector::AllTracked => ALL_TRACKED_SENTINEL.to_string(),
            ModelSelector::Model(id) => id,
        }
    }
}

/// How often an intent group's full prompt set is re-run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Every hour (24 × days per month)
    Hourly,
    /// Every two hours (12 × days per month)
    #[serde(rename = "2_hourly")]
    TwoHourly,
    /// Every four hours (6 × days per month)
    #[serde(rename = "4_hourly")]
    FourHourly,
    /// Once a day
    Daily,
    /// Once a week (days per month ÷ 7, integer division)
    Weekly,
    /// Explicit `custom_runs_per_month` on the group
    Custom,
}

/// One LLM call stage in the per-prompt processing pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowStep {
    /// Step name (aggregation key for the by-step breakdown)
    pub name: String,
    /// Model selector for this step
    pub uses_model: ModelSelector,
    /// How input tokens are sized
    pub input_tokens_strategy: TokenStrategy,
    /// Token count for the fixed / from-prompt strategies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_input_tokens: Option<u64>,
    /// Fraction of the previous step's output, for the percent strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_of_previous: Option<f64>,
    /// Expected output token count per call
    pub expected_output_tokens: u64,
    /// How many times this step runs per prompt instance
    #[serde(default = "default_runs_per_prompt")]
    pub runs_per_prompt: u64,
    /// Charge cached-input pricing when the model offers it
    #[serde(default)]
    pub use_cached_input: bool,
}

fn default_runs_per_prompt() -> u64 {
    1
}

/// A group of intents sharing a frequency and a flow-step pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentGroup {
    /// Group name
    pub name: String,
    /// Distinct intents (questions/topics) in this group
    pub intents_count: u64,
    /// Phrasing variants per intent
    pub variants_per_intent: u64,
    /// How often the full prompt set re-runs
    pub frequency: Frequency,
    /// Ordered processing pipeline for each prompt instance
    pub flow_steps: Vec<FlowStep>,
    /// Explicit monthly run count, required when `frequency` is custom
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_runs_per_month: Option<u64>,
}

impl IntentGroup {
    /// Total prompt instances per run: intents × variants
    #[must_use]
    pub fn total_prompts(&self) -> u64 {
        self.intents_count * self.variants_per_intent
    }
}

/// Complete simulation scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario id
    pub id: String,
    /// Human-readable scenario name
    pub name: String,
    /// Model ids tracked (fanned out) by this scenario
    pub models: Vec<String>,
    /// Intent groups to evaluate
    pub intent_groups: Vec<IntentGroup>,
    /// Days per month used to convert frequency to a monthly run count
    #[serde(default = "default_days_per_month")]
    pub days_per_month: u64,
    /// Per-model price substitutions for this scenario only
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub price_overrides: HashMap<String, PriceOverride>,
}

fn default_days_per_month() -> u64 {
    30
}
