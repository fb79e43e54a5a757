//! Simulation results - monthly cost breakdowns
//!
//! Produced fresh by every calculation and never mutated afterward. List
//! ordering is deterministic: tracked models in scenario order (step-pinned
//! models appended in first-encounter order), steps and groups in
//! declaration order.

use serde::{Deserialize, Serialize};

/// Monthly cost attributed to one model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCost {
    /// Model id
    pub model: String,
    /// Monthly cost (USD, rounded to 2 decimals)
    pub cost_usd: f64,
}

/// Monthly cost and volume attributed to one intent group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupCost {
    /// Intent group name
    pub name: String,
    /// Monthly cost (USD, rounded to 2 decimals)
    pub cost_usd: f64,
    /// Monthly API calls (full fan-out accounting)
    pub calls: u64,
    /// Monthly input tokens; not tracked per step, always 0
    pub input_tokens: u64,
    /// Monthly output tokens; not tracked per step, always 0
    pub output_tokens: u64,
}

/// Monthly cost attributed to one flow step (by name, across groups)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepCost {
    /// Flow step name
    pub step: String,
    /// Monthly cost (USD, rounded to 2 decimals)
    pub cost_usd: f64,
}

/// Metadata about the price data a result was computed from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMeta {
    /// Freshest `updated_at` across price table entries (RFC 3339),
    /// or `"unknown"` for an empty table
    pub price_source_updated_at: String,
    /// Number of models in the price table
    pub models_count: usize,
}

/// Results of one scenario calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Total monthly cost (USD, rounded to 2 decimals)
    pub total_monthly_cost_usd: f64,
    /// Cost broken down by model
    pub by_model: Vec<ModelCost>,
    /// Cost and volume broken down by intent group
    pub by_intent_group: Vec<GroupCost>,
    /// Cost broken down by flow step name
    pub by_step: Vec<StepCost>,
    /// Total monthly API calls
    pub total_calls_per_month: u64,
    /// Total monthly input tokens; not tracked per step, always 0
    pub total_input_tokens_per_month: u64,
    /// Total monthly output tokens; not tracked per step, always 0
    pub total_output_tokens_per_month: u64,
    /// Price data metadata
    pub meta: ResultMeta,
}
