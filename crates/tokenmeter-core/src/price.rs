//! Model Pricing - per-million token prices for tracked models
//!
//! Price data is an immutable snapshot supplied by the caller, typically
//! fetched from the llm-prices.com feed by the `tokenmeter-prices` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping from model id to its price snapshot
pub type PriceTable = HashMap<String, ModelPrice>;

/// Price snapshot for a single model (per 1M tokens, USD)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPrice {
    /// Model id (feed identifier)
    pub id: String,
    /// Provider / vendor name
    pub vendor: String,
    /// Human-readable model name
    pub name: String,
    /// Cost per 1M input tokens (USD)
    pub input_per_million: f64,
    /// Cost per 1M output tokens (USD)
    pub output_per_million: f64,
    /// Cost per 1M cached input tokens (USD), if the provider discounts them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_cached_per_million: Option<f64>,
    /// When this price was last updated
    pub updated_at: DateTime<Utc>,
}

impl ModelPrice {
    /// Calculate the cost of a single call at this model's base prices
    #[must_use]
    pub fn calculate_cost(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        let input_cost = (input_tokens as f64 / 1_000_000.0) * self.input_per_million;
        let output_cost = (output_tokens as f64 / 1_000_000.0) * self.output_per_million;
        input_cost + output_cost
    }
}

/// Per-scenario, per-model price substitution
///
/// Set fields take precedence over the price table for one calculation only;
/// unset fields fall through to the table value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceOverride {
    /// Override for the input price (USD per 1M tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_per_million: Option<f64>,
    /// Override for the output price (USD per 1M tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_per_million: Option<f64>,
    /// Override for the cached-input price (USD per 1M tokens)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_cached_per_million: Option<f64>,
}
