//! Tokenmeter Core - Scenario model and cost calculation engine
//!
//! This crate projects monthly API cost for LLM prompt-monitoring workloads:
//! - Scenario: declarative usage pattern (intents, variants, frequency, flow steps)
//! - Price: per-million token prices for tracked models
//! - Calculator: pure evaluation of a Scenario against a price table
//! - Result: monthly cost breakdowns by model, intent group, and step

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod calculator;
pub mod error;
pub mod price;
pub mod result;
pub mod scenario;

pub use calculator::CostCalculator;
pub use error::{Error, Result};
pub use price::{ModelPrice, PriceOverride, PriceTable};
pub use result::{GroupCost, ModelCost, ResultMeta, SimulationResult, StepCost};
pub use scenario::{FlowStep, Frequency, IntentGroup, ModelSelector, Scenario, TokenStrategy};
