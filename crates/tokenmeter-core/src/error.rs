//! Error types for tokenmeter-core

use thiserror::Error;

/// Engine error type
///
/// Every variant is a configuration error: the scenario itself is invalid,
/// so the whole calculation aborts with no partial result. Data gaps
/// (a model id missing from the price table) are not errors; they degrade
/// to a zero-cost contribution and a warning.
#[derive(Debug, Error)]
pub enum Error {
    /// Custom frequency used without an explicit run count
    #[error("intent group '{group}': custom frequency requires custom_runs_per_month")]
    MissingCustomRuns {
        /// Intent group name
        group: String,
    },

    /// Previous-output-dependent strategy on the first step of a group
    #[error("flow step '{step}': input token strategy depends on the previous step's output, but this is the first step")]
    MissingPreviousOutput {
        /// Flow step name
        step: String,
    },

    /// Percent strategy without a percent value
    #[error("flow step '{step}': percent_of_previous must be set for the percent_of_previous_output strategy")]
    MissingPercent {
        /// Flow step name
        step: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
