//! Report generation for simulation results
//!
//! Pure presentation: renders results as plain text, JSON, or markdown
//! tables, with every cost breakdown sorted by descending cost. No
//! calculation logic lives here.

use anyhow::Result;
use clap::ValueEnum;
use serde_json::json;
use std::cmp::Ordering;
use tokenmeter_core::SimulationResult;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text report
    Text,
    /// Pretty-printed JSON
    Json,
    /// Markdown tables
    Markdown,
}

/// Render a single result
pub fn render(result: &SimulationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_text(result)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Markdown => Ok(format_markdown(result)),
    }
}

/// Render a named comparison set
pub fn render_comparison(
    results: &[(String, SimulationResult)],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_comparison_text(results)),
        OutputFormat::Json => {
            let scenarios: Vec<_> = results
                .iter()
                .map(|(name, result)| json!({ "name": name, "results": result }))
                .collect();
            Ok(serde_json::to_string_pretty(&json!({ "scenarios": scenarios }))?)
        }
        OutputFormat::Markdown => Ok(format_comparison_markdown(results)),
    }
}

/// Descending-cost sort; ties keep their input order
fn sorted_by_cost_desc<T>(items: &[T], cost: impl Fn(&T) -> f64) -> Vec<&T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| cost(b).partial_cmp(&cost(a)).unwrap_or(Ordering::Equal));
    sorted
}

fn format_text(result: &SimulationResult) -> String {
    let bar = "=".repeat(80);
    let rule = "-".repeat(80);
    let mut output = String::new();

    output.push_str(&bar);
    output.push_str("\nLLM PRICING SIMULATION RESULTS\n");
    output.push_str(&bar);
    output.push_str(&format!(
        "\n\nTotal Monthly Cost: ${:.2}\n",
        result.total_monthly_cost_usd
    ));
    output.push_str(&format!("Total API Calls: {}\n", result.total_calls_per_month));
    output.push_str(&format!(
        "Total Input Tokens: {}\n",
        result.total_input_tokens_per_month
    ));
    output.push_str(&format!(
        "Total Output Tokens: {}\n",
        result.total_output_tokens_per_month
    ));

    output.push_str(&format!("\nCost Breakdown by Model:\n{rule}\n"));
    for item in sorted_by_cost_desc(&result.by_model, |m| m.cost_usd) {
        output.push_str(&format!("  {:<40} ${:>10.2}\n", item.model, item.cost_usd));
    }

    output.push_str(&format!("\nCost Breakdown by Intent Group:\n{rule}\n"));
    for item in sorted_by_cost_desc(&result.by_intent_group, |g| g.cost_usd) {
        output.push_str(&format!("  {:<40} ${:>10.2}\n", item.name, item.cost_usd));
        output.push_str(&format!("    Calls: {}\n", item.calls));
    }

    output.push_str(&format!("\nCost Breakdown by Step:\n{rule}\n"));
    for item in sorted_by_cost_desc(&result.by_step, |s| s.cost_usd) {
        output.push_str(&format!("  {:<40} ${:>10.2}\n", item.step, item.cost_usd));
    }

    output.push_str(&format!("\nMetadata:\n{rule}\n"));
    output.push_str(&format!(
        "  price_source_updated_at: {}\n",
        result.meta.price_source_updated_at
    ));
    output.push_str(&format!("  models_count: {}\n", result.meta.models_count));
    output.push_str(&bar);

    output
}

fn format_markdown(result: &SimulationResult) -> String {
    let mut output = String::new();

    output.push_str("# LLM Pricing Simulation Results\n\n## Summary\n\n");
    output.push_str(&format!(
        "- **Total Monthly Cost**: ${:.2}\n",
        result.total_monthly_cost_usd
    ));
    output.push_str(&format!(
        "- **Total API Calls**: {}\n",
        result.total_calls_per_month
    ));
    output.push_str(&format!(
        "- **Total Input Tokens**: {}\n",
        result.total_input_tokens_per_month
    ));
    output.push_str(&format!(
        "- **Total Output Tokens**: {}\n",
        result.total_output_tokens_per_month
    ));

    output.push_str("\n## Cost by Model\n\n| Model | Cost (USD) |\n|-------|------------|\n");
    for item in sorted_by_cost_desc(&result.by_model, |m| m.cost_usd) {
        output.push_str(&format!("| {} | ${:.2} |\n", item.model, item.cost_usd));
    }

    output.push_str(
        "\n## Cost by Intent Group\n\n| Intent Group | Cost (USD) | Calls |\n|--------------|------------|-------|\n",
    );
    for item in sorted_by_cost_desc(&result.by_intent_group, |g| g.cost_usd) {
        output.push_str(&format!(
            "| {} | ${:.2} | {} |\n",
            item.name, item.cost_usd, item.calls
        ));
    }

    output.push_str("\n## Cost by Step\n\n| Step | Cost (USD) |\n|------|------------|\n");
    for item in sorted_by_cost_desc(&result.by_step, |s| s.cost_usd) {
        output.push_str(&format!("| {} | ${:.2} |\n", item.step, item.cost_usd));
    }

    output.push_str("\n## Metadata\n\n");
    output.push_str(&format!(
        "- **price_source_updated_at**: {}\n",
        result.meta.price_source_updated_at
    ));
    output.push_str(&format!("- **models_count**: {}\n", result.meta.models_count));

    output
}

fn format_comparison_text(results: &[(String, SimulationResult)]) -> String {
    let bar = "=".repeat(80);
    let rule = "-".repeat(80);
    let mut output = String::new();

    output.push_str(&bar);
    output.push_str("\nSCENARIO COMPARISON\n");
    output.push_str(&bar);
    output.push_str(&format!(
        "\n\n{:<45} {:>15} {:>15}\n{rule}\n",
        "Scenario", "Monthly Cost", "Calls"
    ));

    for (name, result) in sorted_by_cost_desc(results, |(_, r)| r.total_monthly_cost_usd) {
        output.push_str(&format!(
            "{:<45} ${:>14.2} {:>15}\n",
            name, result.total_monthly_cost_usd, result.total_calls_per_month
        ));
    }

    output.push_str(&format!("\n{bar}\n"));

    for (name, result) in results {
        output.push_str(&format!("\n{name}\n{}\n", "-".repeat(name.len())));
        output.push_str(&format_text(result));
        output.push('\n');
    }

    output
}

fn format_comparison_markdown(results: &[(String, SimulationResult)]) -> String {
    let mut output = String::new();

    output.push_str(
        "# Scenario Comparison\n\n## Summary\n\n| Scenario | Monthly Cost | Calls/Month |\n|----------|--------------|-------------|\n",
    );
    for (name, result) in sorted_by_cost_desc(results, |(_, r)| r.total_monthly_cost_usd) {
        output.push_str(&format!(
            "| {} | ${:.2} | {} |\n",
            name, result.total_monthly_cost_usd, result.total_calls_per_month
        ));
    }
    output.push('\n');

    for (name, result) in results {
        output.push_str(&format!("## {name}\n\n"));
        output.push_str(&format_markdown(result));
        output.push('\n');
    }

    output
}
