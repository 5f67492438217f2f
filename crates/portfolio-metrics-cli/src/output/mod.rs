pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Compact rendering for a metric outcome object: the rate when computed,
/// otherwise the failure kind. Non-outcome values pass through as None.
pub fn render_outcome(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    match map.get("status")?.as_str()? {
        "computed" => Some(
            map.get("rate")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        "failed" => {
            let kind = map
                .get("error")
                .and_then(|e| e.get("kind"))
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            Some(format!("failed ({kind})"))
        }
        _ => None,
    }
}
