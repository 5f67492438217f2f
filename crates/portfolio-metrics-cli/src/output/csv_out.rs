use serde_json::Value;
use std::io;

use super::render_outcome;

/// Write output as CSV to stdout: field,value pairs for the result object,
/// with metric outcomes flattened and nested series rendered as JSON.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let fields = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in fields {
                let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
            }
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn format_csv_value(value: &Value) -> String {
    if let Some(rendered) = render_outcome(value) {
        return rendered;
    }
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcomes_flatten_to_rate_or_failure_kind() {
        let computed = json!({"status": "computed", "rate": "0.05"});
        assert_eq!(format_csv_value(&computed), "0.05");

        let failed = json!({"status": "failed", "error": {"kind": "non_convergence"}});
        assert_eq!(format_csv_value(&failed), "failed (non_convergence)");
    }

    #[test]
    fn test_nested_series_render_as_json() {
        let flows = json!({"flows": ["-95", "-1300", "0", "1282.7"]});
        assert_eq!(
            format_csv_value(&flows),
            r#"{"flows":["-95","-1300","0","1282.7"]}"#
        );
    }
}
