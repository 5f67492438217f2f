use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::render_outcome;

/// Format output as tables using the tabled crate: one headline table for
/// the metrics, then one table per derived series.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_tables(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_tables(result: &Value, envelope: &serde_json::Map<String, Value>) {
    if let Value::Object(res_map) = result {
        let mut builder = Builder::default();
        builder.push_record(["Metric", "Value"]);
        for (key, val) in res_map {
            if !is_series(val) {
                builder.push_record([key.as_str(), &format_value(val)]);
            }
        }
        println!("{}", Table::from(builder));

        for (key, val) in res_map {
            match val {
                Value::Array(arr) if arr.first().is_some_and(Value::is_object) => {
                    println!("\n{}:", title(key));
                    print_array_table(arr);
                }
                Value::Object(inner) => {
                    if let Some(Value::Array(flows)) = inner.get("flows") {
                        println!("\n{}:", title(key));
                        print_flow_table(flows);
                    }
                }
                _ => {}
            }
        }
    } else {
        print_flat_object(&Value::Object(envelope.clone()));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// A derived series rendered as its own table rather than a headline row.
fn is_series(value: &Value) -> bool {
    match value {
        Value::Array(arr) => arr.first().is_some_and(Value::is_object),
        Value::Object(map) => map.contains_key("flows"),
        _ => false,
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn print_flow_table(flows: &[Value]) {
    let mut builder = Builder::default();
    builder.push_record(["Period", "Flow"]);
    for (i, flow) in flows.iter().enumerate() {
        builder.push_record([i.to_string(), format_value(flow)]);
    }
    println!("{}", Table::from(builder));
}

fn title(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn format_value(value: &Value) -> String {
    if let Some(rendered) = render_outcome(value) {
        return rendered;
    }
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
