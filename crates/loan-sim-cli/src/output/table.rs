use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::schedule_entries;

const SUMMARY_FIELDS: [&str; 6] = [
    "principal",
    "term_months",
    "installment",
    "total_interest",
    "total_paid",
    "residual_balance",
];
const ENTRY_FIELDS: [&str; 5] = [
    "period",
    "installment",
    "interest",
    "principal",
    "remaining_balance",
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) if schedule_entries(value).is_some() => print_schedule(map),
        Value::Object(_) => print_flat_object(value),
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_schedule(envelope: &Map<String, Value>) {
    let result = &envelope["result"];

    let mut summary = Builder::default();
    summary.push_record(["Field", "Value"]);
    for key in SUMMARY_FIELDS {
        summary.push_record([key, &format_value(&result[key])]);
    }
    for key in ["annual_rate_percent", "insurance_premium_percent"] {
        summary.push_record([key, &format!("{}%", format_value(&result["tier"][key]))]);
    }
    println!("{}", Table::from(summary));

    let mut rows = Builder::default();
    rows.push_record(["Month", "Installment", "Interest", "Principal", "Balance"]);
    for entry in result["entries"].as_array().into_iter().flatten() {
        rows.push_record(ENTRY_FIELDS.map(|k| format_value(&entry[k])));
    }
    println!("\n{}", Table::from(rows));

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
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

/// Arrays of objects (e.g. the tier table) become one row per element.
fn print_array_table(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", format_value(item));
        }
        return;
    };

    let mut headers: Vec<String> = first.keys().cloned().collect();
    for item in arr.iter().filter_map(Value::as_object) {
        for key in item.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr.iter().filter_map(Value::as_object) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(h.as_str()).map(format_value).unwrap_or_else(|| "-".into()))
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
