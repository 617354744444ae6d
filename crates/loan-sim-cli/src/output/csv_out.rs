use serde_json::Value;
use std::io;

use super::schedule_entries;

/// Write output as CSV to stdout.
///
/// A schedule becomes one row per month; any other array one row per
/// element; anything else a two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(entries) = schedule_entries(value) {
        write_array_csv(&mut wtr, entries);
    } else {
        match value {
            Value::Array(arr) => write_array_csv(&mut wtr, arr),
            Value::Object(map) => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
            _ => {
                let _ = wtr.write_record([&format_csv_value(value)]);
            }
        }
    }

    if let Err(e) = wtr.flush() {
        tracing::warn!(error = %e, "failed to flush CSV output");
    }
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
        return;
    };

    let mut headers: Vec<&str> = first.keys().map(String::as_str).collect();
    for item in arr.iter().filter_map(Value::as_object) {
        for key in item.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key.as_str());
            }
        }
    }
    let _ = wtr.write_record(&headers);

    for map in arr.iter().filter_map(Value::as_object) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&row);
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
