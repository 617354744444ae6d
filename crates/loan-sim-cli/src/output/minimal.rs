use serde_json::Value;

/// Print just the headline figure.
///
/// For a schedule that is the monthly installment; for a tier table, one
/// `bound: rate%` line per tier.
pub fn print_minimal(value: &Value) {
    let result = value.get("result").unwrap_or(value);

    for key in ["installment", "total_paid"] {
        if let Some(val) = result.get(key).filter(|v| !v.is_null()) {
            println!("{}", format_minimal(val));
            return;
        }
    }

    if let Value::Array(tiers) = result {
        for tier in tiers {
            let bound = tier
                .get("upper_bound")
                .map(format_minimal)
                .unwrap_or_else(|| "open".into());
            let rate = tier
                .get("annual_rate_percent")
                .map(format_minimal)
                .unwrap_or_default();
            println!("{}: {}%", bound, rate);
        }
        return;
    }

    println!("{}", format_minimal(result));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
