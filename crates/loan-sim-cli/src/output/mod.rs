pub mod csv_out;
pub mod minimal;
pub mod table;

use loan_sim_core::amortization::render::render_chat;
use loan_sim_core::amortization::AmortizationResult;
use serde_json::Value;

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
        OutputFormat::Chat => print_chat(value),
    }
}

/// Schedule rows of a computation envelope, if the value is one.
pub(crate) fn schedule_entries(value: &Value) -> Option<&Vec<Value>> {
    value.get("result")?.get("entries")?.as_array()
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// Print the schedule exactly as the chat bot would send it.
fn print_chat(value: &Value) {
    let parsed = value
        .get("result")
        .cloned()
        .map(serde_json::from_value::<AmortizationResult>);
    match parsed {
        Some(Ok(result)) => println!("{}", render_chat(&result)),
        _ => table::print_table(value),
    }
}
