//! Chat-surface rendering of an [`AmortizationResult`].
//!
//! Presentation only: numbers are taken from the result as computed and
//! are never re-derived here.

use rust_decimal::Decimal;

use super::schedule::AmortizationResult;
use crate::time_value::round2;

const CURRENCY_PREFIX: &str = "S/";
const COLUMNS: [&str; 5] = ["Mes", "Cuota", "Interés", "Capital", "Saldo"];

/// Format an amount as soles with two decimals and comma thousands separators.
pub fn format_soles(amount: Decimal) -> String {
    let fixed = format!("{:.2}", round2(amount));
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{CURRENCY_PREFIX}{sign}{grouped}.{frac}")
}

/// Left-aligned, space-separated schedule; each column as wide as its widest cell.
pub fn render_schedule(result: &AmortizationResult) -> String {
    let rows: Vec<[String; 5]> = result
        .entries
        .iter()
        .map(|e| {
            [
                e.period.to_string(),
                format_soles(e.installment),
                format_soles(e.interest),
                format_soles(e.principal),
                format_soles(e.remaining_balance),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(|c| c.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, COLUMNS.iter().copied(), &widths);
    for row in &rows {
        push_line(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

pub fn render_summary(result: &AmortizationResult) -> String {
    [
        format!("💰 Monto de préstamo: {}", format_soles(result.principal)),
        format!("⏳ Tiempo en meses: {}", result.term_months),
        format!(
            "📈 Tasa de interés anual: {}%",
            result.tier.annual_rate_percent.normalize()
        ),
        format!(
            "🛡️ Desgravamen: {}%",
            result.tier.insurance_premium_percent.normalize()
        ),
        format!("💵 Total pagado: {}", format_soles(result.total_paid)),
        format!("📊 Total intereses: {}", format_soles(result.total_interest)),
    ]
    .join("\n")
}

/// Full chat message: Markdown heading, monospace schedule block, then the summary.
pub fn render_chat(result: &AmortizationResult) -> String {
    format!(
        "📊 *Tabla de amortización:*\n```\n{}```\n\n{}",
        render_schedule(result),
        render_summary(result)
    )
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(line.trim_end());
    out.push('\n');
}
