//! Parsers for the free-text answers a user types into the chat.
//!
//! Only plain literals are accepted: ASCII digits with at most one decimal
//! point for amounts, ASCII digits alone for months. Surrounding whitespace
//! is ignored; signs, currency symbols and separators are not.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::InputFormatError;
use crate::types::Money;

/// Answer to "¿Qué deseas hacer ahora?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatChoice {
    Again,
    Exit,
}

const AFFIRMATIVE: [&str; 6] = ["si", "sí", "s", "yes", "y", "otra"];
const NEGATIVE: [&str; 4] = ["no", "n", "salir", "exit"];

pub fn parse_amount(text: &str) -> Result<Money, InputFormatError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputFormatError::Empty);
    }

    let digits = trimmed.chars().filter(char::is_ascii_digit).count();
    let dots = trimmed.chars().filter(|c| *c == '.').count();
    if digits == 0 || dots > 1 || digits + dots != trimmed.chars().count() {
        return Err(InputFormatError::NotANumber(trimmed.to_string()));
    }

    // "5." and ".5" are valid plain literals
    let normalized = match (trimmed.starts_with('.'), trimmed.ends_with('.')) {
        (true, _) => format!("0{trimmed}"),
        (_, true) => trimmed.trim_end_matches('.').to_string(),
        _ => trimmed.to_string(),
    };
    let amount = Decimal::from_str(&normalized)
        .map_err(|_| InputFormatError::NotANumber(trimmed.to_string()))?;

    if amount <= Decimal::ZERO {
        return Err(InputFormatError::NotPositive(trimmed.to_string()));
    }
    Ok(amount)
}

pub fn parse_months(text: &str) -> Result<u32, InputFormatError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputFormatError::Empty);
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(InputFormatError::NotAnInteger(trimmed.to_string()));
    }

    let months: u32 = trimmed
        .parse()
        .map_err(|_| InputFormatError::NotAnInteger(trimmed.to_string()))?;
    if months == 0 {
        return Err(InputFormatError::NotPositive(trimmed.to_string()));
    }
    Ok(months)
}

pub fn parse_choice(text: &str) -> Option<RepeatChoice> {
    let answer = text.trim().to_lowercase();
    if AFFIRMATIVE.contains(&answer.as_str()) {
        Some(RepeatChoice::Again)
    } else if NEGATIVE.contains(&answer.as_str()) {
        Some(RepeatChoice::Exit)
    } else {
        None
    }
}
