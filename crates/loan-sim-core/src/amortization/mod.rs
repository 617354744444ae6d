//! Tiered-rate loan amortization.
//!
//! A principal amount selects a [`tiers::RateTier`]; the tier's annual rate
//! drives a level installment and a month-by-month schedule in which every
//! intermediate value is rounded to the cent before it is used again.

pub mod render;
pub mod schedule;
pub mod tiers;

pub use schedule::{
    calculate_amortization, compute, compute_with_table, AmortizationEntry, AmortizationResult,
    LoanRequest, MAX_TERM_MONTHS,
};
pub use tiers::{RateTier, TierTable};
