use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::tiers::{RateTier, TierTable};
use crate::time_value::{level_installment, monthly_rate, round2};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::{LoanSimError, LoanSimResult};

/// Longest term accepted, in months (50 years).
pub const MAX_TERM_MONTHS: u32 = 600;

/// Residual balance beyond which the output carries a warning.
const RESIDUAL_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: Money,
    pub term_months: u32,
}

impl LoanRequest {
    pub fn new(principal: Money, term_months: u32) -> LoanSimResult<Self> {
        let request = Self {
            principal,
            term_months,
        };
        validate_request(&request)?;
        Ok(request)
    }
}

/// One row of the schedule. All amounts are already rounded to the cent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub period: u32,
    pub installment: Money,
    pub interest: Money,
    pub principal: Money,
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub principal: Money,
    pub term_months: u32,
    pub tier: RateTier,
    pub monthly_rate: Rate,
    pub installment: Money,
    pub entries: Vec<AmortizationEntry>,
    pub total_interest: Money,
    pub total_paid: Money,
    /// Balance left on the last row by cent rounding. Reported, never corrected.
    pub residual_balance: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Amortize `principal` over `term_months` using the standard tier table.
pub fn compute(principal: Money, term_months: u32) -> LoanSimResult<AmortizationResult> {
    let request = LoanRequest::new(principal, term_months)?;
    compute_with_table(&TierTable::standard(), &request)
}

/// Amortize a request against an arbitrary (validated) tier table.
pub fn compute_with_table(
    table: &TierTable,
    request: &LoanRequest,
) -> LoanSimResult<AmortizationResult> {
    validate_request(request)?;

    let tier = table.select(request.principal).clone();
    let rate = monthly_rate(tier.annual_rate_percent);
    let installment = level_installment(rate, request.term_months, request.principal)?;

    let mut balance = request.principal;
    let mut total_interest = Decimal::ZERO;
    let mut entries = Vec::with_capacity(request.term_months as usize);

    for period in 1..=request.term_months {
        let interest = checked(balance.checked_mul(rate), "period interest").map(round2)?;
        let principal_portion =
            checked(installment.checked_sub(interest), "period principal").map(round2)?;
        balance =
            checked(balance.checked_sub(principal_portion), "remaining balance").map(round2)?;
        total_interest = checked(total_interest.checked_add(interest), "total interest")?;

        entries.push(AmortizationEntry {
            period,
            installment,
            interest,
            principal: principal_portion,
            remaining_balance: balance,
        });
    }

    let total_paid = checked(request.principal.checked_add(total_interest), "total paid")?;

    tracing::info!(
        principal = %request.principal,
        term_months = request.term_months,
        %installment,
        residual = %balance,
        "amortization schedule computed"
    );

    Ok(AmortizationResult {
        principal: request.principal,
        term_months: request.term_months,
        tier,
        monthly_rate: rate,
        installment,
        entries,
        total_interest,
        total_paid,
        residual_balance: balance,
    })
}

/// Compute a schedule and wrap it in the standard output envelope.
pub fn calculate_amortization(
    table: &TierTable,
    request: &LoanRequest,
) -> LoanSimResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = compute_with_table(table, request)?;

    if result.residual_balance.abs() > RESIDUAL_TOLERANCE {
        warnings.push(format!(
            "Cent rounding leaves a residual balance of {} after the last installment.",
            result.residual_balance
        ));
    }
    if result.monthly_rate.is_zero() {
        warnings.push("Selected tier has a zero rate; installment is principal / term.".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "monthly_rate": "annual_rate_percent / 100 / 12",
        "rounding": "each intermediate value rounded to 2 dp, ties away from zero",
        "tier_bound": "inclusive upper bound",
        "insurance_premium": "reported only, not part of the installment"
    });

    Ok(with_metadata(
        "Level-payment (French) amortization with tiered annual rates",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn checked(value: Option<Decimal>, context: &str) -> LoanSimResult<Decimal> {
    value.ok_or_else(|| LoanSimError::Overflow {
        context: context.into(),
    })
}

fn validate_request(request: &LoanRequest) -> LoanSimResult<()> {
    if request.principal <= Decimal::ZERO {
        return Err(LoanSimError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive.".into(),
        });
    }
    if request.term_months == 0 {
        return Err(LoanSimError::InvalidInput {
            field: "term_months".into(),
            reason: "Term must be at least one month.".into(),
        });
    }
    if request.term_months > MAX_TERM_MONTHS {
        return Err(LoanSimError::InvalidInput {
            field: "term_months".into(),
            reason: format!("Term cannot exceed {MAX_TERM_MONTHS} months."),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_twelve_month_schedule() {
        let result = compute(dec!(1000), 12).unwrap();
        assert_eq!(result.tier.annual_rate_percent, dec!(30));
        assert_eq!(result.monthly_rate, dec!(0.025));
        assert_eq!(result.installment, dec!(97.49));
        assert_eq!(result.entries.len(), 12);

        let first = &result.entries[0];
        assert_eq!(first.interest, dec!(25.00));
        assert_eq!(first.principal, dec!(72.49));
        assert_eq!(first.remaining_balance, dec!(927.51));

        // 12 rows of cent rounding drift to -0.04
        assert_eq!(result.residual_balance, dec!(-0.04));
        assert_eq!(result.total_interest, dec!(169.84));
        assert_eq!(result.total_paid, dec!(1169.84));
    }

    #[test]
    fn test_single_month_is_principal_plus_interest() {
        // 3000 sits in the 28% tier: 3000 * 28/1200 = 70
        let result = compute(dec!(3000), 1).unwrap();
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.installment, dec!(3070.00));
        assert_eq!(result.entries[0].interest, dec!(70.00));
        assert_eq!(result.entries[0].principal, dec!(3000.00));
        assert_eq!(result.residual_balance, dec!(0.00));
    }

    #[test]
    fn test_periods_are_sequential() {
        let result = compute(dec!(5000), 24).unwrap();
        let periods: Vec<u32> = result.entries.iter().map(|e| e.period).collect();
        assert_eq!(periods, (1..=24).collect::<Vec<u32>>());
        assert!(result.entries.iter().all(|e| e.installment == result.installment));
    }

    #[test]
    fn test_interest_plus_principal_is_installment() {
        let result = compute(dec!(10000), 60).unwrap();
        for e in &result.entries {
            assert_eq!(e.interest + e.principal, e.installment);
        }
    }

    #[test]
    fn test_zero_principal_rejected() {
        let err = compute(Decimal::ZERO, 12).unwrap_err();
        match err {
            LoanSimError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_term_limits() {
        assert!(compute(dec!(1000), 0).is_err());
        assert!(compute(dec!(1000), MAX_TERM_MONTHS).is_ok());
        assert!(compute(dec!(1000), MAX_TERM_MONTHS + 1).is_err());
    }

    #[test]
    fn test_installment_overflow_is_an_error() {
        let principal: Decimal = "79000000000000000000000000000".parse().unwrap();
        let err = compute(principal, 1).unwrap_err();
        assert!(matches!(err, LoanSimError::Overflow { .. }));
    }

    #[test]
    fn test_total_paid_overflow_is_an_error() {
        // the installment fits; principal plus two months of interest does not
        let principal: Decimal = "78000000000000000000000000000".parse().unwrap();
        let err = compute(principal, 2).unwrap_err();
        match err {
            LoanSimError::Overflow { context } => assert_eq!(context, "total paid"),
            other => panic!("Expected Overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_residual_warning_in_envelope() {
        let request = LoanRequest::new(dec!(200000), 36).unwrap();
        let output = calculate_amortization(&TierTable::standard(), &request).unwrap();
        assert_eq!(output.result.residual_balance, dec!(-0.19));
        assert!(output.warnings.iter().any(|w| w.contains("residual")));
        assert_eq!(output.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_zero_rate_table() {
        let table = TierTable::new(vec![RateTier {
            upper_bound: None,
            annual_rate_percent: Decimal::ZERO,
            insurance_premium_percent: Decimal::ZERO,
        }])
        .unwrap();
        let request = LoanRequest::new(dec!(1200), 12).unwrap();
        let output = calculate_amortization(&table, &request).unwrap();
        let r = &output.result;
        assert_eq!(r.installment, dec!(100.00));
        assert_eq!(r.total_interest, Decimal::ZERO);
        assert_eq!(r.residual_balance, dec!(0.00));
        assert!(output.warnings.iter().any(|w| w.contains("zero rate")));
    }
}
