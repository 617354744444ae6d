use rust_decimal::prelude::*;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanSimError;
use crate::types::{Money, Percent, Rate};
use crate::LoanSimResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT_DIVISOR: Decimal = dec!(100);

/// Round to the cent, ties away from zero.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Monthly rate from a quoted annual percentage: `annual / 100 / 12`.
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / PERCENT_DIVISOR / MONTHS_PER_YEAR
}

/// Level (annuity) installment, rounded to the cent.
///
/// `P * r * (1+r)^n / ((1+r)^n - 1)`. A zero rate degenerates to `P / n`.
pub fn level_installment(rate: Rate, nper: u32, principal: Money) -> LoanSimResult<Money> {
    if nper == 0 {
        return Err(LoanSimError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(round2(principal / Decimal::from(nper)));
    }

    let one_plus_r = Decimal::ONE + rate;
    let factor = one_plus_r
        .checked_powu(u64::from(nper))
        .ok_or_else(|| LoanSimError::Overflow {
            context: format!("(1 + r)^{nper}"),
        })?;
    let denominator = factor - Decimal::ONE;

    if denominator.is_zero() {
        return Err(LoanSimError::DivisionByZero {
            context: "level installment annuity factor".into(),
        });
    }

    let numerator = principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(factor))
        .ok_or_else(|| LoanSimError::Overflow {
            context: "level installment numerator".into(),
        })?;

    numerator
        .checked_div(denominator)
        .map(round2)
        .ok_or_else(|| LoanSimError::Overflow {
            context: "level installment".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round2_ties_away_from_zero() {
        assert_eq!(round2(dec!(0.005)), dec!(0.01));
        assert_eq!(round2(dec!(2.345)), dec!(2.35));
        assert_eq!(round2(dec!(-0.005)), dec!(-0.01));
        assert_eq!(round2(dec!(0.0049999)), dec!(0.00));
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(30)), dec!(0.025));
        assert_eq!(monthly_rate(dec!(15)), dec!(0.0125));
    }

    #[test]
    fn test_level_installment_known_answer() {
        // 1000 over 12 months at 2.5% a month
        let pmt = level_installment(dec!(0.025), 12, dec!(1000)).unwrap();
        assert_eq!(pmt, dec!(97.49));
    }

    #[test]
    fn test_level_installment_single_period() {
        // One period: principal plus one month of interest
        let pmt = level_installment(dec!(0.025), 1, dec!(1000)).unwrap();
        assert_eq!(pmt, dec!(1025.00));
    }

    #[test]
    fn test_level_installment_zero_rate() {
        let pmt = level_installment(Decimal::ZERO, 3, dec!(1000)).unwrap();
        assert_eq!(pmt, dec!(333.33));
    }

    #[test]
    fn test_level_installment_overflow_is_an_error() {
        // the numerator fits, the quotient does not
        let principal: Decimal = "79000000000000000000000000000".parse().unwrap();
        let err = level_installment(dec!(0.0125), 1, principal).unwrap_err();
        assert!(matches!(err, LoanSimError::Overflow { .. }));
    }

    #[test]
    fn test_level_installment_zero_periods_rejected() {
        let err = level_installment(dec!(0.025), 0, dec!(1000)).unwrap_err();
        assert!(matches!(err, LoanSimError::InvalidInput { .. }));
    }
}
