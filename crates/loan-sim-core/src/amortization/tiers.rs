use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent};
use crate::{LoanSimError, LoanSimResult};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A principal bracket and the pricing attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTier {
    /// Inclusive upper bound of the bracket. `None` marks the open-ended top tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<Money>,
    /// Quoted annual interest rate, e.g. 30 for 30%.
    pub annual_rate_percent: Percent,
    /// Desgravamen (credit life insurance) premium, e.g. 0.805 for 0.805%.
    pub insurance_premium_percent: Percent,
}

impl RateTier {
    const fn bounded(upper: Money, annual: Percent, insurance: Percent) -> Self {
        Self {
            upper_bound: Some(upper),
            annual_rate_percent: annual,
            insurance_premium_percent: insurance,
        }
    }

    const fn open(annual: Percent, insurance: Percent) -> Self {
        Self {
            upper_bound: None,
            annual_rate_percent: annual,
            insurance_premium_percent: insurance,
        }
    }

    /// True when `principal` falls at or below this tier's bound.
    pub fn covers(&self, principal: Money) -> bool {
        match self.upper_bound {
            Some(upper) => principal <= upper,
            None => true,
        }
    }
}

/// Ordered, gap-free set of tiers. The last tier is always unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RateTier>", into = "Vec<RateTier>")]
pub struct TierTable {
    tiers: Vec<RateTier>,
}

const STANDARD_TIERS: [RateTier; 7] = [
    RateTier::bounded(dec!(1500), dec!(30), dec!(0.805)),
    RateTier::bounded(dec!(3000), dec!(28), dec!(0.705)),
    RateTier::bounded(dec!(10000), dec!(25), dec!(0.605)),
    RateTier::bounded(dec!(25000), dec!(23), dec!(0.505)),
    RateTier::bounded(dec!(80000), dec!(21), dec!(0.405)),
    RateTier::bounded(dec!(150000), dec!(18), dec!(0.305)),
    RateTier::open(dec!(15), dec!(0.205)),
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl TierTable {
    /// The seven published brackets, from 30% up to S/1,500 down to 15% above S/150,000.
    pub fn standard() -> Self {
        Self {
            tiers: STANDARD_TIERS.to_vec(),
        }
    }

    /// Build a custom table, rejecting anything that would leave a gap or overlap.
    pub fn new(tiers: Vec<RateTier>) -> LoanSimResult<Self> {
        validate_tiers(&tiers)?;
        Ok(Self { tiers })
    }

    /// First tier whose bound covers `principal`, falling through to the open tier.
    pub fn select(&self, principal: Money) -> &RateTier {
        let tier = self
            .tiers
            .iter()
            .find(|t| t.covers(principal))
            // validate_tiers guarantees a non-empty table ending in an open tier
            .unwrap_or(&self.tiers[self.tiers.len() - 1]);
        tracing::debug!(
            %principal,
            annual_rate = %tier.annual_rate_percent,
            "selected rate tier"
        );
        tier
    }

    pub fn tiers(&self) -> &[RateTier] {
        &self.tiers
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<RateTier>> for TierTable {
    type Error = LoanSimError;

    fn try_from(tiers: Vec<RateTier>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<TierTable> for Vec<RateTier> {
    fn from(table: TierTable) -> Self {
        table.tiers
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_tiers(tiers: &[RateTier]) -> LoanSimResult<()> {
    let Some(last) = tiers.last() else {
        return Err(LoanSimError::InvalidInput {
            field: "tiers".into(),
            reason: "Tier table must contain at least one tier.".into(),
        });
    };
    if last.upper_bound.is_some() {
        return Err(LoanSimError::InvalidInput {
            field: "tiers".into(),
            reason: "The last tier must be unbounded.".into(),
        });
    }

    let mut previous: Option<Money> = None;
    for (i, tier) in tiers.iter().enumerate() {
        if tier.annual_rate_percent < Decimal::ZERO || tier.insurance_premium_percent < Decimal::ZERO
        {
            return Err(LoanSimError::InvalidInput {
                field: format!("tiers[{i}]"),
                reason: "Rates cannot be negative.".into(),
            });
        }
        if i + 1 == tiers.len() {
            break;
        }
        let Some(upper) = tier.upper_bound else {
            return Err(LoanSimError::InvalidInput {
                field: format!("tiers[{i}].upper_bound"),
                reason: "Only the last tier may be unbounded.".into(),
            });
        };
        if upper <= Decimal::ZERO || previous.is_some_and(|p| upper <= p) {
            return Err(LoanSimError::InvalidInput {
                field: format!("tiers[{i}].upper_bound"),
                reason: "Upper bounds must be positive and strictly increasing.".into(),
            });
        }
        previous = Some(upper);
    }
    Ok(())
}
