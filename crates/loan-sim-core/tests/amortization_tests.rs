use loan_sim_core::amortization::render::render_chat;
use loan_sim_core::amortization::{
    calculate_amortization, compute, compute_with_table, LoanRequest, RateTier, TierTable,
};
use loan_sim_core::LoanSimError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Tier selection
// ===========================================================================

#[test]
fn test_tier_boundaries_are_inclusive_to_lower_tier() {
    let expected = [
        (dec!(1500), dec!(30)),
        (dec!(3000), dec!(28)),
        (dec!(10000), dec!(25)),
        (dec!(25000), dec!(23)),
        (dec!(80000), dec!(21)),
        (dec!(150000), dec!(18)),
    ];
    for (principal, rate) in expected {
        let result = compute(principal, 6).unwrap();
        assert_eq!(result.tier.annual_rate_percent, rate, "principal {principal}");

        let above = compute(principal + dec!(0.01), 6).unwrap();
        assert!(
            above.tier.annual_rate_percent < rate,
            "principal just above {principal} should drop below {rate}%"
        );
    }
}

#[test]
fn test_standard_table_rates_non_increasing() {
    let table = TierTable::standard();
    let rates: Vec<Decimal> = table
        .tiers()
        .iter()
        .map(|t| t.annual_rate_percent)
        .collect();
    assert_eq!(
        rates,
        vec![dec!(30), dec!(28), dec!(25), dec!(23), dec!(21), dec!(18), dec!(15)]
    );
    assert!(rates.windows(2).all(|w| w[1] <= w[0]));
}

// ===========================================================================
// Known-answer schedules
// ===========================================================================

#[test]
fn test_scenario_1000_over_12_months() {
    let r = compute(dec!(1000), 12).unwrap();
    assert_eq!(r.tier.annual_rate_percent, dec!(30));
    assert_eq!(r.monthly_rate, dec!(0.025));
    assert_eq!(r.installment, dec!(97.49));
    assert_eq!(r.entries.len(), 12);

    let last = r.entries.last().unwrap();
    assert_eq!(last.period, 12);
    assert_eq!(last.interest, dec!(2.38));
    assert_eq!(last.principal, dec!(95.11));
    assert_eq!(last.remaining_balance, dec!(-0.04));
}

#[test]
fn test_scenario_5000_over_24_months() {
    // 3000 < 5000 <= 10000 => 25%
    let r = compute(dec!(5000), 24).unwrap();
    assert_eq!(r.tier.annual_rate_percent, dec!(25));
    assert_eq!(r.entries.len(), 24);
    assert_eq!(r.installment, dec!(266.86));
    assert_eq!(r.entries[0].interest, dec!(104.17));
    assert_eq!(r.entries[0].remaining_balance, dec!(4837.31));
    assert_eq!(r.total_interest, dec!(1404.60));
    assert_eq!(r.total_paid, dec!(6404.60));
}

#[test]
fn test_scenario_200000_over_36_months_uses_open_tier() {
    let r = compute(dec!(200000), 36).unwrap();
    assert!(r.tier.upper_bound.is_none());
    assert_eq!(r.tier.annual_rate_percent, dec!(15));
    assert_eq!(r.installment, dec!(6933.07));
    assert_eq!(r.entries[0].interest, dec!(2500.00));
    assert_eq!(r.total_interest, dec!(49590.33));
}

#[test]
fn test_long_term_residual_is_reported_not_corrected() {
    let r = compute(dec!(80000), 360).unwrap();
    assert_eq!(r.tier.annual_rate_percent, dec!(21));
    assert_eq!(r.installment, dec!(1402.72));
    assert_eq!(r.residual_balance, dec!(-12.40));
    assert_eq!(r.entries.last().unwrap().remaining_balance, r.residual_balance);
    // every row still pays the same installment
    assert!(r.entries.iter().all(|e| e.installment == dec!(1402.72)));
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_total_paid_is_principal_plus_interest() {
    for (p, n) in [(dec!(1000), 12), (dec!(1500.01), 6), (dec!(10000), 60), (dec!(99999.99), 48)] {
        let r = compute(p, n).unwrap();
        let summed: Decimal = r.entries.iter().map(|e| e.interest).sum();
        assert_eq!(r.total_interest, summed);
        assert_eq!(r.total_paid, p + r.total_interest);
    }
}

#[test]
fn test_balance_runs_down_row_by_row() {
    let r = compute(dec!(10000), 60).unwrap();
    let mut balance = r.principal;
    for e in &r.entries {
        assert_eq!(e.remaining_balance, balance - e.principal);
        balance = e.remaining_balance;
    }
    assert_eq!(balance, dec!(0.46));
}

#[test]
fn test_short_schedules_close_within_a_cent() {
    for (p, n) in [(dec!(3000), 1), (dec!(1500), 6), (dec!(1500.01), 6), (dec!(2000), 2)] {
        let r = compute(p, n).unwrap();
        assert!(
            r.residual_balance.abs() <= dec!(0.02),
            "{p} over {n}: residual {}",
            r.residual_balance
        );
    }
}

#[test]
fn test_compute_is_idempotent() {
    let a = compute(dec!(7345.67), 18).unwrap();
    let b = compute(dec!(7345.67), 18).unwrap();
    assert_eq!(a, b);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
    assert_eq!(render_chat(&a), render_chat(&b));
}

// ===========================================================================
// Validation and custom tables
// ===========================================================================

#[test]
fn test_negative_principal_rejected() {
    match compute(dec!(-1), 12).unwrap_err() {
        LoanSimError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_custom_table_is_used() {
    let table = TierTable::new(vec![
        RateTier {
            upper_bound: Some(dec!(500)),
            annual_rate_percent: dec!(12),
            insurance_premium_percent: dec!(0.1),
        },
        RateTier {
            upper_bound: None,
            annual_rate_percent: dec!(6),
            insurance_premium_percent: dec!(0.05),
        },
    ])
    .unwrap();

    let request = LoanRequest::new(dec!(1000), 12).unwrap();
    let r = compute_with_table(&table, &request).unwrap();
    assert_eq!(r.tier.annual_rate_percent, dec!(6));
    assert_eq!(r.monthly_rate, dec!(0.005));
}

#[test]
fn test_envelope_round_trips_through_json() {
    let request = LoanRequest::new(dec!(1000), 12).unwrap();
    let output = calculate_amortization(&TierTable::standard(), &request).unwrap();
    let value = serde_json::to_value(&output).unwrap();

    assert_eq!(value["result"]["installment"], "97.49");
    assert_eq!(value["result"]["entries"].as_array().unwrap().len(), 12);
    assert!(value["methodology"].as_str().unwrap().contains("amortization"));
    assert!(!output.warnings.is_empty());
}
