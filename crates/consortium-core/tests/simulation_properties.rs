use consortium_core::simulation::calculator::{simulate_with_defaults, SimulationInput};
use consortium_core::{Category, ConsortiumError};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

/// Whole reais, so every generated amount is exact in decimal.
fn money(min: i64, max: i64) -> impl Strategy<Value = Decimal> {
    (min..=max).prop_map(Decimal::from)
}

fn input(
    category: Category,
    credit: Decimal,
    installment: Decimal,
    embedded: Option<Decimal>,
) -> SimulationInput {
    SimulationInput {
        category,
        desired_credit_value: credit,
        max_installment_value: installment,
        use_embedded_bid: embedded.is_some(),
        embedded_bid_percent: embedded,
    }
}

proptest! {
    #[test]
    fn installment_never_exceeds_affordable(
        category in category(),
        credit in money(5_000, 500_000),
        installment in money(100, 20_000),
        embedded in prop::option::of(0u32..=60),
    ) {
        let embedded = embedded.map(Decimal::from);
        if let Ok(out) = simulate_with_defaults(&input(category, credit, installment, embedded)) {
            prop_assert!(out.result.installment_amount <= installment + dec!(0.000000001));
        }
    }

    #[test]
    fn schedule_amortises_everything(
        category in category(),
        credit in money(5_000, 500_000),
        installment in money(100, 20_000),
    ) {
        if let Ok(out) = simulate_with_defaults(&input(category, credit, installment, None)) {
            let r = out.result;
            let n = Decimal::from(r.installment_count);
            let diff = (r.installment_amount * n - (r.total_with_charges + n * r.monthly_insurance_total)).abs();
            prop_assert!(diff < dec!(0.0001), "diff {}", diff);
        }
    }

    #[test]
    fn larger_installment_never_needs_more_installments(
        category in category(),
        credit in money(5_000, 500_000),
        installment in money(100, 20_000),
        raise in money(1, 5_000),
    ) {
        let low = simulate_with_defaults(&input(category, credit, installment, None));
        let high = simulate_with_defaults(&input(category, credit, installment + raise, None));
        if let (Ok(low), Ok(high)) = (low, high) {
            prop_assert!(high.result.installment_count <= low.result.installment_count);
        }
    }

    #[test]
    fn out_of_pocket_keeps_desired_value(
        category in category(),
        credit in money(5_000, 500_000),
        installment in money(100, 20_000),
    ) {
        if let Ok(out) = simulate_with_defaults(&input(category, credit, installment, None)) {
            prop_assert_eq!(out.result.credit_value_gross, credit);
            prop_assert_eq!(out.result.bid_embedded, Decimal::ZERO);
        }
    }

    #[test]
    fn payable_is_required_minus_embedded(
        category in category(),
        credit in money(5_000, 500_000),
        installment in money(100, 20_000),
        embedded in 0u32..=90,
    ) {
        let pct = Decimal::from(embedded);
        if let Ok(out) = simulate_with_defaults(&input(category, credit, installment, Some(pct))) {
            let r = out.result;
            prop_assert_eq!(r.bid_payable, r.bid_required - r.bid_embedded);
        }
    }

    #[test]
    fn non_positive_amounts_always_rejected(
        category in category(),
        bad in money(-100_000, 0),
        good in money(1, 100_000),
        bad_is_credit in any::<bool>(),
    ) {
        let (credit, installment) = if bad_is_credit { (bad, good) } else { (good, bad) };
        let err = simulate_with_defaults(&input(category, credit, installment, None)).unwrap_err();
        let is_invalid_amount = matches!(err, ConsortiumError::InvalidAmount { .. });
        prop_assert!(is_invalid_amount);
    }
}
