use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::category::{Category, FeeTable};
use crate::config::{BidPayablePolicy, SimulationConfig, SimulationPolicy};
use crate::money::{ceil_count, percent_to_rate};
use crate::{ConsortiumError, ConsortiumResult, types::*};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    pub category: Category,
    /// Net credit the client wants to receive.
    pub desired_credit_value: Money,
    /// Largest monthly installment the client can afford.
    pub max_installment_value: Money,
    #[serde(default)]
    pub use_embedded_bid: bool,
    /// Share of the credit letter consumed by the embedded bid (15 = 15%).
    /// Falls back to the policy default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_bid_percent: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationCharges {
    pub reserve_fund: Money,
    pub admin_tax: Money,
    pub monthly_life_insurance: Money,
    pub monthly_damage_insurance: Money,
    /// Monthly life insurance over the whole plan.
    pub life_insurance_total: Money,
    /// Monthly damage insurance over the whole plan.
    pub damage_insurance_total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub category: Category,
    pub credit_value_used: Money,
    /// Face value of the credit letter. Larger than the desired value when
    /// part of it is consumed by an embedded bid.
    pub credit_value_gross: Money,
    pub embedded_bid_percent: Percent,
    pub installment_count: u32,
    pub installment_amount: Money,
    /// Gross credit plus reserve fund plus administration tax.
    pub total_with_charges: Money,
    pub monthly_insurance_total: Money,
    pub amortization_budget: Money,
    pub bid_required: Money,
    pub bid_embedded: Money,
    pub bid_payable: Money,
    pub post_contemplation_installment: Money,
    pub charges: SimulationCharges,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve a consortium plan: installment count, real installment, charges and
/// the bid needed for contemplation.
pub fn simulate(
    input: &SimulationInput,
    config: &SimulationConfig,
) -> ConsortiumResult<ComputationOutput<SimulationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let fees = config.fees.table_for(input.category)?;
    fees.validate(input.category)?;
    config.policy.validate()?;

    validate_input(input)?;
    let embedded_percent = resolve_embedded_percent(input, &config.policy)?;

    // Any figure beyond Decimal range traces back to the credit value.
    let unrepresentable = || ConsortiumError::InvalidAmount {
        field: "desired_credit_value".into(),
        value: input.desired_credit_value,
    };

    // -- Credit face value ----------------------------------------------------
    let credit_value_gross = match embedded_percent {
        Some(pct) => input
            .desired_credit_value
            .checked_div(Decimal::ONE - percent_to_rate(pct))
            .ok_or_else(unrepresentable)?,
        None => input.desired_credit_value,
    };

    // -- One-time charges -----------------------------------------------------
    let reserve_fund = checked_share(credit_value_gross, fees.reserve_fund_rate)
        .ok_or_else(unrepresentable)?;
    let admin_tax =
        checked_share(credit_value_gross, fees.admin_tax_rate).ok_or_else(unrepresentable)?;
    let total_with_charges = credit_value_gross
        .checked_add(reserve_fund)
        .and_then(|t| t.checked_add(admin_tax))
        .ok_or_else(unrepresentable)?;

    // -- Monthly insurance ----------------------------------------------------
    let monthly_life_insurance = checked_share(credit_value_gross, fees.life_insurance_rate)
        .ok_or_else(unrepresentable)?;
    let monthly_damage_insurance = checked_share(credit_value_gross, fees.damage_insurance_rate)
        .ok_or_else(unrepresentable)?;
    let monthly_insurance_total = monthly_life_insurance
        .checked_add(monthly_damage_insurance)
        .ok_or_else(unrepresentable)?;

    // -- Installment count ----------------------------------------------------
    let installment_too_small = || ConsortiumError::InstallmentTooSmall {
        max_installment: input.max_installment_value,
        monthly_insurance: monthly_insurance_total,
    };
    let amortization_budget = input
        .max_installment_value
        .checked_sub(monthly_insurance_total)
        .ok_or_else(installment_too_small)?;
    if amortization_budget <= Decimal::ZERO {
        return Err(installment_too_small());
    }
    let installment_count =
        ceil_count(total_with_charges, amortization_budget)?.ok_or_else(installment_too_small)?;

    // ceil only rounds the count up, so this never exceeds the affordable installment
    let installment_amount = (total_with_charges / Decimal::from(installment_count))
        .checked_add(monthly_insurance_total)
        .ok_or_else(unrepresentable)?;

    // -- Bid ------------------------------------------------------------------
    let bid_required = checked_share(total_with_charges, config.policy.bid_fraction)
        .ok_or_else(unrepresentable)?;
    let bid_embedded = match embedded_percent {
        Some(pct) => checked_share(total_with_charges, percent_to_rate(pct))
            .ok_or_else(unrepresentable)?,
        None => Decimal::ZERO,
    };
    let bid_payable = resolve_bid_payable(
        bid_required,
        bid_embedded,
        config.policy.bid_payable,
        &mut warnings,
    );

    // -- After contemplation --------------------------------------------------
    let remaining_installments = installment_count - 1;
    if remaining_installments == 0 {
        return Err(ConsortiumError::NoRemainingInstallments { installment_count });
    }
    let per_installment_bid_share = bid_required / Decimal::from(remaining_installments);
    let post_contemplation_installment =
        (input.max_installment_value - per_installment_bid_share).max(Decimal::ZERO);

    if let Some(term) = config.policy.max_installment_count {
        if installment_count > term {
            warnings.push(format!(
                "Plan needs {installment_count} installments, beyond the group term of {term}"
            ));
        }
    }

    let count = Decimal::from(installment_count);
    let life_insurance_total = monthly_life_insurance
        .checked_mul(count)
        .ok_or_else(unrepresentable)?;
    let damage_insurance_total = monthly_damage_insurance
        .checked_mul(count)
        .ok_or_else(unrepresentable)?;
    let output = SimulationResult {
        category: input.category,
        credit_value_used: input.desired_credit_value,
        credit_value_gross,
        embedded_bid_percent: embedded_percent.unwrap_or(Decimal::ZERO),
        installment_count,
        installment_amount,
        total_with_charges,
        monthly_insurance_total,
        amortization_budget,
        bid_required,
        bid_embedded,
        bid_payable,
        post_contemplation_installment,
        charges: SimulationCharges {
            reserve_fund,
            admin_tax,
            monthly_life_insurance,
            monthly_damage_insurance,
            life_insurance_total,
            damage_insurance_total,
        },
    };

    log::debug!(
        "simulate: category={} gross={} installments={} bid_payable={}",
        input.category,
        credit_value_gross,
        installment_count,
        bid_payable
    );
    for w in &warnings {
        log::warn!("simulate: {w}");
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = assumptions_for(fees, &config.policy);

    Ok(with_metadata(
        "Consortium plan simulation (installment solver with bid for contemplation)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// `simulate` with the built-in fee tables and policy.
pub fn simulate_with_defaults(
    input: &SimulationInput,
) -> ConsortiumResult<ComputationOutput<SimulationResult>> {
    simulate(input, &SimulationConfig::default())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &SimulationInput) -> ConsortiumResult<()> {
    if input.desired_credit_value <= Decimal::ZERO {
        return Err(ConsortiumError::InvalidAmount {
            field: "desired_credit_value".into(),
            value: input.desired_credit_value,
        });
    }
    if input.max_installment_value <= Decimal::ZERO {
        return Err(ConsortiumError::InvalidAmount {
            field: "max_installment_value".into(),
            value: input.max_installment_value,
        });
    }
    Ok(())
}

/// Effective embedded bid percent, `None` when the bid is paid out of pocket.
fn resolve_embedded_percent(
    input: &SimulationInput,
    policy: &SimulationPolicy,
) -> ConsortiumResult<Option<Percent>> {
    if !input.use_embedded_bid {
        return Ok(None);
    }
    let pct = input
        .embedded_bid_percent
        .unwrap_or(policy.default_embedded_bid_percent);
    if pct < Decimal::ZERO || pct >= Decimal::ONE_HUNDRED {
        return Err(ConsortiumError::InvalidBidPercent(pct));
    }
    Ok(Some(pct))
}

/// `amount * rate`, `None` when the product is beyond `Decimal` range.
fn checked_share(amount: Money, rate: Rate) -> Option<Money> {
    amount.checked_mul(rate)
}

fn resolve_bid_payable(
    bid_required: Money,
    bid_embedded: Money,
    policy: BidPayablePolicy,
    warnings: &mut Vec<String>,
) -> Money {
    let payable = bid_required - bid_embedded;
    if payable >= Decimal::ZERO {
        return payable;
    }
    match policy {
        BidPayablePolicy::Surface => {
            warnings.push(format!(
                "Embedded bid ({bid_embedded}) exceeds the bid required ({bid_required}); \
                 payable bid is negative"
            ));
            payable
        }
        BidPayablePolicy::ClampAtZero => {
            warnings.push(format!(
                "Embedded bid ({bid_embedded}) exceeds the bid required ({bid_required}); \
                 payable bid clamped to zero"
            ));
            Decimal::ZERO
        }
    }
}

fn assumptions_for(fees: &FeeTable, policy: &SimulationPolicy) -> serde_json::Value {
    serde_json::json!({
        "reserve_fund_rate": fees.reserve_fund_rate.to_string(),
        "admin_tax_rate": fees.admin_tax_rate.to_string(),
        "life_insurance_rate": fees.life_insurance_rate.to_string(),
        "damage_insurance_rate": fees.damage_insurance_rate.to_string(),
        "bid_fraction": policy.bid_fraction.to_string(),
        "bid_payable_policy": policy.bid_payable,
        "contemplation_after_installments": 1,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::FeeSchedule;
    use rust_decimal_macros::dec;

    fn vehicle_input() -> SimulationInput {
        SimulationInput {
            category: Category::Vehicle,
            desired_credit_value: dec!(50_000),
            max_installment_value: dec!(900),
            use_embedded_bid: false,
            embedded_bid_percent: None,
        }
    }

    #[test]
    fn test_one_time_charges() {
        let result = simulate_with_defaults(&vehicle_input()).unwrap();
        let out = &result.result;
        // 50k * 0.005 = 250, 50k * 0.16 = 8000
        assert_eq!(out.charges.reserve_fund, dec!(250));
        assert_eq!(out.charges.admin_tax, dec!(8000));
        assert_eq!(out.total_with_charges, dec!(58_250));
    }

    #[test]
    fn test_monthly_insurance() {
        let result = simulate_with_defaults(&vehicle_input()).unwrap();
        let out = &result.result;
        // 50k * 0.0012 = 60, 50k * 0.0007 = 35
        assert_eq!(out.charges.monthly_life_insurance, dec!(60));
        assert_eq!(out.charges.monthly_damage_insurance, dec!(35));
        assert_eq!(out.monthly_insurance_total, dec!(95));
        assert_eq!(out.amortization_budget, dec!(805));
    }

    #[test]
    fn test_installment_count_is_ceiling() {
        let result = simulate_with_defaults(&vehicle_input()).unwrap();
        // ceil(58250 / 805) = ceil(72.36) = 73
        assert_eq!(result.result.installment_count, 73);
    }

    #[test]
    fn test_insurance_totals_scale_with_count() {
        let result = simulate_with_defaults(&vehicle_input()).unwrap();
        let out = &result.result;
        assert_eq!(out.charges.life_insurance_total, dec!(60) * dec!(73));
        assert_eq!(out.charges.damage_insurance_total, dec!(35) * dec!(73));
    }

    #[test]
    fn test_embedded_bid_gross_up() {
        let mut input = vehicle_input();
        input.use_embedded_bid = true;
        input.embedded_bid_percent = Some(dec!(15));
        let result = simulate_with_defaults(&input).unwrap();
        assert_eq!(result.result.credit_value_gross, dec!(50_000) / dec!(0.85));
        assert_eq!(result.result.credit_value_used, dec!(50_000));
        assert_eq!(result.result.embedded_bid_percent, dec!(15));
    }

    #[test]
    fn test_embedded_percent_defaults_from_policy() {
        let mut input = vehicle_input();
        input.use_embedded_bid = true;
        let result = simulate_with_defaults(&input).unwrap();
        assert_eq!(result.result.embedded_bid_percent, dec!(15));
    }

    #[test]
    fn test_percent_ignored_without_embedded_bid() {
        let mut input = vehicle_input();
        input.embedded_bid_percent = Some(dec!(250));
        let result = simulate_with_defaults(&input).unwrap();
        assert_eq!(result.result.bid_embedded, Decimal::ZERO);
        assert_eq!(result.result.embedded_bid_percent, Decimal::ZERO);
    }

    #[test]
    fn test_hundred_percent_bid_rejected() {
        let mut input = vehicle_input();
        input.use_embedded_bid = true;
        input.embedded_bid_percent = Some(dec!(100));
        let err = simulate_with_defaults(&input).unwrap_err();
        assert!(matches!(err, ConsortiumError::InvalidBidPercent(p) if p == dec!(100)));
    }

    #[test]
    fn test_negative_bid_percent_rejected() {
        let mut input = vehicle_input();
        input.use_embedded_bid = true;
        input.embedded_bid_percent = Some(dec!(-1));
        let err = simulate_with_defaults(&input).unwrap_err();
        assert!(matches!(err, ConsortiumError::InvalidBidPercent(_)));
    }

    #[test]
    fn test_zero_credit_rejected() {
        let mut input = vehicle_input();
        input.desired_credit_value = Decimal::ZERO;
        let err = simulate_with_defaults(&input).unwrap_err();
        match err {
            ConsortiumError::InvalidAmount { field, .. } => {
                assert_eq!(field, "desired_credit_value")
            }
            other => panic!("Expected InvalidAmount, got {other:?}"),
        }
    }

    #[test]
    fn test_insurance_exceeding_installment() {
        let mut input = vehicle_input();
        // 95 of insurance against an installment of 95
        input.max_installment_value = dec!(95);
        let err = simulate_with_defaults(&input).unwrap_err();
        assert!(matches!(err, ConsortiumError::InstallmentTooSmall { .. }));
    }

    #[test]
    fn test_vanishing_amortization_budget_is_too_small() {
        let mut input = vehicle_input();
        input.desired_credit_value = dec!(100_000);
        // 190 of insurance leaves 1e-25 a month for 116500 of principal
        input.max_installment_value = dec!(190.0000000000000000000000001);
        let err = simulate_with_defaults(&input).unwrap_err();
        assert!(matches!(err, ConsortiumError::InstallmentTooSmall { .. }));
    }

    #[test]
    fn test_credit_beyond_decimal_range_is_invalid_amount() {
        let mut input = vehicle_input();
        input.desired_credit_value = dec!(70_000_000_000_000_000_000_000_000_000);
        let err = simulate_with_defaults(&input).unwrap_err();
        match err {
            ConsortiumError::InvalidAmount { field, .. } => {
                assert_eq!(field, "desired_credit_value")
            }
            other => panic!("Expected InvalidAmount, got {other:?}"),
        }
    }

    #[test]
    fn test_embedded_gross_up_beyond_decimal_range_is_invalid_amount() {
        let mut input = vehicle_input();
        input.desired_credit_value = dec!(70_000_000_000_000_000_000_000_000_000);
        input.use_embedded_bid = true;
        input.embedded_bid_percent = Some(dec!(50));
        let err = simulate_with_defaults(&input).unwrap_err();
        assert!(matches!(err, ConsortiumError::InvalidAmount { .. }));
    }

    #[test]
    fn test_single_installment_has_no_remaining() {
        let mut input = vehicle_input();
        input.max_installment_value = dec!(100_000);
        let err = simulate_with_defaults(&input).unwrap_err();
        match err {
            ConsortiumError::NoRemainingInstallments { installment_count } => {
                assert_eq!(installment_count, 1)
            }
            other => panic!("Expected NoRemainingInstallments, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_fee_table_is_invalid_category() {
        let config = SimulationConfig {
            fees: FeeSchedule::empty(),
            ..SimulationConfig::default()
        };
        let err = simulate(&vehicle_input(), &config).unwrap_err();
        assert!(matches!(err, ConsortiumError::InvalidCategory(_)));
    }

    #[test]
    fn test_group_term_warning() {
        let mut input = vehicle_input();
        // 58250 / (300 - 95) = 284.1 => 285 installments
        input.max_installment_value = dec!(300);
        let result = simulate_with_defaults(&input).unwrap();
        assert_eq!(result.result.installment_count, 285);
        assert!(result.warnings.iter().any(|w| w.contains("group term")));
    }

    #[test]
    fn test_no_warnings_for_ordinary_plan() {
        let result = simulate_with_defaults(&vehicle_input()).unwrap();
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_input_json_accepts_accented_label() {
        let input: SimulationInput = serde_json::from_str(
            r#"{
                "category": "Imóvel",
                "desired_credit_value": "200000",
                "max_installment_value": "2500"
            }"#,
        )
        .unwrap();
        assert_eq!(input.category, Category::RealEstate);
        let result = simulate_with_defaults(&input).unwrap();
        assert_eq!(result.result.category, Category::RealEstate);
    }

    #[test]
    fn test_metadata_populated() {
        let result = simulate_with_defaults(&vehicle_input()).unwrap();
        assert_eq!(result.metadata.precision, "rust_decimal_128bit");
        assert!(result.methodology.contains("Consortium"));
        assert_eq!(result.assumptions["bid_fraction"], "0.53");
    }
}
