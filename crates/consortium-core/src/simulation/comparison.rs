use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::calculator::{simulate, SimulationInput, SimulationResult};
use crate::config::SimulationConfig;
use crate::{ConsortiumError, ConsortiumResult, types::*};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidStrategyComparison {
    /// Whole bid paid out of pocket.
    pub out_of_pocket: SimulationResult,
    /// Part of the bid taken from the credit letter.
    pub embedded: SimulationResult,
    /// How much less the client pays in cash with the embedded bid.
    pub out_of_pocket_savings: Money,
    /// Extra installments taken on by the larger credit letter.
    pub installment_count_delta: i64,
    pub gross_credit_increase: Money,
}

/// Simulate the same plan with and without an embedded bid and contrast them.
pub fn compare_bid_strategies(
    input: &SimulationInput,
    config: &SimulationConfig,
) -> ConsortiumResult<ComputationOutput<BidStrategyComparison>> {
    let start = Instant::now();

    let out_of_pocket_input = SimulationInput {
        use_embedded_bid: false,
        ..input.clone()
    };
    let embedded_input = SimulationInput {
        use_embedded_bid: true,
        ..input.clone()
    };

    let without = simulate(&out_of_pocket_input, config)?;
    let with = simulate(&embedded_input, config)?;

    let mut warnings: Vec<String> = Vec::new();
    warnings.extend(without.warnings.iter().map(|w| format!("out of pocket: {w}")));
    warnings.extend(with.warnings.iter().map(|w| format!("embedded: {w}")));

    let savings = without
        .result
        .bid_payable
        .checked_sub(with.result.bid_payable)
        .ok_or_else(|| ConsortiumError::InvalidAmount {
            field: "desired_credit_value".into(),
            value: input.desired_credit_value,
        })?;
    if savings < Decimal::ZERO {
        warnings.push("Embedded bid does not reduce the out-of-pocket bid".into());
    }

    let output = BidStrategyComparison {
        out_of_pocket_savings: savings,
        installment_count_delta: i64::from(with.result.installment_count)
            - i64::from(without.result.installment_count),
        gross_credit_increase: with.result.credit_value_gross - without.result.credit_value_gross,
        out_of_pocket: without.result,
        embedded: with.result,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bid strategy comparison (out-of-pocket vs embedded bid)",
        &serde_json::json!({
            "embedded_bid_percent": output.embedded.embedded_bid_percent.to_string(),
            "bid_fraction": config.policy.bid_fraction.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use rust_decimal_macros::dec;

    fn input() -> SimulationInput {
        SimulationInput {
            category: Category::Vehicle,
            desired_credit_value: dec!(50_000),
            max_installment_value: dec!(900),
            use_embedded_bid: false,
            embedded_bid_percent: Some(dec!(15)),
        }
    }

    #[test]
    fn test_embedded_bid_saves_cash() {
        let result = compare_bid_strategies(&input(), &SimulationConfig::default()).unwrap();
        let out = &result.result;
        assert!(out.out_of_pocket_savings > Decimal::ZERO);
        assert_eq!(
            out.out_of_pocket_savings,
            out.out_of_pocket.bid_payable - out.embedded.bid_payable
        );
    }

    #[test]
    fn test_larger_letter_needs_more_installments() {
        let result = compare_bid_strategies(&input(), &SimulationConfig::default()).unwrap();
        let out = &result.result;
        // 73 installments without, 87 with the grossed-up letter
        assert_eq!(out.out_of_pocket.installment_count, 73);
        assert_eq!(out.embedded.installment_count, 87);
        assert_eq!(out.installment_count_delta, 14);
        assert!(out.gross_credit_increase > Decimal::ZERO);
    }

    #[test]
    fn test_flag_on_input_is_ignored() {
        let mut flagged = input();
        flagged.use_embedded_bid = true;
        let a = compare_bid_strategies(&input(), &SimulationConfig::default()).unwrap();
        let b = compare_bid_strategies(&flagged, &SimulationConfig::default()).unwrap();
        assert_eq!(a.result.out_of_pocket_savings, b.result.out_of_pocket_savings);
    }

    #[test]
    fn test_failure_propagates() {
        let mut bad = input();
        bad.embedded_bid_percent = Some(dec!(120));
        assert!(compare_bid_strategies(&bad, &SimulationConfig::default()).is_err());
    }
}
