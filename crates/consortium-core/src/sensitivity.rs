use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::SimulationConfig;
use crate::error::ConsortiumError;
use crate::simulation::calculator::{simulate, SimulationInput};
use crate::types::*;
use crate::ConsortiumResult;

/// Sweep of the affordable installment around a base simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentSweepInput {
    /// Base case; its `max_installment_value` is replaced at each point.
    pub base: SimulationInput,
    pub max_installment: SweepRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub max_installment_value: Money,
    pub installment_count: u32,
    pub installment_amount: Money,
    pub bid_payable: Money,
    pub post_contemplation_installment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentSweepOutput {
    pub results: Vec<SweepRow>,
    /// Swept values whose simulation failed.
    pub skipped: Vec<Money>,
}

/// Hard ceiling on sweep points.
const MAX_SWEEP_POINTS: usize = 10_000;

/// Generate the sweep values from min to max with step, max always included.
fn generate_sweep_values(range: &SweepRange) -> ConsortiumResult<Vec<Decimal>> {
    if range.step <= Decimal::ZERO {
        return Err(ConsortiumError::InvalidInput {
            field: "max_installment.step".into(),
            reason: "Step must be positive".into(),
        });
    }
    if range.min > range.max {
        return Err(ConsortiumError::InvalidInput {
            field: "max_installment.min".into(),
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = range.min;
    while current <= range.max {
        if values.len() == MAX_SWEEP_POINTS {
            return Err(ConsortiumError::InvalidInput {
                field: "max_installment.step".into(),
                reason: format!("Sweep exceeds {MAX_SWEEP_POINTS} points"),
            });
        }
        values.push(current);
        match current.checked_add(range.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    if let Some(&last) = values.last() {
        if last < range.max {
            values.push(range.max);
        }
    }

    Ok(values)
}

/// Run the simulation across a range of affordable installments.
///
/// Points that fail to simulate (too small for the insurance, or a single
/// installment) are reported as warnings and listed in `skipped`.
pub fn installment_sweep(
    input: &InstallmentSweepInput,
    config: &SimulationConfig,
) -> ConsortiumResult<ComputationOutput<InstallmentSweepOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let values = generate_sweep_values(&input.max_installment)?;
    let mut results = Vec::with_capacity(values.len());
    let mut skipped = Vec::new();

    for value in values {
        let point = SimulationInput {
            max_installment_value: value,
            ..input.base.clone()
        };
        match simulate(&point, config) {
            Ok(sim) => {
                let r = sim.result;
                results.push(SweepRow {
                    max_installment_value: value,
                    installment_count: r.installment_count,
                    installment_amount: r.installment_amount,
                    bid_payable: r.bid_payable,
                    post_contemplation_installment: r.post_contemplation_installment,
                });
            }
            Err(e) => {
                warnings.push(format!("Simulation failed at {value}: {e}"));
                skipped.push(value);
            }
        }
    }

    log::debug!(
        "installment_sweep: {} points evaluated, {} skipped",
        results.len(),
        skipped.len()
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Installment sensitivity sweep",
        &serde_json::json!({
            "category": input.base.category,
            "desired_credit_value": input.base.desired_credit_value.to_string(),
            "use_embedded_bid": input.base.use_embedded_bid,
            "min": input.max_installment.min.to_string(),
            "max": input.max_installment.max.to_string(),
            "step": input.max_installment.step.to_string(),
        }),
        warnings,
        elapsed,
        InstallmentSweepOutput { results, skipped },
    ))
}
