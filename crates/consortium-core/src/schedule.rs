use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ConsortiumError;
use crate::simulation::calculator::SimulationResult;
use crate::types::*;
use crate::ConsortiumResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPhase {
    PreContemplation,
    PostContemplation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledInstallment {
    pub number: u32,
    pub phase: PlanPhase,
    pub flow: CashFlow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSchedule {
    pub installments: Vec<ScheduledInstallment>,
    pub total_paid: Money,
    pub final_due_date: NaiveDate,
}

/// Lay a solved plan out month by month from `start_date`.
///
/// The first installment is paid at the full amount; contemplation follows
/// it and every later installment is the post-contemplation amount. Due dates
/// keep the start day of month, clamped to the month's last day.
pub fn build_schedule(
    result: &SimulationResult,
    start_date: NaiveDate,
) -> ConsortiumResult<ComputationOutput<PaymentSchedule>> {
    let start = Instant::now();

    let mut installments = Vec::with_capacity(result.installment_count as usize);
    let mut total_paid = Money::ZERO;

    for number in 1..=result.installment_count {
        let date = start_date
            .checked_add_months(Months::new(number - 1))
            .ok_or_else(|| ConsortiumError::InvalidInput {
                field: "start_date".into(),
                reason: format!("Installment {number} falls outside the supported calendar"),
            })?;
        let (phase, amount, label) = if number == 1 {
            (
                PlanPhase::PreContemplation,
                result.installment_amount,
                "installment before contemplation",
            )
        } else {
            (
                PlanPhase::PostContemplation,
                result.post_contemplation_installment,
                "installment after contemplation",
            )
        };
        total_paid = total_paid
            .checked_add(amount)
            .ok_or_else(|| ConsortiumError::InvalidInput {
                field: "installments".into(),
                reason: "Total paid is beyond the representable range".into(),
            })?;
        installments.push(ScheduledInstallment {
            number,
            phase,
            flow: CashFlow {
                date,
                amount,
                label: Some(label.to_string()),
            },
        });
    }

    let final_due_date = installments
        .last()
        .map(|i| i.flow.date)
        .unwrap_or(start_date);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly payment schedule (contemplation after the first installment)",
        &serde_json::json!({
            "start_date": start_date.to_string(),
            "installment_count": result.installment_count,
        }),
        Vec::new(),
        elapsed,
        PaymentSchedule {
            installments,
            total_paid,
            final_due_date,
        },
    ))
}
