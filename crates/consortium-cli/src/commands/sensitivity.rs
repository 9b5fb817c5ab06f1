use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use consortium_core::sensitivity::{self, InstallmentSweepInput};
use consortium_core::{SimulationConfig, SweepRange};

use super::simulation::{build_input, SimulateArgs};
use crate::input;

/// Arguments for an installment sweep
#[derive(Args)]
pub struct SweepArgs {
    /// Path to JSON file with the base case and range (overrides individual flags)
    #[arg(long)]
    pub sweep_input: Option<String>,

    #[command(flatten)]
    pub base: SimulateArgs,

    /// Range of affordable installments as min:max:step (e.g. "500:1500:100")
    #[arg(long)]
    pub range: Option<String>,
}

fn parse_range(range_arg: &str) -> Result<SweepRange, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = range_arg.split(':').collect();
    if parts.len() != 3 {
        return Err(format!("Range must be min:max:step, got '{}'", range_arg).into());
    }
    Ok(SweepRange {
        min: parts[0].parse::<Decimal>()?,
        max: parts[1].parse::<Decimal>()?,
        step: parts[2].parse::<Decimal>()?,
    })
}

pub fn run_sweep(
    args: SweepArgs,
    config: &SimulationConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let sweep_input: InstallmentSweepInput = if let Some(ref path) = args.sweep_input {
        input::file::read_json(path)?
    } else {
        let range = parse_range(
            args.range
                .as_deref()
                .ok_or("--range is required (or provide --sweep-input)")?,
        )?;
        let mut base_args = args.base;
        // the swept value replaces it, any positive placeholder will do;
        // without plan flags the base comes from stdin instead
        if base_args.has_plan_flags() {
            base_args.max_installment.get_or_insert(range.max);
        }
        InstallmentSweepInput {
            base: build_input(&base_args)?,
            max_installment: range,
        }
    };

    let result = sensitivity::installment_sweep(&sweep_input, config)?;
    Ok(super::hoist_rows(serde_json::to_value(result)?, "results"))
}
