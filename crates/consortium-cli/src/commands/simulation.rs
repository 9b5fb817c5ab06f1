use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use consortium_core::presentation::draw_group_number;
use consortium_core::schedule;
use consortium_core::simulation::calculator::{self, SimulationInput};
use consortium_core::simulation::comparison;
use consortium_core::{Category, SimulationConfig};

use crate::input;

/// Arguments for a plan simulation
#[derive(Args)]
pub struct SimulateArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Category: vehicle, real_estate, electronics, services, boat, solar
    /// (Portuguese labels such as "imovel" are accepted)
    #[arg(long)]
    pub category: Option<String>,

    /// Desired net credit value
    #[arg(long, alias = "credit")]
    pub credit_value: Option<Decimal>,

    /// Largest affordable monthly installment
    #[arg(long, alias = "installment")]
    pub max_installment: Option<Decimal>,

    /// Take part of the bid from the credit letter
    #[arg(long)]
    pub embedded_bid: bool,

    /// Embedded bid percent (defaults to the policy's, usually 15)
    #[arg(long)]
    pub embedded_bid_percent: Option<Decimal>,

    /// Attach a display group number to the output
    #[arg(long)]
    pub group_number: bool,
}

/// Arguments for a payment schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub simulation: SimulateArgs,

    /// Due date of the first installment (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

impl SimulateArgs {
    /// Whether any of the plan figures was given on the command line.
    pub(crate) fn has_plan_flags(&self) -> bool {
        self.category.is_some() || self.credit_value.is_some() || self.max_installment.is_some()
    }
}

/// Input file first, then piped stdin when no plan flags were given, then flags.
pub(crate) fn build_input(args: &SimulateArgs) -> Result<SimulationInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if !args.has_plan_flags() {
        if let Some(piped) = input::stdin::read_stdin()? {
            return Ok(piped);
        }
    }
    input_from_flags(args)
}

fn input_from_flags(args: &SimulateArgs) -> Result<SimulationInput, Box<dyn std::error::Error>> {

    let category: Category = args
        .category
        .as_deref()
        .ok_or("--category is required (or provide --input)")?
        .parse()?;

    Ok(SimulationInput {
        category,
        desired_credit_value: args
            .credit_value
            .ok_or("--credit-value is required (or provide --input)")?,
        max_installment_value: args
            .max_installment
            .ok_or("--max-installment is required (or provide --input)")?,
        use_embedded_bid: args.embedded_bid,
        embedded_bid_percent: args.embedded_bid_percent,
    })
}

fn attach_group_number(mut value: Value, enabled: bool) -> Value {
    if enabled {
        if let Some(map) = value.as_object_mut() {
            let group = draw_group_number(&mut rand::thread_rng());
            map.insert("group_number".into(), Value::String(group.to_string()));
        }
    }
    value
}

pub fn run_simulate(
    args: SimulateArgs,
    config: &SimulationConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input = build_input(&args)?;
    let result = calculator::simulate(&sim_input, config)?;
    Ok(attach_group_number(serde_json::to_value(result)?, args.group_number))
}

pub fn run_compare(
    args: SimulateArgs,
    config: &SimulationConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input = build_input(&args)?;
    let result = comparison::compare_bid_strategies(&sim_input, config)?;
    Ok(attach_group_number(serde_json::to_value(result)?, args.group_number))
}

pub fn run_schedule(
    args: ScheduleArgs,
    config: &SimulationConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input = build_input(&args.simulation)?;
    let solved = calculator::simulate(&sim_input, config)?;
    let start_date = args
        .start_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let mut plan = schedule::build_schedule(&solved.result, start_date)?;
    plan.warnings.extend(solved.warnings);

    let rows: Vec<Value> = plan
        .result
        .installments
        .iter()
        .map(|i| {
            serde_json::json!({
                "number": i.number,
                "phase": i.phase,
                "due_date": i.flow.date,
                "amount": i.flow.amount,
            })
        })
        .collect();

    let mut value = serde_json::to_value(plan)?;
    if let Some(result) = value.get_mut("result").and_then(|r| r.as_object_mut()) {
        result.insert("installments".into(), Value::Array(rows));
    }
    Ok(attach_group_number(
        super::hoist_rows(value, "installments"),
        args.simulation.group_number,
    ))
}
