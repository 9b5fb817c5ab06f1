use clap::Args;
use serde_json::Value;

use consortium_core::{Category, SimulationConfig};

/// Arguments for the fee table listing
#[derive(Args)]
pub struct FeesArgs {
    /// Only show this category
    #[arg(long)]
    pub category: Option<String>,
}

pub fn run_fees(
    args: FeesArgs,
    config: &SimulationConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let only: Option<Category> = args.category.as_deref().map(str::parse::<Category>).transpose()?;

    let mut rows = Vec::new();
    for (category, table) in config.fees.iter() {
        if only.is_some_and(|c| c != *category) {
            continue;
        }
        rows.push(serde_json::json!({
            "category": category,
            "reserve_fund_rate": table.reserve_fund_rate,
            "admin_tax_rate": table.admin_tax_rate,
            "life_insurance_rate": table.life_insurance_rate,
            "damage_insurance_rate": table.damage_insurance_rate,
        }));
    }
    if let Some(category) = only {
        // surfaces InvalidCategory when the schedule lacks it
        config.fees.table_for(category)?;
    }

    Ok(serde_json::json!({
        "result": config.policy,
        "results": rows,
    }))
}
