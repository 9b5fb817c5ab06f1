//! Node bindings used by the site's API handlers. JSON in, JSON out.

use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;

use consortium_core::presentation;
use consortium_core::schedule;
use consortium_core::sensitivity::{self, InstallmentSweepInput};
use consortium_core::simulation::calculator::{self, SimulationInput};
use consortium_core::simulation::comparison;
use consortium_core::{Category, ConfigOverrides, SimulationConfig};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Built-in configuration, overlaid with the request's overrides when given.
fn resolve_config(config_json: Option<String>) -> NapiResult<SimulationConfig> {
    match config_json {
        None => Ok(SimulationConfig::default()),
        Some(json) => {
            let overrides: ConfigOverrides =
                serde_json::from_str(&json).map_err(to_napi_error)?;
            overrides.apply().map_err(to_napi_error)
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: SimulationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = resolve_config(config_json)?;
    let output = calculator::simulate(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_bid_strategies(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: SimulationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = resolve_config(config_json)?;
    let output = comparison::compare_bid_strategies(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity and schedule
// ---------------------------------------------------------------------------

#[napi]
pub fn installment_sweep(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let input: InstallmentSweepInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let config = resolve_config(config_json)?;
    let output = sensitivity::installment_sweep(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// `start_date` is an ISO date (YYYY-MM-DD) for the first installment.
#[napi]
pub fn build_schedule(
    input_json: String,
    start_date: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let input: SimulationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let start: NaiveDate = start_date.parse().map_err(to_napi_error)?;
    let config = resolve_config(config_json)?;
    let solved = calculator::simulate(&input, &config).map_err(to_napi_error)?;
    let mut output = schedule::build_schedule(&solved.result, start).map_err(to_napi_error)?;
    output.warnings.extend(solved.warnings);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Configuration and display helpers
// ---------------------------------------------------------------------------

#[napi]
pub fn default_config() -> NapiResult<String> {
    serde_json::to_string(&SimulationConfig::default()).map_err(to_napi_error)
}

/// Canonical key for a form label such as "Imóvel".
#[napi]
pub fn parse_category(label: String) -> NapiResult<String> {
    let category: Category = label.parse().map_err(to_napi_error)?;
    Ok(category.key().to_string())
}

#[napi]
pub fn draw_group_number() -> String {
    presentation::draw_group_number(&mut rand::thread_rng()).to_string()
}
