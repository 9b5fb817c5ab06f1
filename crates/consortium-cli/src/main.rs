mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::fees::FeesArgs;
use commands::sensitivity::SweepArgs;
use commands::simulation::{ScheduleArgs, SimulateArgs};

/// Consortium plan simulations
#[derive(Parser)]
#[command(
    name = "csim",
    version,
    about = "Consortium plan simulations",
    long_about = "Simulate consortium (consórcio) plans with decimal precision: solve the \
                  installment count for an affordable monthly payment, report administration \
                  and reserve fund charges, insurance, and the bid needed for contemplation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Fee tables and policy overrides (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a plan for a desired credit and an affordable installment
    Simulate(SimulateArgs),
    /// Compare paying the bid out of pocket against an embedded bid
    Compare(SimulateArgs),
    /// Sweep the affordable installment and report how the plan changes
    Sweep(SweepArgs),
    /// Month-by-month payment schedule of a plan
    Schedule(ScheduleArgs),
    /// Show the fee tables and policy in effect
    Fees(FeesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = match input::config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::simulation::run_simulate(args, &config),
        Commands::Compare(args) => commands::simulation::run_compare(args, &config),
        Commands::Sweep(args) => commands::sensitivity::run_sweep(args, &config),
        Commands::Schedule(args) => commands::simulation::run_schedule(args, &config),
        Commands::Fees(args) => commands::fees::run_fees(args, &config),
        Commands::Version => {
            println!("csim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            if let Err(e) = output::format_output(&cli.output, &value) {
                eprintln!("{}: {}", "error".red().bold(), e);
                process::exit(1);
            }
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
