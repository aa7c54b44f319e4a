mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::impact::{CapitalNeedArgs, ImpactArgs};
use commands::projection::ProjectArgs;
use commands::strategies::{OptimizeArgs, StrategiesArgs};
use commands::taxes::TaxesArgs;

/// Split Payment transition simulator
#[derive(Parser)]
#[command(
    name = "spsim",
    version,
    about = "Split Payment transition simulator",
    long_about = "Simulates the working-capital impact of the Brazilian Split Payment \
                  rollout with decimal precision. Supports single-year impact analysis, \
                  capital-need sizing, multi-year projections with growth elasticity, \
                  mitigation strategy evaluation, and combination optimization."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Tax breakdown under the legacy, dual-VAT, and blended regimes
    Taxes(TaxesArgs),
    /// Working-capital impact of the Split Payment regime for one year
    Impact(ImpactArgs),
    /// Adjusted financing need and ranked financing options
    CapitalNeed(CapitalNeedArgs),
    /// Multi-year projection with growth elasticity analysis
    Project(ProjectArgs),
    /// Evaluate mitigation strategies against a year's impact
    Strategies(StrategiesArgs),
    /// Select the optimal strategy combination
    Optimize(OptimizeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Taxes(args) => commands::taxes::run_taxes(args),
        Commands::Impact(args) => commands::impact::run_impact(args),
        Commands::CapitalNeed(args) => commands::impact::run_capital_need(args),
        Commands::Project(args) => commands::projection::run_project(args),
        Commands::Strategies(args) => commands::strategies::run_strategies(args),
        Commands::Optimize(args) => commands::strategies::run_optimize(args),
        Commands::Version => {
            println!("spsim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
