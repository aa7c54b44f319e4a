use clap::Args;
use serde_json::Value;

use split_payment_core::optimizer::select_optimal_combination;
use split_payment_core::strategies::{evaluate_strategies, StrategyPortfolio};

use super::{default_params, ProfileArgs};

use crate::input;

/// Arguments for strategy evaluation
#[derive(Args)]
pub struct StrategiesArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Calendar year whose impact the strategies target
    #[arg(long, default_value = "2027")]
    pub year: i32,

    /// Path to a JSON strategy portfolio (per-strategy configuration blocks)
    #[arg(long)]
    pub portfolio: String,
}

/// Arguments for combination optimization
#[derive(Args)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Calendar year whose impact the strategies target
    #[arg(long, default_value = "2027")]
    pub year: i32,

    /// Path to a JSON strategy portfolio
    #[arg(long)]
    pub portfolio: String,
}

pub fn run_strategies(args: StrategiesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = args.profile.resolve()?;
    let sector_schedule = args.profile.resolve_sector_schedule()?;
    let portfolio: StrategyPortfolio = input::file::read_json(&args.portfolio)?;
    let params = default_params();

    let output = evaluate_strategies(
        &profile,
        &portfolio,
        args.year,
        sector_schedule.as_ref(),
        &params,
    )?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_optimize(args: OptimizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = args.profile.resolve()?;
    let sector_schedule = args.profile.resolve_sector_schedule()?;
    let portfolio: StrategyPortfolio = input::file::read_json(&args.portfolio)?;
    let params = default_params();

    let output = select_optimal_combination(
        &profile,
        &portfolio,
        args.year,
        sector_schedule.as_ref(),
        &params,
    )?;
    Ok(serde_json::to_value(output)?)
}
