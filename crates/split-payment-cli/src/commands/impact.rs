use clap::Args;
use serde_json::Value;

use split_payment_core::capital_needs::compute_capital_need;
use split_payment_core::impact::compute_impact;

use super::{default_params, ProfileArgs};

/// Arguments for the single-year impact analysis
#[derive(Args)]
pub struct ImpactArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Calendar year to analyze
    #[arg(long, default_value = "2026")]
    pub year: i32,
}

/// Arguments for the capital-need sizing
#[derive(Args)]
pub struct CapitalNeedArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Calendar year to analyze
    #[arg(long, default_value = "2026")]
    pub year: i32,
}

pub fn run_impact(args: ImpactArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = args.profile.resolve()?;
    let sector_schedule = args.profile.resolve_sector_schedule()?;
    let params = default_params();

    let output = compute_impact(&profile, args.year, sector_schedule.as_ref(), &params)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_capital_need(args: CapitalNeedArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = args.profile.resolve()?;
    let sector_schedule = args.profile.resolve_sector_schedule()?;
    let params = default_params();

    let output = compute_capital_need(&profile, args.year, sector_schedule.as_ref(), &params)?;
    Ok(serde_json::to_value(output)?)
}
