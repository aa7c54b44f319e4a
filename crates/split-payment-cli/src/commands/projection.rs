use clap::Args;
use serde_json::Value;

use split_payment_core::projection::project_temporal;

use super::{default_params, ProfileArgs};

/// Arguments for the multi-year projection
#[derive(Args)]
pub struct ProjectArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// First projected year
    #[arg(long, default_value = "2026")]
    pub start_year: i32,

    /// Last projected year (inclusive)
    #[arg(long, default_value = "2033")]
    pub end_year: i32,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = args.profile.resolve()?;
    let sector_schedule = args.profile.resolve_sector_schedule()?;
    let params = default_params();

    let output = project_temporal(
        &profile,
        args.start_year,
        args.end_year,
        profile.growth_scenario,
        profile.custom_growth_rate,
        sector_schedule.as_ref(),
        &params,
    )?;
    Ok(serde_json::to_value(output)?)
}
