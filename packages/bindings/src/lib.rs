use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use split_payment_core::config::{ImplementationSchedule, SimulationParameters};
use split_payment_core::strategies::StrategyPortfolio;
use split_payment_core::{CompanyProfile, GrowthScenario, Rate};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct YearRequest {
    profile: CompanyProfile,
    year: i32,
    #[serde(default)]
    sector_schedule: Option<ImplementationSchedule>,
    #[serde(default)]
    params: Option<SimulationParameters>,
}

#[derive(Deserialize)]
struct ProjectionRequest {
    profile: CompanyProfile,
    start_year: i32,
    end_year: i32,
    #[serde(default)]
    scenario: Option<GrowthScenario>,
    #[serde(default)]
    custom_growth_rate: Option<Rate>,
    #[serde(default)]
    sector_schedule: Option<ImplementationSchedule>,
    #[serde(default)]
    params: Option<SimulationParameters>,
}

#[derive(Deserialize)]
struct StrategyRequest {
    profile: CompanyProfile,
    year: i32,
    portfolio: StrategyPortfolio,
    #[serde(default)]
    sector_schedule: Option<ImplementationSchedule>,
    #[serde(default)]
    params: Option<SimulationParameters>,
}

// ---------------------------------------------------------------------------
// Impact and capital need
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_impact(input_json: String) -> NapiResult<String> {
    let request: YearRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let params = request.params.unwrap_or_default();
    let output = split_payment_core::impact::compute_impact(
        &request.profile,
        request.year,
        request.sector_schedule.as_ref(),
        &params,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn capital_need(input_json: String) -> NapiResult<String> {
    let request: YearRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let params = request.params.unwrap_or_default();
    let output = split_payment_core::capital_needs::compute_capital_need(
        &request.profile,
        request.year,
        request.sector_schedule.as_ref(),
        &params,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[napi]
pub fn project_temporal(input_json: String) -> NapiResult<String> {
    let request: ProjectionRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let params = request.params.unwrap_or_default();
    let scenario = request
        .scenario
        .unwrap_or(request.profile.growth_scenario);
    let output = split_payment_core::projection::project_temporal(
        &request.profile,
        request.start_year,
        request.end_year,
        scenario,
        request.custom_growth_rate.or(request.profile.custom_growth_rate),
        request.sector_schedule.as_ref(),
        &params,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

#[napi]
pub fn evaluate_strategies(input_json: String) -> NapiResult<String> {
    let request: StrategyRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let params = request.params.unwrap_or_default();
    let output = split_payment_core::strategies::evaluate_strategies(
        &request.profile,
        &request.portfolio,
        request.year,
        request.sector_schedule.as_ref(),
        &params,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn optimize_strategies(input_json: String) -> NapiResult<String> {
    let request: StrategyRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let params = request.params.unwrap_or_default();
    let output = split_payment_core::optimizer::select_optimal_combination(
        &request.profile,
        &request.portfolio,
        request.year,
        request.sector_schedule.as_ref(),
        &params,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
