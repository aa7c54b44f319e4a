use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::config::{ImplementationSchedule, SimulationParameters};
use crate::error::SplitPaymentError;
use crate::impact::compute_impact_inner;
use crate::types::{
    with_metadata, CalculationTrace, CompanyProfile, ComputationOutput, GrowthScenario, Money,
    Rate,
};
use crate::SplitPaymentResult;

/// Named growth scenarios swept by the elasticity analysis. Moderate is the
/// pivot and is excluded from its own elasticity map.
const ELASTICITY_SCENARIOS: [(&str, Rate); 6] = [
    ("Recession", dec!(-0.02)),
    ("Stagnation", dec!(0.00)),
    ("Conservative", dec!(0.02)),
    ("Moderate", dec!(0.05)),
    ("Optimistic", dec!(0.08)),
    ("Accelerated", dec!(0.12)),
];

const PIVOT_SCENARIO: &str = "Moderate";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One simulated year of the transition horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyProjection {
    pub year: i32,
    /// Revenue used for this year (compounded from the previous year)
    pub monthly_revenue: Money,
    pub implementation_fraction: Rate,
    pub capital_delta: Money,
    pub financing_need: Money,
    pub annual_financing_cost: Money,
    pub margin_erosion_pp: Decimal,
}

/// Running totals across the projected horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionTotals {
    pub accumulated_financing_need: Money,
    pub accumulated_financing_cost: Money,
    /// Mean margin erosion over the inclusive year count
    pub average_margin_erosion_pp: Decimal,
}

/// Sensitivity of the accumulated impact to the growth-rate assumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticityAnalysis {
    pub pivot_scenario: String,
    pub pivot_growth_rate: Rate,
    pub pivot_accumulated_need: Money,
    /// Accumulated financing need per named scenario (pivot included)
    pub scenario_impacts: BTreeMap<String, Money>,
    /// (%Δ accumulated impact) ÷ (%Δ growth rate) per scenario; the pivot
    /// has no entry
    pub elasticities: BTreeMap<String, Decimal>,
}

/// Full multi-year projection output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub start_year: i32,
    pub end_year: i32,
    pub growth_scenario: GrowthScenario,
    pub growth_rate: Rate,
    pub years: Vec<YearlyProjection>,
    pub totals: ProjectionTotals,
    pub elasticity: ElasticityAnalysis,
    pub trace: CalculationTrace,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Project the impact year-over-year across `[start_year, end_year]` with
/// compounding revenue growth, then derive the elasticity analysis.
pub fn project_temporal(
    profile: &CompanyProfile,
    start_year: i32,
    end_year: i32,
    scenario: GrowthScenario,
    custom_rate: Option<Rate>,
    sector_override: Option<&ImplementationSchedule>,
    params: &SimulationParameters,
) -> SplitPaymentResult<ComputationOutput<ProjectionResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if end_year < start_year {
        return Err(SplitPaymentError::InvalidInput {
            field: "end_year".into(),
            reason: format!("End year {end_year} precedes start year {start_year}."),
        });
    }

    let growth_rate = scenario.annual_rate(custom_rate);
    if scenario == GrowthScenario::Custom && custom_rate.is_none() {
        warnings.push("Custom scenario without a rate; moderate default (5%) used.".to_string());
    }

    let (years, totals) = run_horizon(
        profile,
        start_year,
        end_year,
        growth_rate,
        sector_override,
        params,
    );

    let elasticity = elasticity_analysis(profile, start_year, end_year, sector_override, params);

    let mut trace = CalculationTrace::new();
    trace.push(
        "Horizon",
        format!(
            "{start_year}–{end_year} at {growth_rate} annual growth ({} years)",
            years.len()
        ),
    );
    trace.push(
        "Accumulated financing need",
        format!("{}", totals.accumulated_financing_need),
    );
    trace.push(
        "Accumulated financing cost",
        format!("{}", totals.accumulated_financing_cost),
    );
    trace.push(
        "Average margin erosion",
        format!("{} pp per year", totals.average_margin_erosion_pp),
    );

    let result = ProjectionResult {
        start_year,
        end_year,
        growth_scenario: scenario,
        growth_rate,
        years,
        totals,
        elasticity,
        trace,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Temporal Projection with Growth Elasticity",
        &serde_json::json!({
            "start_year": start_year,
            "end_year": end_year,
            "growth_scenario": scenario,
            "growth_rate": growth_rate,
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Iterate the impact analyzer across the closed horizon, compounding
/// revenue on the previous year's already-grown value.
fn run_horizon(
    profile: &CompanyProfile,
    start_year: i32,
    end_year: i32,
    growth_rate: Rate,
    sector_override: Option<&ImplementationSchedule>,
    params: &SimulationParameters,
) -> (Vec<YearlyProjection>, ProjectionTotals) {
    let mut years = Vec::with_capacity((end_year - start_year + 1) as usize);
    let mut accumulated_need = Decimal::ZERO;
    let mut accumulated_cost = Decimal::ZERO;
    let mut erosion_sum = Decimal::ZERO;

    let mut current = profile.clone();
    let mut scratch_warnings = Vec::new();

    for year in start_year..=end_year {
        let impact =
            compute_impact_inner(&current, year, sector_override, params, &mut scratch_warnings);

        accumulated_need += impact.financing_need;
        accumulated_cost += impact.margin_impact.annual_financing_cost;
        erosion_sum += impact.margin_impact.margin_erosion_pp;

        years.push(YearlyProjection {
            year,
            monthly_revenue: current.monthly_revenue,
            implementation_fraction: impact.split_payment.implementation_fraction,
            capital_delta: impact.capital_delta,
            financing_need: impact.financing_need,
            annual_financing_cost: impact.margin_impact.annual_financing_cost,
            margin_erosion_pp: impact.margin_impact.margin_erosion_pp,
        });

        current = current
            .with_monthly_revenue(current.monthly_revenue * (Decimal::ONE + growth_rate));
    }

    let year_count = Decimal::from(end_year - start_year + 1);
    let totals = ProjectionTotals {
        accumulated_financing_need: accumulated_need,
        accumulated_financing_cost: accumulated_cost,
        average_margin_erosion_pp: erosion_sum / year_count,
    };

    (years, totals)
}

/// Rerun the projection under each named scenario and relate the change in
/// accumulated impact to the change in growth rate, pivoting on Moderate.
fn elasticity_analysis(
    profile: &CompanyProfile,
    start_year: i32,
    end_year: i32,
    sector_override: Option<&ImplementationSchedule>,
    params: &SimulationParameters,
) -> ElasticityAnalysis {
    let mut scenario_impacts = BTreeMap::new();
    for (name, rate) in ELASTICITY_SCENARIOS {
        let (_, totals) = run_horizon(
            profile,
            start_year,
            end_year,
            rate,
            sector_override,
            params,
        );
        scenario_impacts.insert(name.to_string(), totals.accumulated_financing_need);
    }

    let pivot_rate = ELASTICITY_SCENARIOS
        .iter()
        .find(|(name, _)| *name == PIVOT_SCENARIO)
        .map(|(_, rate)| *rate)
        .unwrap_or(Decimal::ZERO);
    let pivot_need = scenario_impacts
        .get(PIVOT_SCENARIO)
        .copied()
        .unwrap_or(Decimal::ZERO);

    let mut elasticities = BTreeMap::new();
    for (name, rate) in ELASTICITY_SCENARIOS {
        if name == PIVOT_SCENARIO {
            continue;
        }
        let elasticity = if pivot_rate.is_zero() || pivot_need.is_zero() {
            Decimal::ZERO
        } else {
            let rate_change = (rate - pivot_rate) / pivot_rate;
            let need = scenario_impacts.get(name).copied().unwrap_or(Decimal::ZERO);
            let impact_change = (need - pivot_need) / pivot_need;
            if rate_change.is_zero() {
                Decimal::ZERO
            } else {
                impact_change / rate_change
            }
        };
        elasticities.insert(name.to_string(), elasticity);
    }

    ElasticityAnalysis {
        pivot_scenario: PIVOT_SCENARIO.to_string(),
        pivot_growth_rate: pivot_rate,
        pivot_accumulated_need: pivot_need,
        scenario_impacts,
        elasticities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::types::SectorKind;

    fn sample_profile() -> CompanyProfile {
        CompanyProfile {
            monthly_revenue: dec!(100_000),
            operating_margin: dec!(0.15),
            pmr: dec!(30),
            pmp: dec!(30),
            pme: dec!(30),
            cash_sales_pct: dec!(0.3),
            term_sales_pct: dec!(0.7),
            tax_rate: dec!(0.265),
            tax_credits: Decimal::ZERO,
            sector_kind: SectorKind::Commerce,
            growth_scenario: GrowthScenario::Moderate,
            custom_growth_rate: None,
        }
    }

    fn moderate_projection(start: i32, end: i32) -> ProjectionResult {
        project_temporal(
            &sample_profile(),
            start,
            end,
            GrowthScenario::Moderate,
            None,
            None,
            &SimulationParameters::default(),
        )
        .unwrap()
        .result
    }

    #[test]
    fn test_horizon_is_a_closed_interval() {
        let result = moderate_projection(2026, 2028);
        assert_eq!(result.years.len(), 3);
        assert_eq!(result.years[0].year, 2026);
        assert_eq!(result.years[2].year, 2028);
    }

    #[test]
    fn test_revenue_compounds_on_prior_year() {
        let result = moderate_projection(2026, 2028);
        assert_eq!(result.years[0].monthly_revenue, dec!(100_000));
        assert_eq!(result.years[1].monthly_revenue, dec!(105_000));
        // 100_000 × 1.05², compounded on the prior year, not the baseline
        assert_eq!(
            result.years[2].monthly_revenue,
            dec!(100_000) * dec!(1.05) * dec!(1.05)
        );
    }

    #[test]
    fn test_totals_accumulate_each_year() {
        let result = moderate_projection(2026, 2028);
        let need_sum: Decimal = result.years.iter().map(|y| y.financing_need).sum();
        let cost_sum: Decimal = result
            .years
            .iter()
            .map(|y| y.annual_financing_cost)
            .sum();

        assert_eq!(result.totals.accumulated_financing_need, need_sum);
        assert_eq!(result.totals.accumulated_financing_cost, cost_sum);
    }

    #[test]
    fn test_average_margin_erosion_uses_inclusive_count() {
        let result = moderate_projection(2026, 2028);
        let erosion_sum: Decimal = result.years.iter().map(|y| y.margin_erosion_pp).sum();
        assert_eq!(
            result.totals.average_margin_erosion_pp,
            erosion_sum / dec!(3)
        );
    }

    #[test]
    fn test_single_year_horizon() {
        let result = moderate_projection(2026, 2026);
        assert_eq!(result.years.len(), 1);
        assert_eq!(
            result.totals.accumulated_financing_need,
            result.years[0].financing_need
        );
    }

    #[test]
    fn test_invalid_year_range_is_rejected() {
        let err = project_temporal(
            &sample_profile(),
            2028,
            2026,
            GrowthScenario::Moderate,
            None,
            None,
            &SimulationParameters::default(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_custom_scenario_without_rate_warns_and_uses_moderate() {
        let output = project_temporal(
            &sample_profile(),
            2026,
            2027,
            GrowthScenario::Custom,
            None,
            None,
            &SimulationParameters::default(),
        )
        .unwrap();

        assert_eq!(output.result.growth_rate, dec!(0.05));
        assert!(!output.warnings.is_empty());
    }

    #[test]
    fn test_elasticity_map_excludes_pivot() {
        let result = moderate_projection(2026, 2028);
        let elasticity = &result.elasticity;

        assert_eq!(elasticity.pivot_scenario, "Moderate");
        assert!(!elasticity.elasticities.contains_key("Moderate"));
        assert_eq!(elasticity.elasticities.len(), 5);
        assert_eq!(elasticity.scenario_impacts.len(), 6);
        for name in ["Recession", "Stagnation", "Conservative", "Optimistic", "Accelerated"] {
            assert!(elasticity.elasticities.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn test_higher_growth_accumulates_more_impact() {
        let result = moderate_projection(2026, 2030);
        let impacts = &result.elasticity.scenario_impacts;
        assert!(impacts["Accelerated"] > impacts["Moderate"]);
        assert!(impacts["Moderate"] > impacts["Recession"]);
    }

    #[test]
    fn test_elasticity_is_positive_for_growth_scenarios() {
        let result = moderate_projection(2026, 2030);
        // Impact rises with growth, so elasticity vs the pivot is positive
        assert!(result.elasticity.elasticities["Optimistic"] > Decimal::ZERO);
        assert!(result.elasticity.elasticities["Recession"] > Decimal::ZERO);
    }
}
