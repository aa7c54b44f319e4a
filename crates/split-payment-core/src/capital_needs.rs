use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{FinancingProduct, ImplementationSchedule, SimulationParameters};
use crate::impact::compute_impact_inner;
use crate::types::{
    with_metadata, CalculationTrace, CompanyProfile, ComputationOutput, Money,
};
use crate::SplitPaymentResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Financing requirement derived from the impact delta, with each adjustment
/// factor reported separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalNeedResult {
    pub year: i32,
    /// |capital delta| before any adjustment
    pub base_need: Money,
    pub safety_margin_factor: Decimal,
    /// Placeholder constant, not a seasonal model
    pub seasonality_factor: Decimal,
    /// Compound growth to the target year: (1 + g)^(year − rollout start)
    pub growth_factor: Decimal,
    /// base × safety × seasonality × growth
    pub total_need: Money,
    /// Every product quote, sorted ascending by total cost
    pub options: Vec<FinancingQuote>,
    /// Cheapest option (ties resolved by menu order)
    pub recommended: Option<FinancingQuote>,
    pub trace: CalculationTrace,
}

/// One financing product evaluated against the total need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingQuote {
    pub product: FinancingProduct,
    /// min(total need, product cap)
    pub approved_amount: Money,
    pub monthly_cost: Money,
    /// monthly cost × (term − grace)
    pub total_cost: Money,
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Convert the impact delta for `year` into an adjusted financing need and
/// rank the external financing menu by total cost.
pub fn compute_capital_need(
    profile: &CompanyProfile,
    year: i32,
    sector_override: Option<&ImplementationSchedule>,
    params: &SimulationParameters,
) -> SplitPaymentResult<ComputationOutput<CapitalNeedResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let impact = compute_impact_inner(profile, year, sector_override, params, &mut warnings);
    let base_need = impact.capital_delta.abs();

    let growth_rate = profile.annual_growth_rate();
    let years_out = i64::from((year - params.rollout_start_year).max(0));
    let growth_factor = (Decimal::ONE + growth_rate).powi(years_out);

    let total_need = base_need * params.safety_margin * params.seasonality_factor * growth_factor;

    let mut options: Vec<FinancingQuote> = params
        .financing_menu
        .iter()
        .map(|product| quote(product, total_need))
        .collect();
    options.sort_by(|a, b| a.total_cost.cmp(&b.total_cost));

    let recommended = options.first().cloned();
    if recommended
        .as_ref()
        .map(|quote| quote.approved_amount < total_need)
        .unwrap_or(false)
    {
        warnings.push("Recommended product cap does not cover the full need.".to_string());
    }

    let mut trace = CalculationTrace::new();
    trace.push("Base need", format!("|capital delta| = {base_need}"));
    trace.push(
        "Adjustments",
        format!(
            "safety {} × seasonality {} × growth {} ({} years at {})",
            params.safety_margin, params.seasonality_factor, growth_factor, years_out, growth_rate
        ),
    );
    trace.push("Total need", format!("{total_need}"));
    if let Some(best) = &recommended {
        trace.push(
            "Recommended product",
            format!(
                "{} — approved {}, total cost {}",
                best.product.name, best.approved_amount, best.total_cost
            ),
        );
    }

    let result = CapitalNeedResult {
        year,
        base_need,
        safety_margin_factor: params.safety_margin,
        seasonality_factor: params.seasonality_factor,
        growth_factor,
        total_need,
        options,
        recommended,
        trace,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capital Need and Financing Options",
        &serde_json::json!({
            "year": year,
            "growth_rate": growth_rate,
            "safety_margin": params.safety_margin,
            "seasonality_factor": params.seasonality_factor,
        }),
        warnings,
        elapsed,
        result,
    ))
}

fn quote(product: &FinancingProduct, need: Money) -> FinancingQuote {
    let approved = need.min(product.cap);
    let monthly_cost = approved * product.monthly_rate;
    let paying_months = Decimal::from(product.term_months.saturating_sub(product.grace_months));
    FinancingQuote {
        product: product.clone(),
        approved_amount: approved,
        monthly_cost,
        total_cost: monthly_cost * paying_months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::config::default_financing_menu;
    use crate::types::{GrowthScenario, SectorKind};

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

    #[test]
    fn test_factors_reported_and_multiplied() {
        let params = SimulationParameters::default();
        let result = compute_capital_need(&sample_profile(), 2026, None, &params).unwrap();
        let need = &result.result;

        assert_eq!(need.base_need, dec!(2650));
        assert_eq!(need.safety_margin_factor, dec!(1.2));
        assert_eq!(need.seasonality_factor, dec!(1.3));
        // 2026 is the rollout start: no growth compounding yet
        assert_eq!(need.growth_factor, Decimal::ONE);
        assert_eq!(need.total_need, dec!(2650) * dec!(1.2) * dec!(1.3));
    }

    #[test]
    fn test_growth_factor_compounds_to_target_year() {
        let params = SimulationParameters::default();
        let result = compute_capital_need(&sample_profile(), 2028, None, &params).unwrap();
        // Moderate scenario: (1.05)^2
        assert_eq!(result.result.growth_factor, dec!(1.05) * dec!(1.05));
    }

    #[test]
    fn test_options_sorted_by_total_cost_with_cheapest_recommended() {
        let params = SimulationParameters::default();
        let result = compute_capital_need(&sample_profile(), 2026, None, &params).unwrap();
        let need = &result.result;

        assert_eq!(need.options.len(), 3);
        for pair in need.options.windows(2) {
            assert!(pair[0].total_cost <= pair[1].total_cost);
        }
        let best = need.recommended.as_ref().unwrap();
        assert_eq!(best.total_cost, need.options[0].total_cost);
        // 1.8%/mo over 12 months beats both loan products at this scale
        assert_eq!(best.product.name, "Receivables-anticipation facility");
    }

    #[test]
    fn test_approved_amount_capped_by_product_limit() {
        let mut params = SimulationParameters::default();
        params.financing_menu = default_financing_menu();
        params.financing_menu[0].cap = dec!(1000);

        let result = compute_capital_need(&sample_profile(), 2026, None, &params).unwrap();
        let capped = result
            .result
            .options
            .iter()
            .find(|quote| quote.product.name == "Working-capital loan")
            .unwrap();
        assert_eq!(capped.approved_amount, dec!(1000));
    }

    #[test]
    fn test_total_cost_excludes_grace_period() {
        let product = FinancingProduct {
            name: "Test loan".to_string(),
            monthly_rate: dec!(0.02),
            term_months: 12,
            grace_months: 4,
            cap: dec!(1_000_000),
        };
        let quote = quote(&product, dec!(10_000));
        assert_eq!(quote.monthly_cost, dec!(200));
        assert_eq!(quote.total_cost, dec!(200) * dec!(8));
    }

    #[test]
    fn test_zero_delta_yields_zero_need() {
        let params = SimulationParameters::default();
        let mut profile = sample_profile();
        profile.tax_credits = dec!(1_000_000);
        let result = compute_capital_need(&profile, 2026, None, &params).unwrap();
        assert_eq!(result.result.total_need, Decimal::ZERO);
    }
}
