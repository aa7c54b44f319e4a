use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::SimulationParameters;
use crate::impact::ImpactResult;
use crate::types::{CalculationTrace, CompanyProfile, Rate};

use super::{cost_benefit, effectiveness_pct, StrategyEvaluation, StrategyKind, StrategyOutcome};

/// Raise prices to recover margin, accepting the demand lost to elasticity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAdjustmentConfig {
    /// Price increase as a fraction (0.05 = +5%)
    pub price_increase: Rate,
    /// Price elasticity of demand, typically negative (−1.2 means a 1%
    /// price increase loses 1.2% of volume)
    pub demand_elasticity: Decimal,
}

pub fn evaluate(
    profile: &CompanyProfile,
    config: &PriceAdjustmentConfig,
    impact: &ImpactResult,
    params: &SimulationParameters,
) -> StrategyEvaluation {
    let revenue = profile.monthly_revenue;
    let horizon = Decimal::from(params.strategy_horizon_months);

    let price_factor = Decimal::ONE + config.price_increase;
    let demand_factor = Decimal::ONE + config.price_increase * config.demand_elasticity;

    let new_revenue = revenue * price_factor * demand_factor;
    let incremental_revenue = new_revenue - revenue;

    let monthly_benefit = incremental_revenue * profile.operating_margin;
    let mitigated = monthly_benefit * horizon;

    // Revenue sacrificed to the volume drop, at the raised price
    let lost_monthly = (revenue * price_factor * (Decimal::ONE - demand_factor)).max(Decimal::ZERO);
    let cost = lost_monthly * horizon;

    let margin_delta_pp = if revenue.is_zero() {
        Decimal::ZERO
    } else {
        monthly_benefit / revenue * dec!(100)
    };

    let mut trace = CalculationTrace::new();
    trace.push(
        "Price effect",
        format!(
            "revenue {} × (1 + {}) × (1 + {} × {}) = {}",
            revenue, config.price_increase, config.price_increase, config.demand_elasticity,
            new_revenue
        ),
    );
    trace.push(
        "Monthly benefit",
        format!("{incremental_revenue} incremental revenue × margin = {monthly_benefit}"),
    );
    trace.push("Volume lost to elasticity", format!("{lost_monthly} per month"));

    StrategyEvaluation::Evaluated(StrategyOutcome {
        kind: StrategyKind::PriceAdjustment,
        monthly_benefit,
        mitigated_amount: mitigated,
        effectiveness_pct: effectiveness_pct(mitigated, impact.capital_delta.abs()),
        cost,
        cost_benefit_ratio: cost_benefit(cost, mitigated),
        pmr_delta_days: None,
        pmp_delta_days: None,
        margin_delta_pp: Some(margin_delta_pp),
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::strategies::test_support::{sample_impact, sample_profile};

    #[test]
    fn test_mild_elasticity_yields_positive_benefit() {
        let params = SimulationParameters::default();
        let config = PriceAdjustmentConfig {
            price_increase: dec!(0.05),
            demand_elasticity: dec!(-0.5),
        };
        let evaluation = evaluate(&sample_profile(), &config, &sample_impact(2027), &params);
        let outcome = evaluation.outcome().unwrap();

        // new revenue = 100_000 × 1.05 × 0.975 = 102_375
        assert_eq!(outcome.monthly_benefit, dec!(2375) * dec!(0.15));
        assert_eq!(outcome.mitigated_amount, outcome.monthly_benefit * dec!(12));
        assert!(outcome.effectiveness_pct > Decimal::ZERO);
        assert!(outcome.cost_benefit_ratio.is_some());
    }

    #[test]
    fn test_strong_elasticity_turns_benefit_negative() {
        let params = SimulationParameters::default();
        let config = PriceAdjustmentConfig {
            price_increase: dec!(0.10),
            demand_elasticity: dec!(-3.0),
        };
        let evaluation = evaluate(&sample_profile(), &config, &sample_impact(2027), &params);
        let outcome = evaluation.outcome().unwrap();

        // 1.10 × 0.70 = 0.77: revenue shrinks
        assert!(outcome.monthly_benefit < Decimal::ZERO);
        assert!(outcome.effectiveness_pct < Decimal::ZERO);
        assert_eq!(outcome.cost_benefit_ratio, None);
    }

    #[test]
    fn test_cost_reflects_lost_volume_over_horizon() {
        let params = SimulationParameters::default();
        let config = PriceAdjustmentConfig {
            price_increase: dec!(0.05),
            demand_elasticity: dec!(-1.0),
        };
        let evaluation = evaluate(&sample_profile(), &config, &sample_impact(2027), &params);
        let outcome = evaluation.outcome().unwrap();

        // lost = 100_000 × 1.05 × 0.05 per month
        assert_eq!(outcome.cost, dec!(100_000) * dec!(1.05) * dec!(0.05) * dec!(12));
    }
}
