use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::SimulationParameters;
use crate::impact::ImpactResult;
use crate::types::{CalculationTrace, CompanyProfile, Days, Rate};

use super::{cost_benefit, effectiveness_pct, StrategyEvaluation, StrategyKind, StrategyOutcome};

/// Sell a share of term receivables to a discounter to pull collection
/// forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivablesAnticipationConfig {
    /// Fraction of term sales anticipated
    pub anticipation_pct: Rate,
    /// Days the collection is pulled forward
    pub advance_days: Days,
    /// Monthly discount rate charged by the facility
    pub monthly_discount_rate: Rate,
}

pub fn evaluate(
    profile: &CompanyProfile,
    config: &ReceivablesAnticipationConfig,
    impact: &ImpactResult,
    params: &SimulationParameters,
) -> StrategyEvaluation {
    let horizon = Decimal::from(params.strategy_horizon_months);

    let term_sales = profile.monthly_revenue * profile.term_sales_pct;
    let anticipated = term_sales * config.anticipation_pct;

    // Discount prorated by how far ahead of maturity the cash arrives
    let monthly_discount =
        anticipated * config.monthly_discount_rate * config.advance_days / dec!(30);
    let monthly_benefit = anticipated - monthly_discount;
    let mitigated = monthly_benefit * horizon;
    let cost = monthly_discount * horizon;

    let pmr_delta = -(profile.pmr * config.anticipation_pct);

    let mut trace = CalculationTrace::new();
    trace.push(
        "Anticipated receivables",
        format!(
            "{} term sales × {} = {} per month",
            term_sales, config.anticipation_pct, anticipated
        ),
    );
    trace.push(
        "Discount cost",
        format!(
            "{} × {} × {}/30 = {} per month",
            anticipated, config.monthly_discount_rate, config.advance_days, monthly_discount
        ),
    );
    trace.push(
        "Effective PMR",
        format!("{} → {}", profile.pmr, profile.pmr + pmr_delta),
    );

    StrategyEvaluation::Evaluated(StrategyOutcome {
        kind: StrategyKind::ReceivablesAnticipation,
        monthly_benefit,
        mitigated_amount: mitigated,
        effectiveness_pct: effectiveness_pct(mitigated, impact.capital_delta.abs()),
        cost,
        cost_benefit_ratio: cost_benefit(cost, mitigated),
        pmr_delta_days: Some(pmr_delta),
        pmp_delta_days: None,
        margin_delta_pp: None,
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::strategies::test_support::{sample_impact, sample_profile};

    #[test]
    fn test_net_benefit_is_anticipated_minus_discount() {
        let params = SimulationParameters::default();
        let config = ReceivablesAnticipationConfig {
            anticipation_pct: dec!(0.5),
            advance_days: dec!(20),
            monthly_discount_rate: dec!(0.018),
        };
        let evaluation = evaluate(&sample_profile(), &config, &sample_impact(2027), &params);
        let outcome = evaluation.outcome().unwrap();

        // anticipated = 70_000 × 0.5 = 35_000
        // discount = 35_000 × 0.018 × 20/30 = 420
        assert_eq!(outcome.monthly_benefit, dec!(35_000) - dec!(420));
        assert_eq!(outcome.cost, dec!(420) * dec!(12));
    }

    #[test]
    fn test_pmr_reduced_proportionally() {
        let params = SimulationParameters::default();
        let config = ReceivablesAnticipationConfig {
            anticipation_pct: dec!(0.4),
            advance_days: dec!(15),
            monthly_discount_rate: dec!(0.02),
        };
        let evaluation = evaluate(&sample_profile(), &config, &sample_impact(2027), &params);
        let outcome = evaluation.outcome().unwrap();

        assert_eq!(outcome.pmr_delta_days, Some(dec!(-12.0)));
    }

    #[test]
    fn test_effectiveness_can_exceed_one_hundred() {
        let params = SimulationParameters::default();
        let config = ReceivablesAnticipationConfig {
            anticipation_pct: dec!(1.0),
            advance_days: dec!(30),
            monthly_discount_rate: dec!(0.018),
        };
        let evaluation = evaluate(&sample_profile(), &config, &sample_impact(2027), &params);
        let outcome = evaluation.outcome().unwrap();

        // Anticipating all term sales dwarfs the 2027 delta; the raw
        // percentage is reported unclamped
        assert!(outcome.effectiveness_pct > dec!(100));
    }
}
