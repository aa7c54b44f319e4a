use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::SimulationParameters;
use crate::impact::ImpactResult;
use crate::types::{CalculationTrace, CompanyProfile, Rate};

use super::{cost_benefit, effectiveness_pct, StrategyEvaluation, StrategyKind, StrategyOutcome};

/// Tolerance for the distribution sum, in fraction points (±1pp).
const DISTRIBUTION_TOLERANCE: Decimal = dec!(0.01);

/// Offer a discount to move customers into faster payment buckets.
///
/// The target distribution (cash / 30 / 60 / 90 days) must sum to 100%
/// within ±1pp or the evaluation is rejected with zero effectiveness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIncentiveConfig {
    pub cash_share: Rate,
    pub d30_share: Rate,
    pub d60_share: Rate,
    pub d90_share: Rate,
    /// Discount granted on the incremental cash sales
    pub incentive_rate: Rate,
}

impl PaymentIncentiveConfig {
    fn distribution_sum(&self) -> Rate {
        self.cash_share + self.d30_share + self.d60_share + self.d90_share
    }

    /// Blended receivables delay implied by the target distribution.
    fn blended_pmr(&self) -> Decimal {
        dec!(30) * self.d30_share + dec!(60) * self.d60_share + dec!(90) * self.d90_share
    }
}

pub fn evaluate(
    profile: &CompanyProfile,
    config: &PaymentIncentiveConfig,
    impact: &ImpactResult,
    params: &SimulationParameters,
) -> StrategyEvaluation {
    let sum = config.distribution_sum();
    if (sum - Decimal::ONE).abs() > DISTRIBUTION_TOLERANCE {
        return StrategyEvaluation::Rejected {
            kind: StrategyKind::PaymentIncentive,
            reason: format!(
                "Payment distribution must sum to 100% (got {}%).",
                sum * dec!(100)
            ),
        };
    }

    let horizon = Decimal::from(params.strategy_horizon_months);
    let revenue = profile.monthly_revenue;

    // Cash sales carry no receivables delay in either distribution
    let current_blended_pmr = profile.term_sales_pct * profile.pmr;
    let new_blended_pmr = config.blended_pmr();
    let pmr_gain_days = current_blended_pmr - new_blended_pmr;

    let monthly_flow_gain = revenue * pmr_gain_days / dec!(30);

    let incremental_cash_share = (config.cash_share - profile.cash_sales_pct).max(Decimal::ZERO);
    let monthly_incentive_cost = incremental_cash_share * revenue * config.incentive_rate;

    let monthly_benefit = monthly_flow_gain - monthly_incentive_cost;
    let mitigated = monthly_benefit * horizon;
    let cost = monthly_incentive_cost * horizon;

    let mut trace = CalculationTrace::new();
    trace.push(
        "Blended receivables delay",
        format!("{current_blended_pmr} days → {new_blended_pmr} days"),
    );
    trace.push(
        "Cash-flow gain",
        format!("{monthly_flow_gain} per month from {pmr_gain_days} days"),
    );
    trace.push(
        "Incentive cost",
        format!(
            "{} incremental cash share × {} rate = {} per month",
            incremental_cash_share, config.incentive_rate, monthly_incentive_cost
        ),
    );

    StrategyEvaluation::Evaluated(StrategyOutcome {
        kind: StrategyKind::PaymentIncentive,
        monthly_benefit,
        mitigated_amount: mitigated,
        effectiveness_pct: effectiveness_pct(mitigated, impact.capital_delta.abs()),
        cost,
        cost_benefit_ratio: cost_benefit(cost, mitigated),
        pmr_delta_days: Some(new_blended_pmr - current_blended_pmr),
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

    fn valid_config() -> PaymentIncentiveConfig {
        PaymentIncentiveConfig {
            cash_share: dec!(0.5),
            d30_share: dec!(0.3),
            d60_share: dec!(0.15),
            d90_share: dec!(0.05),
            incentive_rate: dec!(0.03),
        }
    }

    #[test]
    fn test_valid_distribution_is_evaluated() {
        let params = SimulationParameters::default();
        let evaluation = evaluate(&sample_profile(), &valid_config(), &sample_impact(2027), &params);
        let outcome = evaluation.outcome().unwrap();

        // current blended: 0.7 × 30 = 21 days; new: 9 + 9 + 4.5 = 22.5 days
        assert_eq!(outcome.pmr_delta_days, Some(dec!(1.5)));
    }

    #[test]
    fn test_distribution_summing_to_96_percent_is_rejected() {
        let params = SimulationParameters::default();
        let config = PaymentIncentiveConfig {
            cash_share: dec!(0.5),
            d30_share: dec!(0.3),
            d60_share: dec!(0.15),
            d90_share: dec!(0.01),
            incentive_rate: dec!(0.03),
        };
        let evaluation = evaluate(&sample_profile(), &config, &sample_impact(2027), &params);

        match &evaluation {
            StrategyEvaluation::Rejected { kind, reason } => {
                assert_eq!(*kind, StrategyKind::PaymentIncentive);
                assert!(reason.contains("100%"));
            }
            StrategyEvaluation::Evaluated(_) => panic!("expected rejection"),
        }
        assert_eq!(evaluation.effectiveness_pct(), Decimal::ZERO);
    }

    #[test]
    fn test_distribution_within_tolerance_is_accepted() {
        let params = SimulationParameters::default();
        let config = PaymentIncentiveConfig {
            cash_share: dec!(0.5),
            d30_share: dec!(0.3),
            d60_share: dec!(0.15),
            d90_share: dec!(0.042),
            incentive_rate: dec!(0.03),
        };
        let evaluation = evaluate(&sample_profile(), &config, &sample_impact(2027), &params);
        assert!(evaluation.outcome().is_some());
    }

    #[test]
    fn test_incentive_cost_on_incremental_cash_only() {
        let params = SimulationParameters::default();
        let evaluation = evaluate(&sample_profile(), &valid_config(), &sample_impact(2027), &params);
        let outcome = evaluation.outcome().unwrap();

        // (0.5 − 0.3) × 100_000 × 0.03 = 600 per month
        assert_eq!(outcome.cost, dec!(600) * dec!(12));
    }

    #[test]
    fn test_faster_distribution_yields_positive_gain() {
        let params = SimulationParameters::default();
        let config = PaymentIncentiveConfig {
            cash_share: dec!(0.6),
            d30_share: dec!(0.4),
            d60_share: Decimal::ZERO,
            d90_share: Decimal::ZERO,
            incentive_rate: dec!(0.02),
        };
        let evaluation = evaluate(&sample_profile(), &config, &sample_impact(2027), &params);
        let outcome = evaluation.outcome().unwrap();

        // new blended delay 12 days vs current 21: strong gain
        assert!(outcome.monthly_benefit > Decimal::ZERO);
        assert!(outcome.pmr_delta_days.unwrap() < Decimal::ZERO);
    }
}
