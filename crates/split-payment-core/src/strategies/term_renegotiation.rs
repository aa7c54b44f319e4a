use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::SimulationParameters;
use crate::impact::ImpactResult;
use crate::types::{CalculationTrace, CompanyProfile, Days, Rate};

use super::{cost_benefit, effectiveness_pct, StrategyEvaluation, StrategyKind, StrategyOutcome};

/// Share of cost base assumed to be supplier payments open to renegotiation.
const SUPPLIER_PAYMENT_SHARE: Decimal = dec!(0.70);

/// Negotiate longer payment terms with suppliers, holding cash longer at the
/// price of a counterparty surcharge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermRenegotiationConfig {
    /// Extra days of payment term sought
    pub additional_days: Days,
    /// Fraction of suppliers expected to accept
    pub supplier_participation: Rate,
    /// Surcharge the accepting suppliers price in, as a fraction of the
    /// affected payments per 30 days of extension
    pub counterparty_cost_rate: Rate,
}

pub fn evaluate(
    profile: &CompanyProfile,
    config: &TermRenegotiationConfig,
    impact: &ImpactResult,
    params: &SimulationParameters,
) -> StrategyEvaluation {
    let horizon = Decimal::from(params.strategy_horizon_months);
    let thirty = dec!(30);

    let supplier_payments =
        SUPPLIER_PAYMENT_SHARE * profile.monthly_revenue * (Decimal::ONE - profile.operating_margin);
    let affected_payments = supplier_payments * config.supplier_participation;

    let effective_shift_days = config.additional_days
        * config.supplier_participation
        * (Decimal::ONE - config.counterparty_cost_rate);

    let monthly_benefit = supplier_payments * effective_shift_days / thirty;
    let mitigated = monthly_benefit * horizon;

    let monthly_cost =
        affected_payments * (config.additional_days / thirty) * config.counterparty_cost_rate;
    let cost = monthly_cost * horizon;

    let pmp_delta = config.additional_days * config.supplier_participation;
    let adjusted_pmp = profile.pmp + pmp_delta;

    let mut trace = CalculationTrace::new();
    trace.push(
        "Supplier payments",
        format!("70% of cost base = {supplier_payments} per month"),
    );
    trace.push(
        "Effective shift",
        format!(
            "{} days × {} participation × (1 − {}) = {} days",
            config.additional_days,
            config.supplier_participation,
            config.counterparty_cost_rate,
            effective_shift_days
        ),
    );
    trace.push(
        "Adjusted payables cycle",
        format!("PMP {} → {}", profile.pmp, adjusted_pmp),
    );

    StrategyEvaluation::Evaluated(StrategyOutcome {
        kind: StrategyKind::TermRenegotiation,
        monthly_benefit,
        mitigated_amount: mitigated,
        effectiveness_pct: effectiveness_pct(mitigated, impact.capital_delta.abs()),
        cost,
        cost_benefit_ratio: cost_benefit(cost, mitigated),
        pmr_delta_days: None,
        pmp_delta_days: Some(pmp_delta),
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
    fn test_benefit_scales_with_shifted_days() {
        let params = SimulationParameters::default();
        let config = TermRenegotiationConfig {
            additional_days: dec!(15),
            supplier_participation: dec!(0.6),
            counterparty_cost_rate: dec!(0.01),
        };
        let evaluation = evaluate(&sample_profile(), &config, &sample_impact(2027), &params);
        let outcome = evaluation.outcome().unwrap();

        // payments = 0.7 × 100_000 × 0.85 = 59_500
        // shift = 15 × 0.6 × 0.99 = 8.91 days
        let expected_monthly = dec!(59_500) * dec!(8.91) / dec!(30);
        assert_eq!(outcome.monthly_benefit, expected_monthly);
        assert_eq!(outcome.pmp_delta_days, Some(dec!(9.0)));
    }

    #[test]
    fn test_cost_charged_on_affected_payments_only() {
        let params = SimulationParameters::default();
        let config = TermRenegotiationConfig {
            additional_days: dec!(30),
            supplier_participation: dec!(0.5),
            counterparty_cost_rate: dec!(0.02),
        };
        let evaluation = evaluate(&sample_profile(), &config, &sample_impact(2027), &params);
        let outcome = evaluation.outcome().unwrap();

        // affected = 59_500 × 0.5; one 30-day period at 2%
        let expected_cost = dec!(29_750) * dec!(0.02) * dec!(12);
        assert_eq!(outcome.cost, expected_cost);
    }

    #[test]
    fn test_no_participation_means_no_effect() {
        let params = SimulationParameters::default();
        let config = TermRenegotiationConfig {
            additional_days: dec!(20),
            supplier_participation: Decimal::ZERO,
            counterparty_cost_rate: dec!(0.01),
        };
        let evaluation = evaluate(&sample_profile(), &config, &sample_impact(2027), &params);
        let outcome = evaluation.outcome().unwrap();

        assert_eq!(outcome.monthly_benefit, Decimal::ZERO);
        assert_eq!(outcome.effectiveness_pct, Decimal::ZERO);
        assert_eq!(outcome.cost_benefit_ratio, None);
    }
}
