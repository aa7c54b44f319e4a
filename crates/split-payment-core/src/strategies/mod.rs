pub mod payment_incentive;
pub mod price_adjustment;
pub mod product_mix;
pub mod receivables_anticipation;
pub mod term_renegotiation;
pub mod working_capital_financing;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{ImplementationSchedule, SimulationParameters};
use crate::impact::{compute_impact_inner, ImpactResult};
use crate::types::{
    with_metadata, CalculationTrace, CompanyProfile, ComputationOutput, Days, Money,
};
use crate::SplitPaymentResult;

pub use payment_incentive::PaymentIncentiveConfig;
pub use price_adjustment::PriceAdjustmentConfig;
pub use product_mix::{MixFocus, ProductMixConfig};
pub use receivables_anticipation::ReceivablesAnticipationConfig;
pub use term_renegotiation::TermRenegotiationConfig;
pub use working_capital_financing::WorkingCapitalFinancingConfig;

// ---------------------------------------------------------------------------
// Common types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    PriceAdjustment,
    TermRenegotiation,
    ReceivablesAnticipation,
    WorkingCapitalFinancing,
    ProductMixShift,
    PaymentIncentive,
}

/// Evaluated effect of a single mitigation strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyOutcome {
    pub kind: StrategyKind,
    /// Recurring monthly cash-flow effect (zero for one-time injections)
    pub monthly_benefit: Money,
    /// Total offsetting amount over the evaluation horizon
    pub mitigated_amount: Money,
    /// mitigated ÷ |capital delta| × 100. Not clamped at the single-strategy
    /// level; values above 100 are meaningful to the optimizer.
    pub effectiveness_pct: Decimal,
    /// Total cost over the evaluation horizon
    pub cost: Money,
    /// cost ÷ mitigated amount; absent when the division is degenerate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_benefit_ratio: Option<Decimal>,
    /// Change to average receivables days (negative = faster collection)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmr_delta_days: Option<Days>,
    /// Change to average payables days (positive = later payment)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmp_delta_days: Option<Days>,
    /// Change to operating margin in percentage points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_delta_pp: Option<Decimal>,
    pub trace: CalculationTrace,
}

/// Tagged result of one strategy evaluation. Invalid configurations yield
/// the `Rejected` sentinel with zero effectiveness rather than an error, so
/// callers can detect them without exception handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StrategyEvaluation {
    Evaluated(StrategyOutcome),
    Rejected { kind: StrategyKind, reason: String },
}

impl StrategyEvaluation {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyEvaluation::Evaluated(outcome) => outcome.kind,
            StrategyEvaluation::Rejected { kind, .. } => *kind,
        }
    }

    pub fn effectiveness_pct(&self) -> Decimal {
        match self {
            StrategyEvaluation::Evaluated(outcome) => outcome.effectiveness_pct,
            StrategyEvaluation::Rejected { .. } => Decimal::ZERO,
        }
    }

    pub fn outcome(&self) -> Option<&StrategyOutcome> {
        match self {
            StrategyEvaluation::Evaluated(outcome) => Some(outcome),
            StrategyEvaluation::Rejected { .. } => None,
        }
    }
}

/// Configurations for every strategy the caller wants evaluated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyPortfolio {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_adjustment: Option<PriceAdjustmentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_renegotiation: Option<TermRenegotiationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receivables_anticipation: Option<ReceivablesAnticipationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_capital_financing: Option<WorkingCapitalFinancingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_mix: Option<ProductMixConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_incentive: Option<PaymentIncentiveConfig>,
}

/// All strategy evaluations against one base impact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySetResult {
    pub year: i32,
    /// |capital delta| the strategies are evaluated against
    pub base_impact: Money,
    pub evaluations: Vec<StrategyEvaluation>,
    pub trace: CalculationTrace,
}

// ---------------------------------------------------------------------------
// Shared arithmetic
// ---------------------------------------------------------------------------

pub(crate) fn effectiveness_pct(mitigated: Money, base_impact: Money) -> Decimal {
    if base_impact.is_zero() {
        return Decimal::ZERO;
    }
    mitigated / base_impact * dec!(100)
}

pub(crate) fn cost_benefit(cost: Money, mitigated: Money) -> Option<Decimal> {
    if mitigated <= Decimal::ZERO {
        return None;
    }
    Some(cost / mitigated)
}

// ---------------------------------------------------------------------------
// Portfolio evaluation
// ---------------------------------------------------------------------------

/// Evaluate each configured strategy independently against the impact for
/// `year`. Strategies never see each other's outputs.
pub fn evaluate_strategies(
    profile: &CompanyProfile,
    portfolio: &StrategyPortfolio,
    year: i32,
    sector_override: Option<&ImplementationSchedule>,
    params: &SimulationParameters,
) -> SplitPaymentResult<ComputationOutput<StrategySetResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let impact = compute_impact_inner(profile, year, sector_override, params, &mut warnings);
    let evaluations = evaluate_portfolio(profile, portfolio, &impact, params);

    if evaluations.is_empty() {
        warnings.push("No strategy configured; nothing evaluated.".to_string());
    }
    for evaluation in &evaluations {
        if let StrategyEvaluation::Rejected { kind, reason } = evaluation {
            warnings.push(format!("{kind:?} rejected: {reason}"));
        }
    }

    let base_impact = impact.capital_delta.abs();
    let mut trace = CalculationTrace::new();
    trace.push(
        "Base impact",
        format!("|capital delta| for {year} = {base_impact}"),
    );
    trace.push(
        "Strategies evaluated",
        format!("{} configured", evaluations.len()),
    );

    let result = StrategySetResult {
        year,
        base_impact,
        evaluations,
        trace,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mitigation Strategy Evaluation",
        &serde_json::json!({
            "year": year,
            "strategy_horizon_months": params.strategy_horizon_months,
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Envelope-free evaluation shared with the combination optimizer.
pub(crate) fn evaluate_portfolio(
    profile: &CompanyProfile,
    portfolio: &StrategyPortfolio,
    impact: &ImpactResult,
    params: &SimulationParameters,
) -> Vec<StrategyEvaluation> {
    let mut evaluations = Vec::new();

    if let Some(config) = &portfolio.price_adjustment {
        evaluations.push(price_adjustment::evaluate(profile, config, impact, params));
    }
    if let Some(config) = &portfolio.term_renegotiation {
        evaluations.push(term_renegotiation::evaluate(profile, config, impact, params));
    }
    if let Some(config) = &portfolio.receivables_anticipation {
        evaluations.push(receivables_anticipation::evaluate(
            profile, config, impact, params,
        ));
    }
    if let Some(config) = &portfolio.working_capital_financing {
        evaluations.push(working_capital_financing::evaluate(
            profile, config, impact, params,
        ));
    }
    if let Some(config) = &portfolio.product_mix {
        evaluations.push(product_mix::evaluate(profile, config, impact, params));
    }
    if let Some(config) = &portfolio.payment_incentive {
        evaluations.push(payment_incentive::evaluate(profile, config, impact, params));
    }

    evaluations
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::types::{GrowthScenario, SectorKind};

    pub fn sample_profile() -> CompanyProfile {
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

    pub fn sample_impact(year: i32) -> ImpactResult {
        let params = SimulationParameters::default();
        let mut warnings = Vec::new();
        compute_impact_inner(&sample_profile(), year, None, &params, &mut warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use test_support::sample_profile;

    #[test]
    fn test_effectiveness_guard_on_zero_base() {
        assert_eq!(effectiveness_pct(dec!(100), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(effectiveness_pct(dec!(50), dec!(200)), dec!(25));
    }

    #[test]
    fn test_cost_benefit_degenerate_division() {
        assert_eq!(cost_benefit(dec!(10), Decimal::ZERO), None);
        assert_eq!(cost_benefit(dec!(10), dec!(-5)), None);
        assert_eq!(cost_benefit(dec!(10), dec!(40)), Some(dec!(0.25)));
    }

    #[test]
    fn test_empty_portfolio_evaluates_nothing() {
        let params = SimulationParameters::default();
        let output = evaluate_strategies(
            &sample_profile(),
            &StrategyPortfolio::default(),
            2027,
            None,
            &params,
        )
        .unwrap();

        assert!(output.result.evaluations.is_empty());
        assert!(!output.warnings.is_empty());
    }

    #[test]
    fn test_full_portfolio_evaluates_six_strategies() {
        let params = SimulationParameters::default();
        let portfolio = StrategyPortfolio {
            price_adjustment: Some(PriceAdjustmentConfig {
                price_increase: dec!(0.05),
                demand_elasticity: dec!(-1.2),
            }),
            term_renegotiation: Some(TermRenegotiationConfig {
                additional_days: dec!(15),
                supplier_participation: dec!(0.6),
                counterparty_cost_rate: dec!(0.01),
            }),
            receivables_anticipation: Some(ReceivablesAnticipationConfig {
                anticipation_pct: dec!(0.5),
                advance_days: dec!(20),
                monthly_discount_rate: dec!(0.018),
            }),
            working_capital_financing: Some(WorkingCapitalFinancingConfig {
                coverage_pct: dec!(1.0),
                monthly_rate: dec!(0.021),
                term_months: 12,
                grace_months: 3,
            }),
            product_mix: Some(ProductMixConfig {
                reallocation_pct: dec!(0.2),
                revenue_delta_pct: dec!(0.1),
                margin_delta: dec!(0.03),
                focus: MixFocus::Cycle,
                implementation_cost: dec!(5000),
            }),
            payment_incentive: Some(PaymentIncentiveConfig {
                cash_share: dec!(0.5),
                d30_share: dec!(0.3),
                d60_share: dec!(0.15),
                d90_share: dec!(0.05),
                incentive_rate: dec!(0.03),
            }),
        };

        let output =
            evaluate_strategies(&sample_profile(), &portfolio, 2027, None, &params).unwrap();
        assert_eq!(output.result.evaluations.len(), 6);
        assert_eq!(output.result.base_impact, dec!(6625));
    }
}
