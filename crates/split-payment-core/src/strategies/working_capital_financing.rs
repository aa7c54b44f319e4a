use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::SimulationParameters;
use crate::impact::ImpactResult;
use crate::types::{CalculationTrace, CompanyProfile, Rate};

use super::{cost_benefit, StrategyEvaluation, StrategyKind, StrategyOutcome};

/// Borrow against the capital need: interest-only through the grace period,
/// then amortizing installments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingCapitalFinancingConfig {
    /// Fraction of the capital need borrowed
    pub coverage_pct: Rate,
    pub monthly_rate: Rate,
    pub term_months: u32,
    pub grace_months: u32,
}

pub fn evaluate(
    profile: &CompanyProfile,
    config: &WorkingCapitalFinancingConfig,
    impact: &ImpactResult,
    _params: &SimulationParameters,
) -> StrategyEvaluation {
    let need = impact.financing_need;
    let borrowed = need * config.coverage_pct;

    let grace_interest =
        borrowed * config.monthly_rate * Decimal::from(config.grace_months);

    let amortizing_months = config.term_months.saturating_sub(config.grace_months);
    let amortized_interest = if amortizing_months == 0 || borrowed.is_zero() {
        Decimal::ZERO
    } else if config.monthly_rate.is_zero() {
        Decimal::ZERO
    } else {
        let n = Decimal::from(amortizing_months);
        let factor = (Decimal::ONE + config.monthly_rate).powi(i64::from(amortizing_months));
        // Price-table installment
        let installment = borrowed * config.monthly_rate / (Decimal::ONE - Decimal::ONE / factor);
        installment * n - borrowed
    };

    let cost = grace_interest + amortized_interest;

    // Effectiveness is coverage of the need, not net of interest
    let effectiveness = if need.is_zero() {
        Decimal::ZERO
    } else {
        borrowed / need * dec!(100)
    };

    let margin_delta_pp = if profile.monthly_revenue.is_zero() {
        Decimal::ZERO
    } else {
        -(borrowed * config.monthly_rate / profile.monthly_revenue * dec!(100))
    };

    let mut trace = CalculationTrace::new();
    trace.push(
        "Borrowed",
        format!("{} need × {} coverage = {}", need, config.coverage_pct, borrowed),
    );
    trace.push(
        "Grace interest",
        format!(
            "{} months interest-only at {} = {}",
            config.grace_months, config.monthly_rate, grace_interest
        ),
    );
    trace.push(
        "Amortization interest",
        format!("{amortizing_months} installments: {amortized_interest}"),
    );

    StrategyEvaluation::Evaluated(StrategyOutcome {
        kind: StrategyKind::WorkingCapitalFinancing,
        // One-time injection, no recurring monthly effect
        monthly_benefit: Decimal::ZERO,
        mitigated_amount: borrowed,
        effectiveness_pct: effectiveness,
        cost,
        cost_benefit_ratio: cost_benefit(cost, borrowed),
        pmr_delta_days: None,
        pmp_delta_days: None,
        margin_delta_pp: Some(margin_delta_pp),
        trace,
    })
}
