use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::SimulationParameters;
use crate::impact::ImpactResult;
use crate::types::{CalculationTrace, CompanyProfile, Money, Rate};

use super::{cost_benefit, effectiveness_pct, StrategyEvaluation, StrategyKind, StrategyOutcome};

/// What the reallocated revenue is optimized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixFocus {
    /// Shorter operating cycle (faster-turning products)
    Cycle,
    /// Higher share of cash sales
    CashSales,
}

/// Shift part of the revenue toward products with better margin or cycle
/// characteristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductMixConfig {
    /// Fraction of revenue reallocated
    pub reallocation_pct: Rate,
    /// Revenue uplift on the reallocated share
    pub revenue_delta_pct: Rate,
    /// Margin uplift on the reallocated share (0.03 = +3pp)
    pub margin_delta: Rate,
    pub focus: MixFocus,
    /// One-time implementation cost
    pub implementation_cost: Money,
}

pub fn evaluate(
    profile: &CompanyProfile,
    config: &ProductMixConfig,
    impact: &ImpactResult,
    params: &SimulationParameters,
) -> StrategyEvaluation {
    let horizon = Decimal::from(params.strategy_horizon_months);

    let reallocated = profile.monthly_revenue * config.reallocation_pct;
    let incremental_revenue = reallocated * config.revenue_delta_pct;

    let monthly_benefit = incremental_revenue * (profile.operating_margin + config.margin_delta)
        + reallocated * config.margin_delta;
    let mitigated = monthly_benefit * horizon;
    let cost = config.implementation_cost;

    let pmr_delta = match config.focus {
        MixFocus::Cycle => -(profile.pmr * config.reallocation_pct),
        // The reallocated share collects as cash; only its term portion
        // leaves the receivables book
        MixFocus::CashSales => {
            -(profile.pmr * config.reallocation_pct * profile.term_sales_pct)
        }
    };

    let margin_delta_pp = config.margin_delta * config.reallocation_pct * dec!(100);

    let mut trace = CalculationTrace::new();
    trace.push(
        "Reallocated revenue",
        format!(
            "{} × {} = {} per month",
            profile.monthly_revenue, config.reallocation_pct, reallocated
        ),
    );
    trace.push(
        "Monthly benefit",
        format!("{monthly_benefit} from uplift and margin shift"),
    );
    trace.push("Implementation cost", format!("{cost} one-time"));

    StrategyEvaluation::Evaluated(StrategyOutcome {
        kind: StrategyKind::ProductMixShift,
        monthly_benefit,
        mitigated_amount: mitigated,
        effectiveness_pct: effectiveness_pct(mitigated, impact.capital_delta.abs()),
        cost,
        cost_benefit_ratio: cost_benefit(cost, mitigated),
        pmr_delta_days: Some(pmr_delta),
        pmp_delta_days: None,
        margin_delta_pp: Some(margin_delta_pp),
        trace,
    })
}
