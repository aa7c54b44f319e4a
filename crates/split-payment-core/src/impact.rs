use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::cash_flow::{current_cash_flow, split_payment_cash_flow, CashFlowSnapshot};
use crate::config::{ImplementationSchedule, SimulationParameters};
use crate::types::{
    with_metadata, CalculationTrace, CompanyProfile, ComputationOutput, Days, Money, Rate,
};
use crate::SplitPaymentResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The central computed fact of the simulator: how much working capital the
/// Split Payment regime removes (or adds) relative to the legacy regime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactResult {
    pub year: i32,
    pub current: CashFlowSnapshot,
    pub split_payment: CashFlowSnapshot,
    /// split_payment.available_capital − current.available_capital.
    /// Negative means the new regime frees less capital. The sign here is
    /// the single source of truth for positive/negative impact framing.
    pub capital_delta: Money,
    /// Delta relative to the current regime's available capital, in percent
    pub percent_impact: Decimal,
    /// Safety-padded absolute financing need: |delta| × 1.2
    pub financing_need: Money,
    /// Days-of-revenue benefit lost to the new regime
    pub days_impact: Days,
    pub margin_impact: MarginImpact,
    /// Delta recomputed at each rollout fraction, holding all else fixed
    pub sensitivity: Vec<SensitivityPoint>,
    /// Capital impact per 10% of rollout, for narrative use
    pub impact_per_tenth: Money,
    pub trace: CalculationTrace,
}

/// Margin erosion from financing the withheld capital.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginImpact {
    pub monthly_financing_cost: Money,
    pub annual_financing_cost: Money,
    /// Financing cost over revenue, in percentage points
    pub margin_erosion_pp: Decimal,
    pub adjusted_margin: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub fraction: Rate,
    pub capital_delta: Money,
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Compare both regimes' cash flows for `year` and derive every downstream
/// impact metric.
pub fn compute_impact(
    profile: &CompanyProfile,
    year: i32,
    sector_override: Option<&ImplementationSchedule>,
    params: &SimulationParameters,
) -> SplitPaymentResult<ComputationOutput<ImpactResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = compute_impact_inner(profile, year, sector_override, params, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Split Payment Working-Capital Impact",
        &serde_json::json!({
            "year": year,
            "implementation_fraction": result.split_payment.implementation_fraction,
            "safety_margin": params.safety_margin,
            "monthly_financing_rate": params.monthly_financing_rate,
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Envelope-free analyzer shared with the projection engine and the
/// strategy evaluators.
pub(crate) fn compute_impact_inner(
    profile: &CompanyProfile,
    year: i32,
    sector_override: Option<&ImplementationSchedule>,
    params: &SimulationParameters,
    warnings: &mut Vec<String>,
) -> ImpactResult {
    let current = current_cash_flow(profile, params);
    let split = split_payment_cash_flow(profile, year, sector_override, params);

    let capital_delta = split.available_capital - current.available_capital;

    let percent_impact = if current.available_capital.is_zero() {
        if !capital_delta.is_zero() {
            warnings.push(
                "Current regime frees no capital; percentage impact reported as 0.".to_string(),
            );
        }
        Decimal::ZERO
    } else {
        capital_delta / current.available_capital * dec!(100)
    };

    let financing_need = capital_delta.abs() * params.safety_margin;
    let days_impact = current.capital_days_benefit - split.capital_days_benefit;

    let margin_impact = margin_impact(profile, capital_delta, params);
    let sensitivity = sensitivity_sweep(current.net_tax);
    let impact_per_tenth = current.net_tax * dec!(0.1);

    let mut trace = CalculationTrace::new();
    trace.push(
        "Net tax liability",
        format!("{} per month at effective rate {}", current.net_tax, profile.tax_rate),
    );
    trace.push(
        "Withheld under Split Payment",
        format!(
            "{} ({} of the liability in {})",
            split.withheld_tax, split.implementation_fraction, year
        ),
    );
    trace.push(
        "Working-capital delta",
        format!(
            "{} available under Split Payment vs {} today: {}",
            split.available_capital, current.available_capital, capital_delta
        ),
    );
    trace.push(
        "Financing need",
        format!(
            "|{}| × {} safety margin = {}",
            capital_delta, params.safety_margin, financing_need
        ),
    );
    trace.push(
        "Margin erosion",
        format!(
            "{} pp at a monthly financing rate of {}",
            margin_impact.margin_erosion_pp, params.monthly_financing_rate
        ),
    );

    ImpactResult {
        year,
        current,
        split_payment: split,
        capital_delta,
        percent_impact,
        financing_need,
        days_impact,
        margin_impact,
        sensitivity,
        impact_per_tenth,
        trace,
    }
}

/// Cost of financing the lost capital at the working-capital rate, expressed
/// as operating-margin erosion.
fn margin_impact(
    profile: &CompanyProfile,
    capital_delta: Money,
    params: &SimulationParameters,
) -> MarginImpact {
    let monthly_cost = capital_delta.abs() * params.monthly_financing_rate;
    let annual_cost = monthly_cost * dec!(12);

    let erosion = if profile.monthly_revenue.is_zero() {
        Decimal::ZERO
    } else {
        monthly_cost / profile.monthly_revenue
    };

    MarginImpact {
        monthly_financing_cost: monthly_cost,
        annual_financing_cost: annual_cost,
        margin_erosion_pp: erosion * dec!(100),
        adjusted_margin: profile.operating_margin - erosion,
    }
}

/// Recompute the capital delta at ten rollout fractions (0.1 … 1.0) with the
/// liability held fixed.
fn sensitivity_sweep(net_tax: Money) -> Vec<SensitivityPoint> {
    let step = dec!(0.1);
    let mut points = Vec::with_capacity(10);
    let mut fraction = step;
    while fraction <= Decimal::ONE {
        points.push(SensitivityPoint {
            fraction,
            capital_delta: -(net_tax * fraction),
        });
        fraction += step;
    }
    points
}
