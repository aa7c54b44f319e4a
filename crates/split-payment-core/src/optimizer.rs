//! Strategy combination and selection.
//!
//! Combines individually evaluated strategies with overlap discounts so
//! correlated effects are not double-counted, then enumerates every subset
//! up to size five and picks a recommendation off the Pareto frontier.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{ImplementationSchedule, SimulationParameters};
use crate::error::SplitPaymentError;
use crate::impact::compute_impact_inner;
use crate::strategies::{
    evaluate_portfolio, StrategyKind, StrategyOutcome, StrategyPortfolio,
};
use crate::types::{
    with_metadata, CalculationTrace, CompanyProfile, ComputationOutput, Days, Money, Rate,
};
use crate::SplitPaymentResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Hard cap on subset size; 6 strategies means at most 31 + 26 = 57 subsets
/// pruned to those of size ≤ 5.
const MAX_COMBINATION_SIZE: u32 = 5;

/// Overlap discounts per effect bucket. Strategies touching the same lever
/// partially cannibalize each other.
const PMR_OVERLAP_DISCOUNT: Decimal = dec!(0.8);
const PMP_OVERLAP_DISCOUNT: Decimal = dec!(0.9);
const MARGIN_OVERLAP_DISCOUNT: Decimal = dec!(0.85);

/// Diminishing-returns penalty per additional strategy in a subset.
const STACKING_PENALTY_STEP: Decimal = dec!(0.05);

/// Minimum combined effectiveness for the preferred selection rule.
const TARGET_EFFECTIVENESS: Decimal = dec!(70);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Joint effect of running several strategies at once, with overlap
/// discounts applied per bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedEffect {
    pub members: Vec<StrategyKind>,
    /// Discounted sum of receivables-days changes
    pub pmr_delta_days: Days,
    /// Discounted sum of payables-days changes
    pub pmp_delta_days: Days,
    /// Discounted sum of margin changes, in percentage points
    pub margin_delta_pp: Decimal,
    pub adjusted_financial_cycle: Days,
    pub adjusted_margin: Rate,
    /// Stacked effectiveness with the diminishing-returns penalty, capped
    /// at 100
    pub combined_effectiveness_pct: Decimal,
    pub total_cost: Money,
    pub trace: CalculationTrace,
}

/// One enumerated subset with its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationCandidate {
    pub members: Vec<StrategyKind>,
    pub effectiveness_pct: Decimal,
    pub cost: Money,
    /// cost ÷ effectiveness; absent when effectiveness is zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_benefit: Option<Decimal>,
}

/// Recommended subset plus labeled alternatives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimalSelection {
    pub year: i32,
    pub selected: CombinationCandidate,
    pub combined_effect: CombinedEffect,
    pub frontier: Vec<CombinationCandidate>,
    pub best_effectiveness: CombinationCandidate,
    pub best_cost_benefit: CombinationCandidate,
    pub best_single: CombinationCandidate,
    pub trace: CalculationTrace,
}

// ---------------------------------------------------------------------------
// Combination
// ---------------------------------------------------------------------------

/// Aggregate the outcomes' effects into PMR, PMP, and margin buckets, apply
/// the overlap discounts, and restate the profile's cycle and margin.
pub fn combine_strategies(profile: &CompanyProfile, outcomes: &[&StrategyOutcome]) -> CombinedEffect {
    let mut pmr_sum = Decimal::ZERO;
    let mut pmp_sum = Decimal::ZERO;
    let mut margin_sum = Decimal::ZERO;
    let mut cost_sum = Decimal::ZERO;

    for outcome in outcomes {
        if let Some(delta) = outcome.pmr_delta_days {
            pmr_sum += delta;
        }
        if let Some(delta) = outcome.pmp_delta_days {
            pmp_sum += delta;
        }
        if let Some(delta) = outcome.margin_delta_pp {
            margin_sum += delta;
        }
        cost_sum += outcome.cost;
    }

    let pmr_delta = pmr_sum * PMR_OVERLAP_DISCOUNT;
    let pmp_delta = pmp_sum * PMP_OVERLAP_DISCOUNT;
    let margin_delta = margin_sum * MARGIN_OVERLAP_DISCOUNT;

    let adjusted_cycle =
        (profile.pmr + pmr_delta) + profile.pme - (profile.pmp + pmp_delta);
    let adjusted_margin = profile.operating_margin + margin_delta / dec!(100);

    let effectiveness = stacked_effectiveness(outcomes);

    let mut trace = CalculationTrace::new();
    trace.push(
        "Discounted PMR shift",
        format!("{pmr_sum} × {PMR_OVERLAP_DISCOUNT} = {pmr_delta} days"),
    );
    trace.push(
        "Discounted PMP shift",
        format!("{pmp_sum} × {PMP_OVERLAP_DISCOUNT} = {pmp_delta} days"),
    );
    trace.push(
        "Discounted margin shift",
        format!("{margin_sum} × {MARGIN_OVERLAP_DISCOUNT} = {margin_delta} pp"),
    );
    trace.push(
        "Adjusted financial cycle",
        format!("{} → {} days", profile.financial_cycle(), adjusted_cycle),
    );

    CombinedEffect {
        members: outcomes.iter().map(|o| o.kind).collect(),
        pmr_delta_days: pmr_delta,
        pmp_delta_days: pmp_delta,
        margin_delta_pp: margin_delta,
        adjusted_financial_cycle: adjusted_cycle,
        adjusted_margin,
        combined_effectiveness_pct: effectiveness,
        total_cost: cost_sum,
        trace,
    }
}

/// Sum of member effectiveness values scaled by `1 − 0.05 × (size − 1)`,
/// capped at 100.
fn stacked_effectiveness(outcomes: &[&StrategyOutcome]) -> Decimal {
    if outcomes.is_empty() {
        return Decimal::ZERO;
    }
    let size = Decimal::from(outcomes.len());
    let penalty = Decimal::ONE - STACKING_PENALTY_STEP * (size - Decimal::ONE);
    let raw: Decimal = outcomes.iter().map(|o| o.effectiveness_pct).sum();
    (raw * penalty).min(dec!(100))
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Evaluate the portfolio, enumerate every subset of positively effective
/// strategies up to the size cap, and select a recommendation.
pub fn select_optimal_combination(
    profile: &CompanyProfile,
    portfolio: &StrategyPortfolio,
    year: i32,
    sector_override: Option<&ImplementationSchedule>,
    params: &SimulationParameters,
) -> SplitPaymentResult<ComputationOutput<OptimalSelection>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let impact = compute_impact_inner(profile, year, sector_override, params, &mut warnings);
    let evaluations = evaluate_portfolio(profile, portfolio, &impact, params);

    let positive: Vec<&StrategyOutcome> = evaluations
        .iter()
        .filter_map(|e| e.outcome())
        .filter(|o| o.effectiveness_pct > Decimal::ZERO)
        .collect();

    if positive.is_empty() {
        return Err(SplitPaymentError::InsufficientData(
            "no strategy with positive effectiveness to combine".to_string(),
        ));
    }
    if evaluations.len() > positive.len() {
        warnings.push(format!(
            "{} of {} strategies excluded (rejected or non-positive effectiveness).",
            evaluations.len() - positive.len(),
            evaluations.len()
        ));
    }

    let candidates = enumerate_subsets(&positive);
    let frontier = pareto_frontier(&candidates);
    let selected = pick_from_frontier(&frontier, &candidates).ok_or_else(|| {
        SplitPaymentError::InsufficientData("no combination candidate to select".to_string())
    })?;

    let selected_outcomes: Vec<&StrategyOutcome> = positive
        .iter()
        .filter(|o| selected.members.contains(&o.kind))
        .copied()
        .collect();
    let combined_effect = combine_strategies(profile, &selected_outcomes);

    let best_effectiveness = candidates
        .iter()
        .max_by(|a, b| a.effectiveness_pct.cmp(&b.effectiveness_pct))
        .cloned()
        .unwrap_or_else(|| selected.clone());
    let best_cost_benefit = best_by_cost_benefit(&candidates).unwrap_or_else(|| selected.clone());
    let best_single = candidates
        .iter()
        .filter(|c| c.members.len() == 1)
        .max_by(|a, b| a.effectiveness_pct.cmp(&b.effectiveness_pct))
        .cloned()
        .unwrap_or_else(|| selected.clone());

    let mut trace = CalculationTrace::new();
    trace.push(
        "Candidates",
        format!(
            "{} subsets of {} strategies (size cap {MAX_COMBINATION_SIZE})",
            candidates.len(),
            positive.len()
        ),
    );
    trace.push("Pareto frontier", format!("{} candidates", frontier.len()));
    trace.push(
        "Selected",
        format!(
            "{:?} at {}% effectiveness, cost {}",
            selected.members, selected.effectiveness_pct, selected.cost
        ),
    );

    let result = OptimalSelection {
        year,
        selected,
        combined_effect,
        frontier,
        best_effectiveness,
        best_cost_benefit,
        best_single,
        trace,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mitigation Strategy Combination Optimizer",
        &serde_json::json!({
            "year": year,
            "max_combination_size": MAX_COMBINATION_SIZE,
            "target_effectiveness_pct": TARGET_EFFECTIVENESS,
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Every non-empty subset up to the size cap, scored. Iterative bitmask
/// enumeration; at most six strategies means at most 63 masks.
fn enumerate_subsets(outcomes: &[&StrategyOutcome]) -> Vec<CombinationCandidate> {
    let n = outcomes.len();
    let mut candidates = Vec::new();

    for mask in 1u32..(1u32 << n) {
        if mask.count_ones() > MAX_COMBINATION_SIZE {
            continue;
        }
        let members: Vec<&StrategyOutcome> = (0..n)
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| outcomes[i])
            .collect();

        let effectiveness = stacked_effectiveness(&members);
        let cost: Decimal = members.iter().map(|o| o.cost).sum();
        let cost_benefit = if effectiveness.is_zero() {
            None
        } else {
            Some(cost / effectiveness)
        };

        candidates.push(CombinationCandidate {
            members: members.iter().map(|o| o.kind).collect(),
            effectiveness_pct: effectiveness,
            cost,
            cost_benefit,
        });
    }

    candidates
}

/// A candidate is efficient iff no other candidate reaches strictly higher
/// effectiveness at equal-or-lower cost.
fn pareto_frontier(candidates: &[CombinationCandidate]) -> Vec<CombinationCandidate> {
    candidates
        .iter()
        .filter(|c| {
            !candidates
                .iter()
                .any(|other| other.effectiveness_pct > c.effectiveness_pct && other.cost <= c.cost)
        })
        .cloned()
        .collect()
}

/// Frontier candidates at or above the target effectiveness, cheapest first;
/// then the frontier's highest effectiveness; then the global best
/// cost-benefit.
fn pick_from_frontier(
    frontier: &[CombinationCandidate],
    all: &[CombinationCandidate],
) -> Option<CombinationCandidate> {
    if let Some(cheap_enough) = frontier
        .iter()
        .filter(|c| c.effectiveness_pct >= TARGET_EFFECTIVENESS)
        .min_by(|a, b| a.cost.cmp(&b.cost))
    {
        return Some(cheap_enough.clone());
    }
    if let Some(most_effective) = frontier
        .iter()
        .max_by(|a, b| a.effectiveness_pct.cmp(&b.effectiveness_pct))
    {
        return Some(most_effective.clone());
    }
    // Degenerate frontier
    best_by_cost_benefit(all).or_else(|| all.first().cloned())
}

fn best_by_cost_benefit(candidates: &[CombinationCandidate]) -> Option<CombinationCandidate> {
    candidates
        .iter()
        .filter(|c| c.cost_benefit.is_some())
        .min_by(|a, b| a.cost_benefit.cmp(&b.cost_benefit))
        .cloned()
}
