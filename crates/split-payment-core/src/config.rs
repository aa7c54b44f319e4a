use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{Days, Money, Rate};

// ---------------------------------------------------------------------------
// Implementation schedule
// ---------------------------------------------------------------------------

/// Year → fraction of tax liability subject to Split Payment withholding.
///
/// The default schedule ramps from 10% in 2026 to 100% in 2033. A year absent
/// from the map yields fraction 0 — the schedule is never extrapolated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplementationSchedule {
    pub fractions: BTreeMap<i32, Rate>,
}

impl ImplementationSchedule {
    pub fn new(fractions: BTreeMap<i32, Rate>) -> Self {
        ImplementationSchedule { fractions }
    }

    /// Fraction withheld in `year` under this schedule alone.
    pub fn fraction(&self, year: i32) -> Rate {
        self.fractions.get(&year).copied().unwrap_or(Decimal::ZERO)
    }

    /// Fraction withheld in `year`, consulting a sector-specific override
    /// first and falling back to this schedule for years the override does
    /// not cover.
    pub fn fraction_with_override(
        &self,
        year: i32,
        sector_override: Option<&ImplementationSchedule>,
    ) -> Rate {
        if let Some(schedule) = sector_override {
            if let Some(fraction) = schedule.fractions.get(&year) {
                return *fraction;
            }
        }
        self.fraction(year)
    }

    /// Last year present in the schedule.
    pub fn terminal_year(&self) -> Option<i32> {
        self.fractions.keys().next_back().copied()
    }
}

impl Default for ImplementationSchedule {
    fn default() -> Self {
        let fractions = BTreeMap::from([
            (2026, dec!(0.10)),
            (2027, dec!(0.25)),
            (2028, dec!(0.40)),
            (2029, dec!(0.55)),
            (2030, dec!(0.70)),
            (2031, dec!(0.85)),
            (2032, dec!(0.95)),
            (2033, dec!(1.00)),
        ]);
        ImplementationSchedule { fractions }
    }
}

// ---------------------------------------------------------------------------
// Transition windows
// ---------------------------------------------------------------------------

/// Years over which a legacy tax component phases out and its dual-VAT
/// replacement phases in. A single-year window (start == end) switches from
/// fully-legacy to fully-new at `start`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransitionWindow {
    pub start: i32,
    pub end: i32,
}

impl TransitionWindow {
    /// Blend weight of the *new* tax in `year`: 0 before the window, 1 at or
    /// after its end, linear in between.
    pub fn blend_weight(&self, year: i32) -> Rate {
        if year < self.start {
            return Decimal::ZERO;
        }
        if year >= self.end {
            return Decimal::ONE;
        }
        let elapsed = Decimal::from(year - self.start);
        let span = Decimal::from(self.end - self.start);
        elapsed / span
    }
}

// ---------------------------------------------------------------------------
// Tax rates
// ---------------------------------------------------------------------------

/// Legacy regime component rates (fractions of revenue).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyRates {
    pub pis: Rate,
    pub cofins: Rate,
    pub icms: Rate,
    pub iss: Rate,
}

impl Default for LegacyRates {
    fn default() -> Self {
        LegacyRates {
            pis: dec!(0.0165),
            cofins: dec!(0.076),
            icms: dec!(0.18),
            iss: dec!(0.05),
        }
    }
}

/// Dual-VAT component rates. CBS replaces the federal PIS/COFINS pair; IBS
/// replaces the subnational ICMS/ISS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualVatRates {
    pub cbs: Rate,
    pub ibs: Rate,
}

impl DualVatRates {
    pub fn total(&self) -> Rate {
        self.cbs + self.ibs
    }
}

impl Default for DualVatRates {
    fn default() -> Self {
        DualVatRates {
            cbs: dec!(0.088),
            ibs: dec!(0.177),
        }
    }
}

// ---------------------------------------------------------------------------
// Financing product menu
// ---------------------------------------------------------------------------

/// An external financing product available to cover the capital need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingProduct {
    pub name: String,
    pub monthly_rate: Rate,
    pub term_months: u32,
    pub grace_months: u32,
    pub cap: Money,
}

/// Fixed three-product menu evaluated by the capital-needs calculator.
pub fn default_financing_menu() -> Vec<FinancingProduct> {
    vec![
        FinancingProduct {
            name: "Working-capital loan".to_string(),
            monthly_rate: dec!(0.021),
            term_months: 24,
            grace_months: 3,
            cap: dec!(5_000_000),
        },
        FinancingProduct {
            name: "Receivables-anticipation facility".to_string(),
            monthly_rate: dec!(0.018),
            term_months: 12,
            grace_months: 0,
            cap: dec!(3_000_000),
        },
        FinancingProduct {
            name: "Bank loan".to_string(),
            monthly_rate: dec!(0.025),
            term_months: 36,
            grace_months: 6,
            cap: dec!(10_000_000),
        },
    ]
}

// ---------------------------------------------------------------------------
// Simulation parameters
// ---------------------------------------------------------------------------

/// All static configuration consumed by the core. Injected explicitly into
/// every operation; there is no module-level fallback state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Monthly working-capital financing rate used for margin-impact costing
    pub monthly_financing_rate: Rate,
    /// Statutory tax collection deadline under the legacy regime, in days
    pub collection_deadline_days: Days,
    /// Safety margin applied to the base capital need
    pub safety_margin: Decimal,
    /// Seasonality adjustment. A placeholder constant, not a seasonal model;
    /// downstream consumers depend on the 1.3 value for reproducibility.
    pub seasonality_factor: Decimal,
    /// Evaluation horizon for mitigation strategies, in months
    pub strategy_horizon_months: u32,
    /// First year of the Split Payment rollout
    pub rollout_start_year: i32,
    /// Default implementation schedule
    pub schedule: ImplementationSchedule,
    /// Federal transition window (PIS/COFINS → CBS)
    pub federal_window: TransitionWindow,
    /// Subnational transition window (ICMS/ISS → IBS)
    pub subnational_window: TransitionWindow,
    pub legacy_rates: LegacyRates,
    pub vat_rates: DualVatRates,
    pub financing_menu: Vec<FinancingProduct>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters {
            monthly_financing_rate: dec!(0.021),
            collection_deadline_days: dec!(25),
            safety_margin: dec!(1.2),
            seasonality_factor: dec!(1.3),
            strategy_horizon_months: 12,
            rollout_start_year: 2026,
            schedule: ImplementationSchedule::default(),
            federal_window: TransitionWindow {
                start: 2027,
                end: 2027,
            },
            subnational_window: TransitionWindow {
                start: 2029,
                end: 2033,
            },
            legacy_rates: LegacyRates::default(),
            vat_rates: DualVatRates::default(),
            financing_menu: default_financing_menu(),
        }
    }
}
