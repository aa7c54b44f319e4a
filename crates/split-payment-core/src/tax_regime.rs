use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{DualVatRates, SimulationParameters};
use crate::types::{CompanyProfile, Money, Rate, SectorKind};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Sector treatment under the dual-VAT system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "reduction")]
pub enum TaxCategory {
    #[default]
    Standard,
    /// Rate reduced by the given fraction (0.6 = 60% reduction)
    Reduced(Rate),
    Exempt,
}

impl TaxCategory {
    fn effective_rate(&self, rate: Rate) -> Rate {
        match self {
            TaxCategory::Standard => rate,
            TaxCategory::Reduced(reduction) => rate * (Decimal::ONE - reduction),
            TaxCategory::Exempt => Decimal::ZERO,
        }
    }
}

/// Legacy regime tax breakdown for one month of revenue.
///
/// Exactly one of `icms` / `iss` is present, per the company's sector kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentRegimeTaxes {
    pub pis: Money,
    pub cofins: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icms: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<Money>,
    pub gross_total: Money,
    pub credits_applied: Money,
    /// Gross total minus credits, floored at zero
    pub total: Money,
}

/// Dual-VAT tax breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualVatTaxes {
    pub cbs: Money,
    pub ibs: Money,
    pub gross_total: Money,
    pub credits_applied: Money,
    pub total: Money,
}

/// All six components for a year that straddles both regimes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendedTaxes {
    pub year: i32,
    pub pis: Money,
    pub cofins: Money,
    pub icms: Money,
    pub iss: Money,
    pub cbs: Money,
    pub ibs: Money,
    pub total: Money,
    /// Blend weight of the federal window (CBS share)
    pub federal_weight: Rate,
    /// Blend weight of the subnational window (IBS share)
    pub subnational_weight: Rate,
}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

/// Legacy regime liability on one month of the profile's revenue.
pub fn current_regime_taxes(
    profile: &CompanyProfile,
    params: &SimulationParameters,
) -> CurrentRegimeTaxes {
    let revenue = profile.monthly_revenue;
    let rates = &params.legacy_rates;

    let pis = revenue * rates.pis;
    let cofins = revenue * rates.cofins;
    let (icms, iss) = match profile.sector_kind {
        SectorKind::Commerce => (Some(revenue * rates.icms), None),
        SectorKind::Services => (None, Some(revenue * rates.iss)),
    };

    let gross_total =
        pis + cofins + icms.unwrap_or(Decimal::ZERO) + iss.unwrap_or(Decimal::ZERO);
    let credits_applied = profile.tax_credits.min(gross_total);
    let total = (gross_total - profile.tax_credits).max(Decimal::ZERO);

    CurrentRegimeTaxes {
        pis,
        cofins,
        icms,
        iss,
        gross_total,
        credits_applied,
        total,
    }
}

/// Dual-VAT liability on `base_value`, with sector category treatment and
/// credits applied against the total (floored at zero).
pub fn dual_vat_taxes(
    base_value: Money,
    rates: &DualVatRates,
    credits: Money,
    category: TaxCategory,
) -> DualVatTaxes {
    let cbs = base_value * category.effective_rate(rates.cbs);
    let ibs = base_value * category.effective_rate(rates.ibs);
    let gross_total = cbs + ibs;
    let credits_applied = credits.min(gross_total);
    let total = (gross_total - credits).max(Decimal::ZERO);

    DualVatTaxes {
        cbs,
        ibs,
        gross_total,
        credits_applied,
        total,
    }
}

/// Transition-weighted blend of both regimes for `year`.
///
/// Each legacy component is scaled down by its window's blend weight while
/// the replacing VAT component scales up, so a year before any window opens
/// is fully legacy and a year past both windows is fully dual-VAT.
pub fn blended_transition_taxes(
    base_value: Money,
    year: i32,
    current: &CurrentRegimeTaxes,
    params: &SimulationParameters,
    category: TaxCategory,
) -> BlendedTaxes {
    let federal_weight = params.federal_window.blend_weight(year);
    let subnational_weight = params.subnational_window.blend_weight(year);
    let legacy_federal = Decimal::ONE - federal_weight;
    let legacy_subnational = Decimal::ONE - subnational_weight;

    let pis = current.pis * legacy_federal;
    let cofins = current.cofins * legacy_federal;
    let icms = current.icms.unwrap_or(Decimal::ZERO) * legacy_subnational;
    let iss = current.iss.unwrap_or(Decimal::ZERO) * legacy_subnational;

    let cbs = base_value * category.effective_rate(params.vat_rates.cbs) * federal_weight;
    let ibs = base_value * category.effective_rate(params.vat_rates.ibs) * subnational_weight;

    let total = pis + cofins + icms + iss + cbs + ibs;

    BlendedTaxes {
        year,
        pis,
        cofins,
        icms,
        iss,
        cbs,
        ibs,
        total,
        federal_weight,
        subnational_weight,
    }
}
