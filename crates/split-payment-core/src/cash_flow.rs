use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{ImplementationSchedule, SimulationParameters};
use crate::types::{CompanyProfile, Days, Money, Rate};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Cash-flow picture of one month under a single tax regime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowSnapshot {
    /// Net tax liability (revenue × effective rate − credits, floored at 0)
    pub net_tax: Money,
    /// Portion withheld at the moment of payment
    pub withheld_tax: Money,
    /// Working capital the liability leaves available until settlement
    pub available_capital: Money,
    /// Split Payment fraction applied (0 under the legacy regime)
    pub implementation_fraction: Rate,
    /// Weighted average days the capital floats before settlement
    pub weighted_float_days: Days,
    /// Available capital expressed as equivalent days of revenue
    pub capital_days_benefit: Days,
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

/// Net tax liability for one month of revenue, floored at zero after the
/// credit offset.
pub fn net_tax_liability(profile: &CompanyProfile) -> Money {
    (profile.monthly_revenue * profile.tax_rate - profile.tax_credits).max(Decimal::ZERO)
}

/// Weighted average float days: cash sales wait out the full statutory
/// deadline, term sales only whatever remains of it after collection.
fn weighted_float_days(profile: &CompanyProfile, deadline_days: Days) -> Days {
    let term_float = (deadline_days - profile.pmr).max(Decimal::ZERO);
    profile.cash_sales_pct * deadline_days + profile.term_sales_pct * term_float
}

fn capital_days_benefit(available: Money, revenue: Money, float_days: Days) -> Days {
    if revenue.is_zero() {
        return Decimal::ZERO;
    }
    (available / revenue) * float_days
}

/// Legacy regime: collection is deferred to the statutory settlement date,
/// so the full net liability is available as working capital until then.
pub fn current_cash_flow(
    profile: &CompanyProfile,
    params: &SimulationParameters,
) -> CashFlowSnapshot {
    let net_tax = net_tax_liability(profile);
    let float_days = weighted_float_days(profile, params.collection_deadline_days);

    CashFlowSnapshot {
        net_tax,
        withheld_tax: Decimal::ZERO,
        available_capital: net_tax,
        implementation_fraction: Decimal::ZERO,
        weighted_float_days: float_days,
        capital_days_benefit: capital_days_benefit(net_tax, profile.monthly_revenue, float_days),
    }
}

/// Split Payment regime: the scheduled fraction is withheld at payment; only
/// the non-withheld remainder floats until the same statutory deadline.
pub fn split_payment_cash_flow(
    profile: &CompanyProfile,
    year: i32,
    sector_override: Option<&ImplementationSchedule>,
    params: &SimulationParameters,
) -> CashFlowSnapshot {
    let net_tax = net_tax_liability(profile);
    let fraction = params
        .schedule
        .fraction_with_override(year, sector_override);

    let withheld = net_tax * fraction;
    let available = if fraction > Decimal::ZERO {
        net_tax - withheld
    } else {
        net_tax
    };

    let float_days = weighted_float_days(profile, params.collection_deadline_days);

    CashFlowSnapshot {
        net_tax,
        withheld_tax: withheld,
        available_capital: available,
        implementation_fraction: fraction,
        weighted_float_days: float_days,
        capital_days_benefit: capital_days_benefit(available, profile.monthly_revenue, float_days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::types::{GrowthScenario, SectorKind};

    fn sample_profile() -> CompanyProfile {
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

    #[test]
    fn test_current_regime_keeps_full_net_tax_available() {
        let params = SimulationParameters::default();
        let snapshot = current_cash_flow(&sample_profile(), &params);

        assert_eq!(snapshot.net_tax, dec!(26_500));
        assert_eq!(snapshot.available_capital, dec!(26_500));
        assert_eq!(snapshot.withheld_tax, Decimal::ZERO);
    }

    #[test]
    fn test_split_payment_withholds_scheduled_fraction() {
        let params = SimulationParameters::default();
        let snapshot = split_payment_cash_flow(&sample_profile(), 2026, None, &params);

        assert_eq!(snapshot.implementation_fraction, dec!(0.10));
        assert_eq!(snapshot.withheld_tax, dec!(2650));
        assert_eq!(snapshot.available_capital, dec!(23_850));
    }

    #[test]
    fn test_zero_fraction_matches_current_regime() {
        let params = SimulationParameters::default();
        let profile = sample_profile();
        // 2025 precedes the rollout: fraction 0
        let split = split_payment_cash_flow(&profile, 2025, None, &params);
        let current = current_cash_flow(&profile, &params);

        assert_eq!(split.available_capital, current.available_capital);
        assert_eq!(split.capital_days_benefit, current.capital_days_benefit);
    }

    #[test]
    fn test_terminal_year_withholds_everything() {
        let params = SimulationParameters::default();
        let snapshot = split_payment_cash_flow(&sample_profile(), 2033, None, &params);

        assert_eq!(snapshot.available_capital, Decimal::ZERO);
        assert_eq!(snapshot.withheld_tax, snapshot.net_tax);
    }

    #[test]
    fn test_weighted_float_days() {
        let params = SimulationParameters::default();
        let snapshot = current_cash_flow(&sample_profile(), &params);
        // 0.3 × 25 + 0.7 × max(0, 25 − 30) = 7.5
        assert_eq!(snapshot.weighted_float_days, dec!(7.5));
    }

    #[test]
    fn test_short_pmr_retains_term_float() {
        let params = SimulationParameters::default();
        let mut profile = sample_profile();
        profile.pmr = dec!(10);
        let snapshot = current_cash_flow(&profile, &params);
        // 0.3 × 25 + 0.7 × 15 = 18
        assert_eq!(snapshot.weighted_float_days, dec!(18.0));
    }

    #[test]
    fn test_capital_days_benefit_scales_with_available_capital() {
        let params = SimulationParameters::default();
        let profile = sample_profile();
        let current = current_cash_flow(&profile, &params);
        let split = split_payment_cash_flow(&profile, 2026, None, &params);

        assert_eq!(
            current.capital_days_benefit,
            dec!(26_500) / dec!(100_000) * dec!(7.5)
        );
        assert!(split.capital_days_benefit < current.capital_days_benefit);
    }

    #[test]
    fn test_credits_reduce_net_tax() {
        let params = SimulationParameters::default();
        let mut profile = sample_profile();
        profile.tax_credits = dec!(6500);
        let snapshot = current_cash_flow(&profile, &params);
        assert_eq!(snapshot.net_tax, dec!(20_000));
    }
}
