use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Day counts (PMR, PMP, PME, float days).
pub type Days = Decimal;

/// Revenue growth scenario for multi-year projections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthScenario {
    Conservative,
    #[default]
    Moderate,
    Optimistic,
    Custom,
}

impl GrowthScenario {
    /// Resolve the annual growth rate for this scenario.
    ///
    /// `Custom` uses the supplied rate; an absent custom rate falls back to
    /// the moderate default rather than being treated as zero.
    pub fn annual_rate(&self, custom_rate: Option<Rate>) -> Rate {
        match self {
            GrowthScenario::Conservative => dec!(0.02),
            GrowthScenario::Moderate => dec!(0.05),
            GrowthScenario::Optimistic => dec!(0.08),
            GrowthScenario::Custom => custom_rate.unwrap_or(dec!(0.05)),
        }
    }
}

/// Whether the company's subnational indirect tax is ICMS (goods) or ISS
/// (services). Determines which legacy component appears in the breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorKind {
    #[default]
    Commerce,
    Services,
}

/// One simulated business for a single scenario run.
///
/// Constructed once per simulation request and treated as immutable within a
/// calculation pass. Year-over-year projections derive a new instance with
/// scaled revenue via [`CompanyProfile::with_monthly_revenue`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Monthly gross revenue
    pub monthly_revenue: Money,
    /// Operating margin as a fraction of revenue (0–1)
    pub operating_margin: Rate,
    /// Average days to collect receivables (PMR)
    pub pmr: Days,
    /// Average days to pay suppliers (PMP)
    pub pmp: Days,
    /// Average days inventory is held (PME)
    pub pme: Days,
    /// Fraction of sales settled in cash
    pub cash_sales_pct: Rate,
    /// Fraction of sales settled on term (cash_sales_pct + term_sales_pct ≈ 1)
    pub term_sales_pct: Rate,
    /// Effective indirect tax rate on revenue
    pub tax_rate: Rate,
    /// Tax credits available for offset
    pub tax_credits: Money,
    /// Subnational tax kind (ICMS vs ISS)
    #[serde(default)]
    pub sector_kind: SectorKind,
    /// Growth scenario for projections
    #[serde(default)]
    pub growth_scenario: GrowthScenario,
    /// Annual growth rate used only when the scenario is `Custom`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_growth_rate: Option<Rate>,
}

impl CompanyProfile {
    /// Derive a new profile with a different monthly revenue, leaving the
    /// original untouched.
    pub fn with_monthly_revenue(&self, monthly_revenue: Money) -> Self {
        CompanyProfile {
            monthly_revenue,
            ..self.clone()
        }
    }

    /// Annual growth rate resolved from the profile's scenario.
    pub fn annual_growth_rate(&self) -> Rate {
        self.growth_scenario.annual_rate(self.custom_growth_rate)
    }

    /// Financial cycle in days: PMR + PME − PMP.
    pub fn financial_cycle(&self) -> Days {
        self.pmr + self.pme - self.pmp
    }
}

/// One labeled line of a human-readable calculation trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub label: String,
    pub detail: String,
}

/// Ordered narrative of how a result was computed. Attached uniformly to
/// every major result type so report generators can render a calculation
/// memory without re-deriving intermediate values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationTrace {
    pub entries: Vec<TraceEntry>,
}

impl CalculationTrace {
    pub fn new() -> Self {
        CalculationTrace {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, label: &str, detail: impl Into<String>) {
        self.entries.push(TraceEntry {
            label: label.to_string(),
            detail: detail.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_scenario_rates() {
        assert_eq!(GrowthScenario::Conservative.annual_rate(None), dec!(0.02));
        assert_eq!(GrowthScenario::Moderate.annual_rate(None), dec!(0.05));
        assert_eq!(GrowthScenario::Optimistic.annual_rate(None), dec!(0.08));
        assert_eq!(
            GrowthScenario::Custom.annual_rate(Some(dec!(0.035))),
            dec!(0.035)
        );
    }

    #[test]
    fn test_custom_scenario_without_rate_falls_back_to_moderate() {
        assert_eq!(GrowthScenario::Custom.annual_rate(None), dec!(0.05));
    }

    #[test]
    fn test_with_monthly_revenue_does_not_mutate_original() {
        let profile = CompanyProfile {
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
        };
        let grown = profile.with_monthly_revenue(dec!(105_000));
        assert_eq!(profile.monthly_revenue, dec!(100_000));
        assert_eq!(grown.monthly_revenue, dec!(105_000));
        assert_eq!(grown.pmr, profile.pmr);
    }

    #[test]
    fn test_financial_cycle() {
        let profile = CompanyProfile {
            monthly_revenue: dec!(100_000),
            operating_margin: dec!(0.15),
            pmr: dec!(45),
            pmp: dec!(30),
            pme: dec!(20),
            cash_sales_pct: dec!(0.3),
            term_sales_pct: dec!(0.7),
            tax_rate: dec!(0.265),
            tax_credits: Decimal::ZERO,
            sector_kind: SectorKind::Commerce,
            growth_scenario: GrowthScenario::Moderate,
            custom_growth_rate: None,
        };
        assert_eq!(profile.financial_cycle(), dec!(35));
    }
}
