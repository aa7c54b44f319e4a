pub mod impact;
pub mod projection;
pub mod strategies;
pub mod taxes;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use split_payment_core::config::{ImplementationSchedule, SimulationParameters};
use split_payment_core::{CompanyProfile, GrowthScenario, SectorKind};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SectorArg {
    Commerce,
    Services,
}

impl From<SectorArg> for SectorKind {
    fn from(value: SectorArg) -> Self {
        match value {
            SectorArg::Commerce => SectorKind::Commerce,
            SectorArg::Services => SectorKind::Services,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GrowthArg {
    Conservative,
    Moderate,
    Optimistic,
    Custom,
}

impl From<GrowthArg> for GrowthScenario {
    fn from(value: GrowthArg) -> Self {
        match value {
            GrowthArg::Conservative => GrowthScenario::Conservative,
            GrowthArg::Moderate => GrowthScenario::Moderate,
            GrowthArg::Optimistic => GrowthScenario::Optimistic,
            GrowthArg::Custom => GrowthScenario::Custom,
        }
    }
}

/// Company profile flags shared by every simulation command. A JSON file or
/// piped stdin overrides the individual flags.
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ProfileArgs {
    /// Path to a JSON company profile (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Monthly gross revenue
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// Operating margin as a fraction (0.15 = 15%)
    #[arg(long)]
    pub margin: Option<Decimal>,

    /// Average days to collect receivables
    #[arg(long)]
    pub pmr: Option<Decimal>,

    /// Average days to pay suppliers
    #[arg(long)]
    pub pmp: Option<Decimal>,

    /// Average days inventory is held
    #[arg(long)]
    pub pme: Option<Decimal>,

    /// Fraction of sales settled in cash
    #[arg(long, alias = "cash-pct")]
    pub cash_sales_pct: Option<Decimal>,

    /// Fraction of sales settled on term
    #[arg(long, alias = "term-pct")]
    pub term_sales_pct: Option<Decimal>,

    /// Effective indirect tax rate on revenue
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Tax credits available for offset
    #[arg(long, default_value = "0")]
    pub tax_credits: Decimal,

    /// Subnational tax kind
    #[arg(long, value_enum, default_value = "commerce")]
    pub sector: SectorArg,

    /// Revenue growth scenario
    #[arg(long, value_enum, default_value = "moderate")]
    pub growth: GrowthArg,

    /// Annual growth rate, used only with --growth custom
    #[arg(long)]
    pub growth_rate: Option<Decimal>,

    /// Path to a JSON sector schedule override (year → withholding fraction)
    #[arg(long)]
    pub sector_schedule: Option<String>,
}

impl ProfileArgs {
    /// Build the profile from the file, stdin, or individual flags, in that
    /// order of precedence.
    pub fn resolve(&self) -> Result<CompanyProfile, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_json(path);
        }
        if let Some(data) = input::stdin::read_stdin()? {
            return Ok(serde_json::from_value(data)?);
        }

        Ok(CompanyProfile {
            monthly_revenue: self
                .revenue
                .ok_or("--revenue is required (or provide --input)")?,
            operating_margin: self
                .margin
                .ok_or("--margin is required (or provide --input)")?,
            pmr: self.pmr.ok_or("--pmr is required (or provide --input)")?,
            pmp: self.pmp.ok_or("--pmp is required (or provide --input)")?,
            pme: self.pme.ok_or("--pme is required (or provide --input)")?,
            cash_sales_pct: self
                .cash_sales_pct
                .ok_or("--cash-sales-pct is required (or provide --input)")?,
            term_sales_pct: self
                .term_sales_pct
                .ok_or("--term-sales-pct is required (or provide --input)")?,
            tax_rate: self
                .tax_rate
                .ok_or("--tax-rate is required (or provide --input)")?,
            tax_credits: self.tax_credits,
            sector_kind: self.sector.into(),
            growth_scenario: self.growth.into(),
            custom_growth_rate: self.growth_rate,
        })
    }

    /// Load the sector-specific schedule override, if one was given.
    pub fn resolve_sector_schedule(
        &self,
    ) -> Result<Option<ImplementationSchedule>, Box<dyn std::error::Error>> {
        match &self.sector_schedule {
            Some(path) => {
                let fractions: BTreeMap<i32, Decimal> = input::file::read_json(path)?;
                Ok(Some(ImplementationSchedule::new(fractions)))
            }
            None => Ok(None),
        }
    }
}

/// Simulation parameters are fixed defaults for the CLI; callers needing a
/// different configuration use the library directly.
pub fn default_params() -> SimulationParameters {
    SimulationParameters::default()
}
