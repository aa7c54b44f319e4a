use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use split_payment_core::tax_regime::{
    blended_transition_taxes, current_regime_taxes, dual_vat_taxes, TaxCategory,
};

use super::{default_params, ProfileArgs};

/// Arguments for the tax-regime breakdown
#[derive(Args)]
pub struct TaxesArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Calendar year for the transition blend
    #[arg(long, default_value = "2026")]
    pub year: i32,

    /// Rate reduction fraction under the dual-VAT system (0.6 = 60% off)
    #[arg(long)]
    pub rate_reduction: Option<Decimal>,

    /// Treat the company as fully exempt under the dual-VAT system
    #[arg(long)]
    pub exempt: bool,
}

pub fn run_taxes(args: TaxesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let profile = args.profile.resolve()?;
    let params = default_params();

    let category = if args.exempt {
        TaxCategory::Exempt
    } else if let Some(reduction) = args.rate_reduction {
        TaxCategory::Reduced(reduction)
    } else {
        TaxCategory::Standard
    };

    let current = current_regime_taxes(&profile, &params);
    let dual_vat = dual_vat_taxes(
        profile.monthly_revenue,
        &params.vat_rates,
        profile.tax_credits,
        category,
    );
    let blended =
        blended_transition_taxes(profile.monthly_revenue, args.year, &current, &params, category);

    Ok(serde_json::json!({
        "year": args.year,
        "current_regime": current,
        "dual_vat": dual_vat,
        "blended": blended,
    }))
}
