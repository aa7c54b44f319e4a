pub mod cash_flow;
pub mod config;
pub mod error;
pub mod tax_regime;
pub mod types;

pub mod capital_needs;
pub mod impact;

#[cfg(feature = "projection")]
pub mod projection;

#[cfg(feature = "strategies")]
pub mod strategies;

#[cfg(feature = "optimization")]
pub mod optimizer;

pub use error::SplitPaymentError;
pub use types::*;

/// Standard result type for all simulator operations
pub type SplitPaymentResult<T> = Result<T, SplitPaymentError>;
