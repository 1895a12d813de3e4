pub mod amortization;
pub mod error;
pub mod sanitize;
pub mod types;

#[cfg(feature = "underwriting")]
pub mod underwriting;

pub use error::DealError;
pub use types::*;

/// Standard result type for all deal-tracker operations
pub type DealResult<T> = Result<T, DealError>;
