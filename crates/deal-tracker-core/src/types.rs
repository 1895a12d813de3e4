use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Loan terms and other year counts. May be fractional.
pub type Years = Decimal;

/// Payment counts and holding periods in months. May be fractional.
pub type Months = Decimal;

pub const MONTHS_PER_YEAR: Decimal = dec!(12);

/// A percentage, stored as a fraction (0.06 = 6%).
///
/// Deal records carry percentages in percent units (`6` means 6%). The
/// conversion happens once, in [`Percent::from_percent_units`], and every
/// formula reads the fraction through [`Percent::as_fraction`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(Decimal);

impl Percent {
    pub const ZERO: Percent = Percent(Decimal::ZERO);

    /// `from_percent_units(dec!(80))` is 80%.
    pub fn from_percent_units(units: Decimal) -> Self {
        Percent(units / dec!(100))
    }

    pub fn as_fraction(self) -> Decimal {
        self.0
    }

    pub fn as_percent_units(self) -> Decimal {
        self.0 * dec!(100)
    }

    /// Periodic rate for monthly compounding.
    pub fn monthly_fraction(self) -> Decimal {
        self.0 / MONTHS_PER_YEAR
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
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
