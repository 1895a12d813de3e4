use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A numeric field as it arrives from a deal record.
///
/// Form-backed records hold numbers, numeric text such as `"10,000,000"`, empty
/// strings, or nothing at all. The value is kept as supplied and only resolved
/// to a number when a formula needs it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NumericInput {
    #[default]
    Missing,
    Value(Decimal),
    Text(String),
}

/// Classification of a [`NumericInput`] after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldStatus {
    /// Absent, `null`, or blank text.
    Missing,
    Valid(Decimal),
    /// Text that does not parse as a number. Resolves to zero.
    Invalid(String),
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

impl NumericInput {
    /// Resolve to a number. Missing, blank and unparseable input all count as
    /// zero: an unfilled field contributes nothing to the metrics.
    pub fn resolve(&self) -> Decimal {
        match self.status() {
            FieldStatus::Valid(value) => value,
            FieldStatus::Missing | FieldStatus::Invalid(_) => Decimal::ZERO,
        }
    }

    pub fn status(&self) -> FieldStatus {
        match self {
            NumericInput::Missing => FieldStatus::Missing,
            NumericInput::Value(value) => FieldStatus::Valid(*value),
            NumericInput::Text(raw) if raw.trim().is_empty() => FieldStatus::Missing,
            NumericInput::Text(raw) => match parse_grouped(raw) {
                Some(value) => FieldStatus::Valid(value),
                None => FieldStatus::Invalid(raw.clone()),
            },
        }
    }

    /// True when the field carries anything other than blank/absent input.
    pub fn is_supplied(&self) -> bool {
        !matches!(self.status(), FieldStatus::Missing)
    }
}

/// Parse numeric text, ignoring thousands separators (`,`, `_`, spaces).
///
/// Accepts plain decimals (`"1,250.50"`) and scientific notation (`"1.5e6"`).
/// Returns `None` for anything else, including partially numeric text such as
/// `"12 sf"`.
pub fn parse_grouped(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '_') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned)
        .ok()
        .or_else(|| Decimal::from_scientific(&cleaned).ok())
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

impl From<Decimal> for NumericInput {
    fn from(value: Decimal) -> Self {
        NumericInput::Value(value)
    }
}

impl From<Option<Decimal>> for NumericInput {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(NumericInput::Missing, NumericInput::Value)
    }
}

impl From<&str> for NumericInput {
    fn from(raw: &str) -> Self {
        NumericInput::Text(raw.to_string())
    }
}

impl From<String> for NumericInput {
    fn from(raw: String) -> Self {
        NumericInput::Text(raw)
    }
}

// ---------------------------------------------------------------------------
// Serde
// ---------------------------------------------------------------------------

impl Serialize for NumericInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NumericInput::Missing => serializer.serialize_none(),
            NumericInput::Value(value) => Serialize::serialize(value, serializer),
            NumericInput::Text(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for NumericInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericInputVisitor)
    }
}

struct NumericInputVisitor;

impl<'de> Visitor<'de> for NumericInputVisitor {
    type Value = NumericInput;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, numeric text, or null")
    }

    fn visit_unit<E: de::Error>(self) -> Result<NumericInput, E> {
        Ok(NumericInput::Missing)
    }

    fn visit_none<E: de::Error>(self) -> Result<NumericInput, E> {
        Ok(NumericInput::Missing)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<NumericInput, D::Error> {
        deserializer.deserialize_any(NumericInputVisitor)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<NumericInput, E> {
        Ok(NumericInput::Value(Decimal::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<NumericInput, E> {
        Ok(NumericInput::Value(Decimal::from(v)))
    }

    // Shortest round-trip rendering keeps 0.1 as 0.1 rather than the binary
    // expansion. Values outside Decimal range stay as text and resolve to zero.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<NumericInput, E> {
        let text = v.to_string();
        Ok(match parse_grouped(&text) {
            Some(value) => NumericInput::Value(value),
            None => NumericInput::Text(text),
        })
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<NumericInput, E> {
        Ok(NumericInput::Text(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<NumericInput, E> {
        Ok(NumericInput::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<NumericInput, E> {
        Ok(NumericInput::Text(v))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
