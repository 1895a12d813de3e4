use thiserror::Error;

#[derive(Debug, Error)]
pub enum DealError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for DealError {
    fn from(e: serde_json::Error) -> Self {
        DealError::SerializationError(e.to_string())
    }
}

/// Lift a checked `Decimal` operation into a `DealResult`.
pub(crate) fn checked(
    value: Option<rust_decimal::Decimal>,
    context: &str,
) -> crate::DealResult<rust_decimal::Decimal> {
    value.ok_or_else(|| DealError::Overflow {
        context: context.into(),
    })
}
