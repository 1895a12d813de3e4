pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Ratios the engine reports as `0` when they cannot be computed.
const SENTINEL_METRICS: [&str; 5] = ["dscr", "capRate", "cashOnCash", "equityMultiple", "exitValue"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a result field for people: sentinel zeros read as "n/a".
pub(crate) fn display_value(key: &str, value: &Value) -> String {
    if SENTINEL_METRICS.contains(&key) && is_zero(value) {
        return "n/a".to_string();
    }
    raw_value(value)
}

/// Render a result field verbatim.
pub(crate) fn raw_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(raw_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::String(s) => Decimal::from_str(s).is_ok_and(|d| d.is_zero()),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// The `result` object of a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}
