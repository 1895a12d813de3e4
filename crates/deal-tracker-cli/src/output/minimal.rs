use serde_json::Value;

use super::{display_value, result_of};

/// Headline field for each command, in priority order.
const HEADLINE_KEYS: [&str; 4] = ["remainingBalance", "monthlyPayment", "capRate", "noi"];

/// Print just the headline figure from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

fn headline(value: &Value) -> String {
    let result = result_of(value);

    if let Value::Object(map) = result {
        for key in HEADLINE_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return display_value(key, val);
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, display_value(key, val));
        }
    }

    display_value("", result)
}
