use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{display_value, result_of};

/// Format output as a Field/Value table, followed by warnings and methodology.
pub fn print_table(value: &Value) {
    println!("{}", render_table(result_of(value)));

    if let Value::Object(envelope) = value {
        print_notes(envelope);
    }
}

fn render_table(result: &Value) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);

    match result {
        Value::Object(map) => {
            for (key, val) in map {
                builder.push_record([key.as_str(), &display_value(key, val)]);
            }
        }
        other => builder.push_record(["value", &display_value("", other)]),
    }

    Table::from(builder).to_string()
}

fn print_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
