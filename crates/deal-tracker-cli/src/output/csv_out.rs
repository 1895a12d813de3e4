use serde_json::Value;
use std::io;

use super::{raw_value, result_of};

/// Write the result as two-column CSV (field, value) to stdout.
///
/// Values are written verbatim, sentinel zeros included, so the file can be
/// loaded back without reinterpreting "n/a".
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), result_of(value)) {
        tracing::error!(error = %e, "CSV output failed");
    }
}

fn write_csv<W: io::Write>(writer: W, result: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["field", "value"])?;

    match result {
        Value::Object(map) => {
            for (key, val) in map {
                wtr.write_record([key.as_str(), &raw_value(val)])?;
            }
        }
        other => wtr.write_record(["value", &raw_value(other)])?,
    }

    wtr.flush()?;
    Ok(())
}
