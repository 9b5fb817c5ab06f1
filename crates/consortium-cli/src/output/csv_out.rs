use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// Row-shaped output (sweeps, schedules, fee tables) wins over the result
/// object; otherwise the result becomes a two-column field/value sheet.
/// Stops at the first write error, so a closed pipe is reported once.
pub fn print_csv(value: &Value) -> csv::Result<()> {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    write_csv(&mut wtr, value)?;
    wtr.flush()?;
    Ok(())
}

fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    match value {
        Value::Object(map) => {
            if let Some(Value::Array(results)) = map.get("results") {
                write_array_csv(wtr, results)
            } else if let Some(Value::Object(result)) = map.get("result") {
                wtr.write_record(["field", "value"])?;
                write_fields(wtr, "", result)
            } else {
                wtr.write_record(["field", "value"])?;
                write_fields(wtr, "", map)
            }
        }
        Value::Array(arr) => write_array_csv(wtr, arr),
        _ => wtr.write_record([&format_csv_value(value)]),
    }
}

fn write_fields<W: io::Write>(
    wtr: &mut csv::Writer<W>,
    prefix: &str,
    map: &serde_json::Map<String, Value>,
) -> csv::Result<()> {
    for (key, val) in map {
        let field = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => write_fields(wtr, &field, inner)?,
            _ => wtr.write_record([field.as_str(), &format_csv_value(val)])?,
        }
    }
    Ok(())
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    if arr.is_empty() {
        return Ok(());
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        wtr.write_record(&headers)?;

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                wtr.write_record(&row)?;
            }
        }
    } else {
        for item in arr {
            wtr.write_record([&format_csv_value(item)])?;
        }
    }
    Ok(())
}

/// CSV keeps full precision; spreadsheets do their own rounding.
fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
