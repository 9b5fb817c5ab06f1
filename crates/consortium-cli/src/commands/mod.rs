pub mod fees;
pub mod sensitivity;
pub mod simulation;

use serde_json::Value;

/// Move `result.<key>` up to the envelope so tabular formatters print it as rows.
pub(crate) fn hoist_rows(mut envelope: Value, key: &str) -> Value {
    let rows = envelope
        .get_mut("result")
        .and_then(|r| r.as_object_mut())
        .and_then(|r| r.remove(key));
    if let (Some(rows), Some(map)) = (rows, envelope.as_object_mut()) {
        map.insert("results".into(), rows);
    }
    envelope
}
