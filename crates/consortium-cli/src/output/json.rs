use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print the full-precision JSON envelope to stdout.
pub fn print_json(value: &Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)
}
