use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Plan JSON piped on stdin. `None` when stdin is a terminal or carries nothing.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    read_piped(io::stdin().lock())
}

fn read_piped<T: DeserializeOwned, R: Read>(
    mut reader: R,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let parsed = serde_json::from_str(trimmed)
        .map_err(|e| format!("Invalid JSON on stdin: {e}"))?;
    Ok(Some(parsed))
}
