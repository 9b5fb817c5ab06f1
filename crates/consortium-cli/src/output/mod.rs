pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::Decimal;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => json::print_json(value)?,
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value)?,
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
    Ok(())
}

/// Decimal strings carrying more than four places are money at full
/// precision; show them in cents. Rates (at most four places) pass through.
pub(crate) fn display_decimal(s: &str) -> String {
    match s.parse::<Decimal>() {
        Ok(d) if d.scale() > 4 => consortium_core::money::round_currency(d).to_string(),
        _ => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_decimal_rounds_money() {
        assert_eq!(display_decimal("892.9452054794520547945205479"), "892.95");
        assert_eq!(display_decimal("0.0012"), "0.0012");
        assert_eq!(display_decimal("vehicle"), "vehicle");
        assert_eq!(display_decimal("73"), "73");
    }
}
