pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Yaml => json::print_yaml(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar for humans. Long decimal strings are cut to cents.
pub(crate) fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => match s.parse::<Decimal>() {
            Ok(d) if d.scale() > 2 => d
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .to_string(),
            _ => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The payload of a command: the `result` of an envelope, or the value itself.
pub(crate) fn payload(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_scalar_rounds_long_decimals() {
        assert_eq!(display_scalar(&json!("14987.7712345")), "14987.78");
        assert_eq!(display_scalar(&json!("1500000")), "1500000");
        assert_eq!(display_scalar(&json!("Elm St")), "Elm St");
        assert_eq!(display_scalar(&json!(12)), "12");
    }

    #[test]
    fn test_payload_unwraps_envelope() {
        let v = json!({"result": {"npv": "1"}, "warnings": []});
        assert_eq!(payload(&v), &json!({"npv": "1"}));
        let bare = json!({"npv": "1"});
        assert_eq!(payload(&bare), &bare);
    }
}
