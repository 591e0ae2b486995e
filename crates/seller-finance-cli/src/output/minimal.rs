use serde_json::Value;

use super::{display_scalar, payload};

/// Headline fields, most telling first.
const PRIORITY_KEYS: [&str; 8] = [
    "npv_advantage",
    "npv",
    "payment",
    "total_tax",
    "url",
    "token",
    "deleted",
    "name",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_text(value));
}

fn minimal_text(value: &Value) -> String {
    let result = payload(value);

    if let Value::Object(map) = result {
        if let Some(val) = PRIORITY_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|val| !val.is_null())
        {
            return display_scalar(val);
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, display_scalar(val));
        }
    }

    if let Value::Array(items) = result {
        return items.len().to_string();
    }

    display_scalar(result)
}
