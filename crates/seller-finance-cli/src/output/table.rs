use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{display_scalar, payload};

/// Headline rows of the comparison: label, all-cash path, financing path.
const COMPARISON_ROWS: [(&str, &str, &str); 4] = [
    ("NPV", "/all_cash/npv", "/financing/npv"),
    ("Total tax", "/all_cash/taxes/total_tax", "/financing/taxes/total_tax"),
    ("Cash at closing", "/all_cash/immediate_proceeds", "/financing/down_payment"),
    ("Total received", "/all_cash/net_proceeds", "/financing/total_payments"),
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    let result = payload(value);

    match result {
        Value::Object(map) if map.contains_key("all_cash") && map.contains_key("financing") => {
            print_comparison(result);
        }
        Value::Object(map) => {
            if let Some(Value::Array(rows)) = map.get("rows").or_else(|| map.get("results")) {
                print_array_table(rows);
                println!();
            }
            print_flat_object(map);
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", display_scalar(result)),
    }

    if let Some(envelope) = value.as_object() {
        print_envelope_notes(envelope);
    }
}

fn print_comparison(result: &Value) {
    let cell = |ptr: &str| result.pointer(ptr).map(display_scalar).unwrap_or_default();

    let mut builder = Builder::default();
    builder.push_record(["", "All cash", "Seller financing"]);
    for (label, cash, financed) in COMPARISON_ROWS {
        builder.push_record([label.to_string(), cell(cash), cell(financed)]);
    }
    builder.push_record([
        "Monthly payment".to_string(),
        String::new(),
        cell("/financing/monthly_payment"),
    ]);
    println!("{}", Table::from(builder));

    let advantage = cell("/npv_advantage");
    let line = format!("NPV advantage of financing: {}", advantage);
    if advantage.starts_with('-') {
        println!("\n{}", line.red());
    } else {
        println!("\n{}", line.green());
    }
    println!(
        "Installment tax advantage (PV): {}",
        cell("/installment_tax_advantage")
    );
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Scalar fields only; nested rows are printed separately.
fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map.iter().filter(|(_, v)| !v.is_array() && !v.is_object()) {
        builder.push_record([key.as_str(), &display_scalar(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for map in arr.iter().filter_map(Value::as_object) {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(display_scalar).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", display_scalar(item));
        }
    }
}
