use serde_json::{Map, Value};
use std::io::{self, Write};

use super::payload;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let _ = write_csv(&mut wtr, value);
    let _ = wtr.flush();
}

fn write_csv<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    match payload(value) {
        Value::Object(map) => {
            if let Some(Value::Array(rows)) = map.get("rows").or_else(|| map.get("results")) {
                write_array_csv(wtr, rows)
            } else {
                let mut flat = Vec::new();
                flatten("", map, &mut flat);
                wtr.write_record(["field", "value"])?;
                for (key, val) in flat {
                    wtr.write_record([key, val])?;
                }
                Ok(())
            }
        }
        Value::Array(arr) => write_array_csv(wtr, arr),
        other => wtr.write_record([csv_value(other)]),
    }
}

/// Dotted paths for every scalar leaf. Arrays are skipped; the table
/// and json formats carry those.
fn flatten(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, val) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) => flatten(&path, inner, out),
            Value::Array(_) => {}
            scalar => out.push((path, csv_value(scalar))),
        }
    }
}

fn write_array_csv<W: Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            wtr.write_record([csv_value(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;

    for map in arr.iter().filter_map(Value::as_object) {
        let row: Vec<String> = headers
            .iter()
            .map(|h| map.get(*h).map(csv_value).unwrap_or_default())
            .collect();
        wtr.write_record(&row)?;
    }
    Ok(())
}

fn csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_csv(&mut wtr, value).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_nested_object_flattens() {
        let out = render(&json!({"result": {"a": {"b": "1"}, "c": 2, "flows": [1, 2]}}));
        assert_eq!(out, "field,value\na.b,1\nc,2\n");
    }

    #[test]
    fn test_rows_become_records() {
        let out = render(&json!({"payment": "10", "rows": [{"month": 1, "x": "a"}, {"month": 2, "x": "b"}]}));
        assert_eq!(out, "month,x\n1,a\n2,b\n");
    }
}
