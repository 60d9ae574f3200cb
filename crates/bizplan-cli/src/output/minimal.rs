use serde_json::Value;

use super::{payload, scalar};

/// Print just the key answer of a command.
///
/// Looks for well-known result fields in priority order, then falls back to
/// the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result = payload(value);

    let priority_keys = [
        "text",
        "reason",
        "profitability",
        "operatingProfit",
        "id",
        "records",
        "comparison",
    ];

    match result {
        Value::Object(map) => {
            for key in &priority_keys {
                match map.get(*key) {
                    Some(Value::Array(arr)) => {
                        println!("{key}: {}", last_value(arr));
                        return;
                    }
                    Some(val) if !val.is_null() => {
                        println!("{}", scalar(val, "null"));
                        return;
                    }
                    _ => {}
                }
            }
            if let Some((key, val)) = map.iter().next() {
                println!("{key}: {}", scalar(val, "null"));
            }
        }
        Value::Array(arr) => println!("{} items", arr.len()),
        other => println!("{}", scalar(other, "null")),
    }
}

/// Final element of a series, or its count when elements are not series points.
fn last_value(arr: &[Value]) -> String {
    match arr.last() {
        Some(point) if point.get("value").is_some() => {
            let period = point.get("period").map(|p| scalar(p, "")).unwrap_or_default();
            format!("{period} {}", scalar(&point["value"], "null"))
        }
        _ => format!("{} entries", arr.len()),
    }
}
