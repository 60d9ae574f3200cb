use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tabled::{builder::Builder, Table};

use super::{payload, scalar};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    print_value(payload(value));

    if let Value::Object(envelope) = value {
        print_envelope_notes(envelope);
    }
}

fn print_value(value: &Value) {
    match value {
        Value::Object(map) if is_series_bundle(map) => print_series_bundle(map),
        Value::Object(map) if map.contains_key("rows") && map.contains_key("years") => print_statement_grid(map),
        Value::Object(map) => print_object(map),
        Value::Array(arr) => print_array_table(arr),
        other => println!("{}", format_cell(other)),
    }
}

/// Every field is a `[{period, value}]` series of the same length.
fn is_series_bundle(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map.values().all(|v| {
            v.as_array()
                .is_some_and(|arr| arr.iter().all(|p| p.get("period").is_some() && p.get("value").is_some()))
        })
}

fn print_series_bundle(map: &Map<String, Value>) {
    let names: Vec<&String> = map.keys().collect();
    let len = map.values().filter_map(Value::as_array).map(Vec::len).max().unwrap_or(0);

    let mut builder = Builder::default();
    let mut header = vec!["period".to_string()];
    header.extend(names.iter().map(|n| n.to_string()));
    builder.push_record(header);

    for i in 0..len {
        let period = map
            .values()
            .find_map(|v| v.get(i).and_then(|p| p.get("period")))
            .map(|p| scalar(p, ""))
            .unwrap_or_default();
        let mut row = vec![period];
        for name in &names {
            row.push(map[name.as_str()].get(i).and_then(|p| p.get("value")).map(format_cell).unwrap_or_default());
        }
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

/// Yearly statement: one row per line item, value and YoY per year.
fn print_statement_grid(map: &Map<String, Value>) {
    let years: Vec<String> = map["years"]
        .as_array()
        .map(|ys| ys.iter().map(|y| scalar(y, "")).collect())
        .unwrap_or_default();

    let mut builder = Builder::default();
    let mut header = vec!["item".to_string()];
    for y in &years {
        header.push(y.clone());
        header.push(format!("{y} YoY"));
    }
    builder.push_record(header);

    for row in map["rows"].as_array().into_iter().flatten() {
        let mut record = vec![row.get("label").map(|l| scalar(l, "")).unwrap_or_default()];
        for cell in row.get("cells").and_then(Value::as_array).into_iter().flatten() {
            record.push(cell.get("value").map(format_cell).unwrap_or_default());
            record.push(match cell.get("yoy") {
                Some(Value::Null) | None => "-".to_string(),
                Some(v) => format!("{}%", format_percent(v)),
            });
        }
        builder.push_record(record);
    }
    println!("{}", Table::from(builder));
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested: Vec<(&String, &Value)> = Vec::new();
    let mut scalars = 0;

    for (key, val) in map {
        match val {
            Value::Array(arr) if arr.iter().any(Value::is_object) => nested.push((key, val)),
            Value::Object(_) => nested.push((key, val)),
            _ => {
                builder.push_record([key.as_str(), &format_cell(val)]);
                scalars += 1;
            }
        }
    }
    if scalars > 0 {
        println!("{}", Table::from(builder));
    }

    for (key, val) in nested {
        println!("\n{key}:");
        print_value(val);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        // nested collections (e.g. channel lists) are left to JSON output
        let headers: Vec<String> = first
            .iter()
            .filter(|(_, v)| !v.is_array() && !v.is_object())
            .map(|(k, _)| k.clone())
            .collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_cell(item));
        }
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

/// Decimal strings are shown to two places; everything else as-is.
fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => match Decimal::from_str(s) {
            Ok(d) if d.scale() > 2 => d.round_dp(2).to_string(),
            _ => s.clone(),
        },
        Value::Array(arr) => arr.iter().map(format_cell).collect::<Vec<_>>().join(", "),
        other => scalar(other, "null"),
    }
}

fn format_percent(value: &Value) -> String {
    match value {
        Value::String(s) => Decimal::from_str(s).map(|d| d.round_dp(1).to_string()).unwrap_or_else(|_| s.clone()),
        other => scalar(other, "-"),
    }
}
