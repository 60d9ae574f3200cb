use serde_json::Value;
use std::io;

use super::{payload, scalar};

type StdoutCsv<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write the primary payload as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match payload(value) {
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        Value::Object(map) => {
            // a bundle of period series becomes one row per period
            let series: Vec<(&String, &Vec<Value>)> = map
                .iter()
                .filter_map(|(k, v)| v.as_array().map(|a| (k, a)))
                .filter(|(_, a)| a.iter().all(|p| p.get("period").is_some()))
                .collect();
            if !series.is_empty() && series.len() == map.len() {
                write_series_csv(&mut wtr, &series);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &scalar(val, "")]);
                }
            }
        }
        other => {
            let _ = wtr.write_record([&scalar(other, "")]);
        }
    }

    let _ = wtr.flush();
}

fn write_series_csv(wtr: &mut StdoutCsv<'_>, series: &[(&String, &Vec<Value>)]) {
    let mut header = vec!["period"];
    header.extend(series.iter().map(|(k, _)| k.as_str()));
    let _ = wtr.write_record(&header);

    let len = series.iter().map(|(_, a)| a.len()).max().unwrap_or(0);
    for i in 0..len {
        let period = series
            .iter()
            .find_map(|(_, a)| a.get(i).and_then(|p| p.get("period")))
            .map(|p| scalar(p, ""))
            .unwrap_or_default();
        let mut row = vec![period];
        for (_, a) in series {
            row.push(a.get(i).and_then(|p| p.get("value")).map(|v| scalar(v, "")).unwrap_or_default());
        }
        let _ = wtr.write_record(&row);
    }
}

fn write_array_csv(wtr: &mut StdoutCsv<'_>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first
            .iter()
            .filter(|(_, v)| !v.is_array())
            .map(|(k, _)| k.as_str())
            .collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(|v| scalar(v, "")).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&scalar(item, "")]);
        }
    }
}
