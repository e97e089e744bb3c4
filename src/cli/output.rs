//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::aggregation::AggregateResult;
use crate::cli::args::{OutputFormat, RediSearchArgs};
use crate::error::Result;
use crate::reply::value_to_json;
use crate::result::{Document, SearchResult};

/// Result structure for search operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResults {
    pub total: u64,
    pub duration_ms: u64,
    pub docs: Vec<Document>,
}

impl From<SearchResult> for SearchResults {
    fn from(result: SearchResult) -> Self {
        SearchResults {
            total: result.total,
            duration_ms: result.duration.as_millis() as u64,
            docs: result.docs,
        }
    }
}

/// Result structure for aggregations. Each row keeps its cells as
/// `[name, value]` pairs in reply order; names may repeat.
#[derive(Debug, Serialize, Deserialize)]
pub struct AggregateRows {
    pub total: u64,
    pub rows: Vec<Vec<(String, serde_json::Value)>>,
}

impl From<&AggregateResult> for AggregateRows {
    fn from(result: &AggregateResult) -> Self {
        let rows = result
            .rows
            .iter()
            .map(|row| {
                row.pairs()
                    .iter()
                    .map(|(name, value)| (name.clone(), value_to_json(value)))
                    .collect()
            })
            .collect();
        AggregateRows {
            total: result.total,
            rows,
        }
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &RediSearchArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(message, result, args),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Serialize>(message: &str, result: &T, args: &RediSearchArgs) -> Result<()> {
    if args.verbosity() > 1 {
        println!("{message}");
        println!();
    }

    let value = serde_json::to_value(result)?;
    let type_name = std::any::type_name::<T>();
    if type_name.ends_with("SearchResults") {
        output_search_results_human(&value);
    } else if type_name.ends_with("AggregateRows") {
        output_aggregate_rows_human(&value);
    } else {
        output_generic_human(&value);
    }
    Ok(())
}

fn output_search_results_human(value: &serde_json::Value) {
    let Some(obj) = value.as_object() else {
        return;
    };
    if let Some(docs) = obj.get("docs").and_then(|d| d.as_array()) {
        for (i, doc) in docs.iter().enumerate() {
            let id = doc.get("id").and_then(|v| v.as_str()).unwrap_or("?");
            match doc.get("score").and_then(|s| s.as_f64()) {
                Some(score) => println!("{}) {id} (score: {score:.3})", i + 1),
                None => println!("{}) {id}", i + 1),
            }
            if let Some(payload) = doc.get("payload").and_then(|p| p.as_str()) {
                println!("   payload: {payload}");
            }
            if let Some(fields) = doc.get("fields").and_then(|f| f.as_object()) {
                for (name, field_value) in fields {
                    println!("   {name}: {}", format_value(field_value));
                }
            }
        }
        println!();
    }
    if let Some(total) = obj.get("total").and_then(|t| t.as_u64()) {
        println!("Total: {total}");
    }
    if let Some(duration) = obj.get("duration_ms").and_then(|d| d.as_u64()) {
        println!("Search time: {duration}ms");
    }
}

fn output_aggregate_rows_human(value: &serde_json::Value) {
    let Some(rows) = value.get("rows").and_then(|r| r.as_array()) else {
        return;
    };
    for row in rows {
        if let Some(line) = format_aggregate_row(row) {
            println!("{line}");
        }
    }
    println!();
    println!("Rows: {}", rows.len());
}

/// Render one serialized aggregate row as `name=value` cells.
fn format_aggregate_row(row: &serde_json::Value) -> Option<String> {
    let cells = row.as_array()?;
    let line: Vec<String> = cells
        .iter()
        .filter_map(|cell| match cell.as_array()?.as_slice() {
            [name, value] => Some(format!("{}={}", format_value(name), format_value(value))),
            _ => None,
        })
        .collect();
    Some(line.join("  "))
}

fn output_generic_human(value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(obj) => {
            for (key, val) in obj {
                println!("{key}: {}", format_value(val));
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                println!("{}", format_value(item));
            }
        }
        other => println!("{}", format_value(other)),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &RediSearchArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Format a JSON value on one line.
pub fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "(nil)".to_string(),
        serde_json::Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", inner.join(", "))
        }
        serde_json::Value::Object(obj) => {
            let inner: Vec<String> = obj
                .iter()
                .map(|(k, v)| format!("{k}: {}", format_value(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
        other => other.to_string(),
    }
}
