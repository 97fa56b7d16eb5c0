//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use serde_json::Value;
use tabled::{Table, Tabled};

use crate::Response;

/// Trait for human-readable output.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

/// One field of an API result.
#[derive(Tabled, Debug, PartialEq, Eq)]
pub struct FieldRow {
    pub field: String,
    pub value: String,
}

/// Flatten a result value into table rows.
///
/// Objects give one row per key, arrays one row per element, scalars a
/// single `result` row. Nested values are shown as compact JSON.
pub fn result_rows(result: &Value) -> Vec<FieldRow> {
    match result {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| FieldRow {
                field: k.clone(),
                value: display_value(v),
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| FieldRow {
                field: i.to_string(),
                value: display_value(v),
            })
            .collect(),
        other => vec![FieldRow {
            field: "result".to_string(),
            value: display_value(other),
        }],
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl PrettyPrint for Response {
    fn pretty_print(&self) -> String {
        let endpoint = self.request().endpoint();
        let divider = "─".repeat(endpoint.len().max(30));

        let mut lines = vec![format!("Endpoint: {}", endpoint), divider];

        match (self.status(), self.reason()) {
            (Some(status), Some(reason)) => lines.push(format!("Status:   {status} {reason}")),
            _ => lines.push("Status:   pending".to_string()),
        }

        match self.result() {
            Some(result) => lines.push(Table::new(result_rows(result)).to_string()),
            None => {
                if let Some(body) = self.body() {
                    lines.push(String::from_utf8_lossy(body).into_owned());
                }
            }
        }

        lines.join("\n")
    }
}
