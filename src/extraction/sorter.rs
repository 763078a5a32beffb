//! Deterministic row ordering by the sort keys of a domain.

use std::cmp::Ordering;

use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::table::DataTable;

/// Which of the configured sort keys were applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOutcome {
    pub applied: Vec<String>,
    /// Keys naming columns the table does not have
    pub dropped: Vec<String>,
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}

/// Total ascending order over extracted values
///
/// Nulls sort last. Values of different JSON types are ordered by type
/// (booleans, numbers, strings, arrays, objects); arrays and objects compare
/// by their serialized form.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
                x.total_cmp(&y)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            a.to_string().cmp(&b.to_string())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Sort rows ascending by the keys present in the table
///
/// The sort is stable, so rows equal on every key keep their extraction
/// order. Without any usable key the table is returned untouched.
pub fn sort(mut table: DataTable, sort_keys: &[String]) -> (DataTable, SortOutcome) {
    let (applied, dropped): (Vec<String>, Vec<String>) = sort_keys
        .iter()
        .cloned()
        .partition(|key| table.has_column(key));

    if !dropped.is_empty() {
        error!(
            "The following columns were excluded from sort-by-group as those have not been extracted from the graph: {:?}",
            dropped
        );
    }

    if applied.is_empty() {
        warn!("No sort-by-group metadata (`Source Data Table`.SortOrder) was provided; rows keep extraction order");
        return (table, SortOutcome { applied, dropped });
    }

    let indices: Vec<usize> = applied
        .iter()
        .filter_map(|key| table.column_index(key))
        .collect();
    table.sort_rows_by(|left, right| {
        indices
            .iter()
            .map(|&i| compare_values(&left[i], &right[i]))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    (table, SortOutcome { applied, dropped })
}
