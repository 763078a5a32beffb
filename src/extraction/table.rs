//! Row-major table of extracted values.
//!
//! Column names are kept in order; a JSON `null` stands for a missing value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DataTable {
    /// Build a table from named columns of equal length
    ///
    /// Shorter columns are padded with nulls.
    pub fn from_columns<N, I>(columns: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<Value>)>,
    {
        let (names, values): (Vec<String>, Vec<Vec<Value>>) = columns
            .into_iter()
            .map(|(name, values)| (name.into(), values))
            .unzip();
        let height = values.iter().map(Vec::len).max().unwrap_or(0);
        let rows = (0..height)
            .map(|i| {
                values
                    .iter()
                    .map(|column| column.get(i).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self {
            columns: names,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Values of the first column called `name`
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// Rename columns in place through `rename`, keeping unmapped names
    pub fn rename_columns<F>(&mut self, rename: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for column in self.columns.iter_mut() {
            if let Some(new_name) = rename(column) {
                *column = new_name;
            }
        }
    }

    /// New table holding exactly `columns`, in that order
    ///
    /// Columns not present in this table are filled with nulls; columns not
    /// listed are dropped.
    pub fn select_padded(&self, columns: &[String]) -> DataTable {
        let indices: Vec<Option<usize>> = columns.iter().map(|c| self.column_index(c)).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|index| index.map_or(Value::Null, |i| row[i].clone()))
                    .collect()
            })
            .collect();
        DataTable {
            columns: columns.to_vec(),
            rows,
        }
    }

    /// Reorder rows with `compare`, keeping equal rows in their current order
    pub fn sort_rows_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Vec<Value>, &Vec<Value>) -> std::cmp::Ordering,
    {
        self.rows.sort_by(compare);
    }
}
