//! Typed records for the canonical class graph and its extraction metadata.
//!
//! The reshaping pipeline stores these as `Class`, `Relationship`,
//! `Data Extraction Standard`, `Source Data Table`, `Source Data Column` and
//! `User Role` nodes. Extraction only ever reads them.

use serde::{Deserialize, Serialize};

/// Column requirement level that makes a mapped class mandatory
pub const CORE_REQUIRED: &str = "Req";

/// A node type of the canonical graph model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Class {
    pub label: String,
    #[serde(default)]
    pub short_label: Option<String>,
    /// Always materialized, even without an explicit column mapping
    #[serde(default)]
    pub create: bool,
    /// Number of instances created during reshaping
    #[serde(default)]
    pub count: Option<u64>,
}

impl Class {
    /// A class with no count, or a zero count, was never created
    pub fn is_materialized(&self) -> bool {
        matches!(self.count, Some(n) if n > 0)
    }
}

/// A typed edge between two classes
///
/// `short_label` is the short label of the `to` class; it is the name the
/// extracted column carries before renaming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Relationship {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub short_label: Option<String>,
}

impl Relationship {
    /// Check whether either endpoint is one of `classes`
    pub fn touches<S: AsRef<str>>(&self, classes: &[S]) -> bool {
        classes
            .iter()
            .any(|c| c.as_ref() == self.from || c.as_ref() == self.to)
    }
}

/// Sort order as stored on a `Source Data Table`
///
/// Older loaders wrote a comma separated string, newer ones a list; both
/// normalize to the same ordered key list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SortOrderSpec {
    List(Vec<String>),
    Delimited(String),
}

impl SortOrderSpec {
    /// Normalize into an ordered list of column names
    pub fn keys(&self, delimiter: char) -> Vec<String> {
        let raw: Vec<&str> = match self {
            SortOrderSpec::List(keys) => keys.iter().map(String::as_str).collect(),
            SortOrderSpec::Delimited(joined) => joined.split(delimiter).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl From<Vec<String>> for SortOrderSpec {
    fn from(v: Vec<String>) -> Self {
        SortOrderSpec::List(v)
    }
}

impl From<&str> for SortOrderSpec {
    fn from(s: &str) -> Self {
        SortOrderSpec::Delimited(s.to_string())
    }
}

/// A column of a source data table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceColumn {
    pub name: String,
    #[serde(default)]
    pub order: Option<i64>,
    /// Requirement level (`Req`, `Exp`, `Perm`)
    #[serde(default)]
    pub core: Option<String>,
    /// Class this column is filled from
    #[serde(default)]
    pub maps_to_class: Option<String>,
}

/// A domain table of an extraction standard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceTable {
    pub domain: String,
    #[serde(default)]
    pub sort_order: Option<SortOrderSpec>,
    /// Classes the whole table maps to (e.g. the domain's own dataset class)
    #[serde(default)]
    pub maps_to_class: Vec<String>,
    #[serde(default)]
    pub columns: Vec<SourceColumn>,
}

/// A versioned extraction profile grouping domain tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionStandard {
    pub tag: String,
    #[serde(default)]
    pub tables: Vec<SourceTable>,
}

/// A named access-control rule hiding classes from a caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRole {
    pub name: String,
    #[serde(default)]
    pub restricted_classes: Vec<String>,
}

/// Derive the default sort order of a table from its columns' declared order
///
/// Columns without an order go last, keeping their declaration order.
pub fn sort_order_from_columns(columns: &[SourceColumn]) -> Vec<String> {
    let mut ordered: Vec<&SourceColumn> = columns.iter().collect();
    ordered.sort_by_key(|c| (c.order.is_none(), c.order));
    ordered.into_iter().map(|c| c.name.clone()).collect()
}
