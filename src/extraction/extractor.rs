//! Row extraction boundary.
//!
//! Turning a label/relationship selection into rows is the job of an
//! external extractor working directly on the graph. The pipeline only
//! prepares the request and post-processes the returned table.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::table::DataTable;
use crate::graph_catalog::errors::GraphStoreError;
use crate::graph_catalog::model::Relationship;

/// Property-equality constraints per class label
///
/// `{"Study": {"rdfs:label": "CDISCPILOT01"}}` restricts the Study class to a
/// single study.
pub type WhereFilters = BTreeMap<String, BTreeMap<String, Value>>;

/// A class to extract, with its join semantics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSelection {
    pub label: String,
    /// Fetched with outer-join semantics: rows survive when it has no instance
    pub optional: bool,
}

impl ClassSelection {
    pub fn required(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            optional: false,
        }
    }

    pub fn optional(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            optional: true,
        }
    }

    /// Label as understood by marker-based extractors
    pub fn marked_label(&self, marker: &str) -> String {
        if self.optional {
            format!("{}{}", self.label, marker)
        } else {
            self.label.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    pub return_node_ids: bool,
    pub return_property_names: bool,
    /// Name columns by class short label
    pub use_short_label: bool,
    /// Only these properties are read from each node
    pub only_properties: Vec<String>,
    pub limit: Option<usize>,
    /// Suffix used for optional classes by marker-based extractors
    pub optional_marker: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub labels: Vec<ClassSelection>,
    pub relationships: Vec<Relationship>,
    pub where_filters: WhereFilters,
    pub options: ExtractOptions,
}

impl ExtractRequest {
    /// Labels with optional classes carrying the configured marker
    pub fn marked_labels(&self) -> Vec<String> {
        self.labels
            .iter()
            .map(|selection| selection.marked_label(&self.options.optional_marker))
            .collect()
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.labels.iter().any(|selection| selection.label == label)
    }
}

/// Produces the raw rows for an extraction request
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataExtractor: Send + Sync {
    async fn extract(&self, request: &ExtractRequest) -> Result<DataTable, GraphStoreError>;
}
