//! Graph store boundary.
//!
//! The extraction pipeline never sees query text. It talks to the graph
//! through the typed [`GraphStore`] operations below; how they are answered is
//! up to the implementation:
//!
//! - [`cypher::CypherGraphStore`] translates them into parameterized Cypher and
//!   runs them through a [`QueryRunner`], the single query primitive of an
//!   external graph database
//! - [`crate::graph_catalog::GraphSnapshot`] answers them from an in-memory
//!   snapshot of the extraction metadata graph
//!
//! All operations are read-only.

pub mod cypher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::graph_catalog::errors::GraphStoreError;
use crate::graph_catalog::model::SortOrderSpec;

/// A single record returned by the graph database, keyed by return alias
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Query parameters, always passed separately from the query text
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Parameterized query primitive of an external graph database
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run(&self, query: &str, params: Params) -> Result<Vec<Record>, GraphStoreError>;
}

/// Class endpoint as seen from a mapping row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassRef {
    pub label: String,
    #[serde(default)]
    pub short_label: Option<String>,
    #[serde(default)]
    pub create: bool,
}

/// One (column, relationship) pairing of a domain table
///
/// A row exists when the relationship maps to the column, or when the table
/// itself maps to the relationship's target class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingRow {
    pub column: String,
    #[serde(default)]
    pub column_order: Option<i64>,
    #[serde(default)]
    pub column_core: Option<String>,
    /// The relationship carries a `MAPS_TO_COLUMN` edge to this column
    #[serde(default)]
    pub via_column: bool,
    /// The column carries a `MAPS_TO_CLASS` edge to the target class
    #[serde(default)]
    pub column_maps_to_class: bool,
    pub from_class: ClassRef,
    pub to_class: ClassRef,
    pub rel_type: String,
}

/// Raw extraction metadata of one domain table
///
/// Rows are ordered by column order (undeclared last), then column declaration
/// order, then relationship order in the graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainSnapshot {
    #[serde(default)]
    pub sort_order: Option<SortOrderSpec>,
    #[serde(default)]
    pub rows: Vec<MappingRow>,
}

/// Typed read operations the extraction pipeline needs from the graph
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Mapping rows for `(standard, domain)`, `None` when no such table exists
    async fn fetch_domain_metadata(
        &self,
        standard: &str,
        domain: &str,
    ) -> Result<Option<DomainSnapshot>, GraphStoreError>;

    /// The subset of `classes` whose Class node has a zero or undefined
    /// instance count; labels without a Class node are never included
    async fn fetch_invalid_classes(
        &self,
        classes: &[String],
    ) -> Result<Vec<String>, GraphStoreError>;

    /// Classes hidden from `role`
    ///
    /// `None` means the graph holds no record for the role at all, `Some(vec![])`
    /// a role that exists but restricts nothing.
    async fn fetch_role_restrictions(
        &self,
        role: &str,
    ) -> Result<Option<Vec<String>>, GraphStoreError>;
}
