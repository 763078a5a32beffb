//! # Extraction Error Types
//!
//! Error handling for domain metadata resolution, graph store access and
//! snapshot loading.
//!
//! ## Error Categories
//!
//! - **Store Errors**: a query against the graph store failed, or a returned
//!   record could not be decoded into the typed extraction model
//! - **Access Errors**: a caller supplied a user role that the graph does not know
//! - **Snapshot Errors**: file I/O and parsing issues while loading a graph snapshot
//!
//! Missing metadata for a `(standard, domain)` pair is NOT an error: resolution
//! returns `Ok(None)` and the caller decides what an unconfigured domain means.
//! Classes that were never materialized, classes hidden from a role and sort
//! keys that were not extracted are degraded-but-continue conditions: they are
//! logged and reported, never raised.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphStoreError {
    #[error("Graph query failed: {message}")]
    Query { message: String },
    #[error("Failed to decode `{field}` from graph record: {message}")]
    Decode { field: String, message: String },
}

impl GraphStoreError {
    /// Create a Query error with context information
    ///
    /// # Example
    /// ```ignore
    /// GraphStoreError::query_error_with_context(
    ///     "connection reset",
    ///     "While fetching domain metadata"
    /// )
    /// ```
    pub fn query_error_with_context(
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        GraphStoreError::Query {
            message: format!("{}\n  Context: {}", message.into(), context.into()),
        }
    }

    pub fn decode(field: impl Into<String>, message: impl Into<String>) -> Self {
        GraphStoreError::Decode {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractionError {
    /// The only fatal condition of the pipeline: the referenced role has no
    /// record in the graph at all.
    #[error("User Role `{role}` does not exist")]
    RoleNotFound { role: String },
    #[error(transparent)]
    Store(#[from] GraphStoreError),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read graph snapshot file: {error}")]
    Read { error: String },
    #[error("Failed to parse graph snapshot: {error}")]
    Parse { error: String },
    #[error("Invalid graph snapshot: {message}")]
    Invalid { message: String },
}
