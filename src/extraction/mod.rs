//! Metadata-driven extraction of domain tables.
//!
//! The submodules follow the order in which a request flows through the
//! pipeline: metadata resolution, materialization and access filtering,
//! relationship pruning, extraction, column projection and row sorting.

pub mod access_control;
pub mod class_validator;
pub mod extractor;
pub mod metadata;
pub mod pipeline;
pub mod projector;
pub mod relationship_filter;
pub mod sorter;
pub mod table;

pub use access_control::AccessController;
pub use class_validator::ClassValidator;
pub use extractor::{ClassSelection, DataExtractor, ExtractOptions, ExtractRequest, WhereFilters};
pub use metadata::{DomainMetadata, MetadataResolver, OrderMap, RenameMap};
pub use pipeline::{
    plan_extraction, DomainExtractor, ExtractionOutcome, ExtractionPlan, ExtractionReport,
    ExtractionRequest,
};
pub use projector::project;
pub use relationship_filter::{exclude_relationships, RelationshipPartition};
pub use sorter::{sort, SortOutcome};
pub use table::DataTable;

use serde::{Deserialize, Serialize};

/// Classes split into those that go on to extraction and those that do not
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub kept: Vec<String>,
    pub excluded: Vec<String>,
}

impl Partition {
    /// Split `classes` by `is_excluded`, preserving order in both halves
    pub fn split<F>(classes: &[String], is_excluded: F) -> Self
    where
        F: Fn(&String) -> bool,
    {
        let (excluded, kept): (Vec<String>, Vec<String>) = classes.iter().cloned().partition(|c| is_excluded(c));
        Self { kept, excluded }
    }

    pub fn keep_all(classes: &[String]) -> Self {
        Self {
            kept: classes.to_vec(),
            excluded: Vec::new(),
        }
    }
}
