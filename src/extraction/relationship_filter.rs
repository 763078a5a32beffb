//! Pruning of relationships whose endpoints were filtered out of an extraction.

use log::info;
use serde::{Deserialize, Serialize};

use crate::graph_catalog::model::Relationship;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipPartition {
    pub kept: Vec<Relationship>,
    pub excluded: Vec<Relationship>,
}

/// Drop every relationship with an endpoint in `excluded_classes`
///
/// Must run before extraction so the extractor never sees an edge to a class
/// that is not part of the label set.
pub fn exclude_relationships(
    relationships: &[Relationship],
    excluded_classes: &[String],
) -> RelationshipPartition {
    let (excluded, kept): (Vec<Relationship>, Vec<Relationship>) = relationships
        .iter()
        .cloned()
        .partition(|rel| rel.touches(excluded_classes));

    if !excluded.is_empty() {
        info!("The following rels were excluded: {:?}", excluded);
    }
    RelationshipPartition { kept, excluded }
}
