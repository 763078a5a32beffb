//! Materialization check: classes the reshaping pipeline never created an
//! instance of cannot be extracted.

use log::error;

use super::Partition;
use crate::graph_catalog::errors::ExtractionError;
use crate::graph_store::GraphStore;

pub struct ClassValidator<'a, S: GraphStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: GraphStore + ?Sized> ClassValidator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Split `classes` into materialized (`kept`) and never-created
    /// (`excluded`) classes, preserving input order in both
    pub async fn partition_by_materialization(
        &self,
        classes: &[String],
    ) -> Result<Partition, ExtractionError> {
        let invalid = self.store.fetch_invalid_classes(classes).await?;
        let partition = Partition::split(classes, |class| invalid.contains(class));

        if !partition.excluded.is_empty() {
            error!(
                "The following classes were excluded as those were never created during refactoring: {:?}",
                partition.excluded
            );
        }
        Ok(partition)
    }
}
