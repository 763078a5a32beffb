//! Role-based class visibility.
//!
//! A `User Role` node may carry `ACCESS_RESTRICTED` edges to classes its
//! holders must not see. Restricted classes are removed from an extraction
//! rather than failing it; only a role unknown to the graph is fatal.

use log::warn;

use super::Partition;
use crate::graph_catalog::errors::ExtractionError;
use crate::graph_store::GraphStore;

pub struct AccessController<'a, S: GraphStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: GraphStore + ?Sized> AccessController<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Split `classes` into those visible to `role` (`kept`) and those it is
    /// restricted from (`excluded`), preserving input order
    ///
    /// Without a role everything is visible and the store is not queried.
    pub async fn partition_by_access(
        &self,
        classes: &[String],
        role: Option<&str>,
    ) -> Result<Partition, ExtractionError> {
        let Some(role) = role else {
            return Ok(Partition::keep_all(classes));
        };

        let restricted = self
            .store
            .fetch_role_restrictions(role)
            .await?
            .ok_or_else(|| ExtractionError::RoleNotFound {
                role: role.to_string(),
            })?;

        let partition = Partition::split(classes, |class| restricted.contains(class));
        if !partition.excluded.is_empty() {
            warn!(
                "The following classes were excluded as the user_role {} access is restricted: {:?}",
                role, partition.excluded
            );
        }
        Ok(partition)
    }
}
