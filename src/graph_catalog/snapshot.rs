//! In-memory snapshot of the extraction metadata graph.
//!
//! A snapshot holds the classes, relationships, extraction standards and user
//! roles written by the reshaping pipeline, and answers the typed
//! [`GraphStore`] operations the same way the Cypher queries do against a live
//! graph. Snapshots are loaded from YAML or JSON:
//!
//! ```yaml
//! classes:
//!   - label: Study
//!     short_label: STUDYID
//!     count: 2
//!   - label: Adverse Events
//!     short_label: AE
//!     create: true
//!     count: 2
//! relationships:
//!   - from: Adverse Events
//!     to: Study
//!     type: Study
//!     columns:
//!       - { standard: sdtm, domain: AE, column: STUDYID }
//! standards:
//!   - tag: sdtm
//!     tables:
//!       - domain: AE
//!         sort_order: "STUDYID,USUBJID"
//!         maps_to_class: [Adverse Events]
//!         columns:
//!           - { name: STUDYID, order: 1, core: Req, maps_to_class: Study }
//! roles:
//!   - name: External Researcher
//!     restricted_classes: [Race]
//! ```

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use super::errors::{GraphStoreError, SnapshotError};
use super::model::{
    sort_order_from_columns, Class, ExtractionStandard, SortOrderSpec, SourceColumn, SourceTable,
    UserRole,
};
use crate::graph_store::{ClassRef, DomainSnapshot, GraphStore, MappingRow};

/// Reference to a column of a specific standard's domain table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnRef {
    pub standard: String,
    pub domain: String,
    pub column: String,
}

/// A relationship node between two classes, with the columns it fills
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationshipNode {
    pub from: String,
    pub to: String,
    #[serde(rename = "type", default)]
    pub rel_type: String,
    #[serde(default)]
    pub columns: Vec<ColumnRef>,
}

impl RelationshipNode {
    fn maps_to(&self, standard: &str, domain: &str, column: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.standard == standard && c.domain == domain && c.column == column)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub classes: Vec<Class>,
    #[serde(default)]
    pub relationships: Vec<RelationshipNode>,
    #[serde(default)]
    pub standards: Vec<ExtractionStandard>,
    #[serde(default)]
    pub roles: Vec<UserRole>,
}

impl GraphSnapshot {
    /// Parse and check a YAML snapshot (JSON is valid YAML)
    pub fn from_yaml_str(content: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_yaml::from_str(content).map_err(|e| SnapshotError::Parse {
            error: e.to_string(),
        })?;
        snapshot.check()?;
        Ok(snapshot)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| SnapshotError::Read {
            error: format!("{}: {}", path.as_ref().display(), e),
        })?;
        Self::from_yaml_str(&content)
    }

    /// Structural checks: unique class labels and unique domains per standard
    pub fn check(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::new();
        for class in &self.classes {
            if !seen.insert(class.label.as_str()) {
                return Err(SnapshotError::Invalid {
                    message: format!("duplicate class label '{}'", class.label),
                });
            }
        }
        for standard in &self.standards {
            let mut domains = HashSet::new();
            for table in &standard.tables {
                if !domains.insert(table.domain.as_str()) {
                    return Err(SnapshotError::Invalid {
                        message: format!(
                            "duplicate domain '{}' in standard '{}'",
                            table.domain, standard.tag
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn class(&self, label: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.label == label)
    }

    pub fn table(&self, standard: &str, domain: &str) -> Option<&SourceTable> {
        self.standards
            .iter()
            .find(|s| s.tag == standard)
            .and_then(|s| s.tables.iter().find(|t| t.domain == domain))
    }

    /// Store the declared-order sort order on each named domain table
    ///
    /// Domains unknown to the standard are skipped.
    pub fn set_sort_order(&mut self, standard: &str, domains: &[&str]) {
        let Some(standard) = self.standards.iter_mut().find(|s| s.tag == standard) else {
            return;
        };
        for table in standard
            .tables
            .iter_mut()
            .filter(|t| domains.contains(&t.domain.as_str()))
        {
            let keys = sort_order_from_columns(&table.columns);
            debug!("Setting sort order of {}: {:?}", table.domain, keys);
            table.sort_order = Some(SortOrderSpec::List(keys));
        }
    }

    fn class_ref(&self, label: &str) -> Option<ClassRef> {
        self.class(label).map(|c| ClassRef {
            label: c.label.clone(),
            short_label: c.short_label.clone(),
            create: c.create,
        })
    }

    fn mapping_rows(&self, standard: &str, table: &SourceTable) -> Vec<MappingRow> {
        let mut columns: Vec<&SourceColumn> = table.columns.iter().collect();
        columns.sort_by_key(|c| (c.order.is_none(), c.order));

        let mut rows = Vec::new();
        for column in columns {
            for rel in &self.relationships {
                let (Some(from_class), Some(to_class)) =
                    (self.class_ref(&rel.from), self.class_ref(&rel.to))
                else {
                    continue;
                };
                let via_column = rel.maps_to(standard, &table.domain, &column.name);
                if !via_column && !table.maps_to_class.contains(&rel.to) {
                    continue;
                }
                rows.push(MappingRow {
                    column: column.name.clone(),
                    column_order: column.order,
                    column_core: column.core.clone(),
                    via_column,
                    column_maps_to_class: column.maps_to_class.as_deref() == Some(rel.to.as_str()),
                    from_class,
                    to_class,
                    rel_type: rel.rel_type.clone(),
                });
            }
        }
        rows
    }
}

#[async_trait]
impl GraphStore for GraphSnapshot {
    async fn fetch_domain_metadata(
        &self,
        standard: &str,
        domain: &str,
    ) -> Result<Option<DomainSnapshot>, GraphStoreError> {
        Ok(self.table(standard, domain).map(|table| DomainSnapshot {
            sort_order: table.sort_order.clone(),
            rows: self.mapping_rows(standard, table),
        }))
    }

    async fn fetch_invalid_classes(
        &self,
        classes: &[String],
    ) -> Result<Vec<String>, GraphStoreError> {
        let mut invalid: Vec<String> = Vec::new();
        for label in classes {
            let unmaterialized = self.class(label).is_some_and(|c| !c.is_materialized());
            if unmaterialized && !invalid.contains(label) {
                invalid.push(label.clone());
            }
        }
        Ok(invalid)
    }

    async fn fetch_role_restrictions(
        &self,
        role: &str,
    ) -> Result<Option<Vec<String>>, GraphStoreError> {
        Ok(self
            .roles
            .iter()
            .find(|r| r.name == role)
            .map(|r| r.restricted_classes.clone()))
    }
}
