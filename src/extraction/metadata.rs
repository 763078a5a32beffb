//! Domain metadata resolution.
//!
//! Turns the raw mapping rows of a `Source Data Table` into everything the
//! rest of the pipeline needs: which classes and relationships to extract,
//! which classes are mandatory, how extracted columns are renamed, in which
//! order the final columns appear and which columns rows are sorted by.

use std::collections::{BTreeSet, HashSet};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfig;
use crate::graph_catalog::errors::ExtractionError;
use crate::graph_catalog::model::{Relationship, CORE_REQUIRED};
use crate::graph_store::{DomainSnapshot, GraphStore, MappingRow};

/// Ordered rename mapping from extracted to declared column names
///
/// A declared column name is claimed by at most one extracted column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameMap(Vec<(String, String)>);

impl RenameMap {
    /// Add `source -> target` unless another source already maps to `target`
    ///
    /// Identity renames are ignored. Returns whether the entry was added.
    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) -> bool {
        let (source, target) = (source.into(), target.into());
        if source == target {
            return false;
        }
        if let Some((taken_by, _)) = self.0.iter().find(|(_, t)| *t == target) {
            debug!(
                "Dropping rename {} -> {}: {} already maps there",
                source, target, taken_by
            );
            return false;
        }
        match self.0.iter_mut().find(|(s, _)| *s == source) {
            Some(entry) => entry.1 = target,
            None => self.0.push((source, target)),
        }
        true
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, t)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }
}

/// Pairs collapse per source first (a later pair for the same source replaces
/// the earlier target in place), then targets are claimed first-wins.
impl<S: Into<String>, T: Into<String>> FromIterator<(S, T)> for RenameMap {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for (source, target) in iter {
            let (source, target) = (source.into(), target.into());
            match pairs.iter_mut().find(|(s, _)| *s == source) {
                Some(pair) => pair.1 = target,
                None => pairs.push((source, target)),
            }
        }

        let mut map = RenameMap::default();
        for (source, target) in pairs {
            map.insert(source, target);
        }
        map
    }
}

/// Declared column order, in the order columns were encountered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderMap(Vec<(String, Option<i64>)>);

impl OrderMap {
    /// Record a column; the first order seen for a column is kept
    pub fn insert(&mut self, column: impl Into<String>, order: Option<i64>) {
        let column = column.into();
        if !self.0.iter().any(|(c, _)| *c == column) {
            self.0.push((column, order));
        }
    }

    pub fn get(&self, column: &str) -> Option<Option<i64>> {
        self.0.iter().find(|(c, _)| c == column).map(|(_, o)| *o)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column names sorted by declared order
    ///
    /// Columns without an order come after all declared ones and keep their
    /// encounter order, as do columns sharing an order.
    pub fn canonical_order(&self) -> Vec<String> {
        let mut entries: Vec<&(String, Option<i64>)> = self.0.iter().collect();
        entries.sort_by_key(|(_, order)| (order.is_none(), *order));
        entries.into_iter().map(|(c, _)| c.clone()).collect()
    }
}

impl<S: Into<String>> FromIterator<(S, Option<i64>)> for OrderMap {
    fn from_iter<I: IntoIterator<Item = (S, Option<i64>)>>(iter: I) -> Self {
        let mut map = OrderMap::default();
        for (column, order) in iter {
            map.insert(column, order);
        }
        map
    }
}

/// Everything the pipeline knows about a domain before touching any data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainMetadata {
    pub relationships: Vec<Relationship>,
    /// Deduplicated; always contains the study class
    pub classes: Vec<String>,
    pub required_classes: BTreeSet<String>,
    pub rename_map: RenameMap,
    pub order_map: OrderMap,
    pub sort_keys: Vec<String>,
}

impl DomainMetadata {
    pub fn is_required(&self, class: &str) -> bool {
        self.required_classes.contains(class)
    }
}

fn push_unique(list: &mut Vec<String>, seen: &mut HashSet<String>, value: &str) {
    if seen.insert(value.to_string()) {
        list.push(value.to_string());
    }
}

/// Any row of a `Req` column requires its target, including rows matched only
/// through the table's own class mapping
fn row_requires_target(row: &MappingRow) -> bool {
    row.to_class.create || row.column_core.as_deref() == Some(CORE_REQUIRED)
}

/// Aggregate the mapping rows of a domain table
///
/// Rows are expected in traversal order (column order first); the rename
/// and column order rules below rely on it.
pub fn build_metadata(snapshot: &DomainSnapshot, config: &ExtractionConfig) -> DomainMetadata {
    let mut relationships: Vec<Relationship> = Vec::new();
    let mut from_classes = Vec::new();
    let mut to_classes = Vec::new();
    let (mut seen_from, mut seen_to) = (HashSet::new(), HashSet::new());
    let mut required_classes = BTreeSet::new();
    let mut rename_pairs: Vec<(&str, &str)> = Vec::new();
    let mut order_map = OrderMap::default();

    for row in &snapshot.rows {
        let relationship = Relationship {
            from: row.from_class.label.clone(),
            to: row.to_class.label.clone(),
            rel_type: row.rel_type.clone(),
            short_label: row.to_class.short_label.clone(),
        };
        if !relationships.contains(&relationship) {
            relationships.push(relationship);
        }

        push_unique(&mut from_classes, &mut seen_from, &row.from_class.label);
        push_unique(&mut to_classes, &mut seen_to, &row.to_class.label);

        if row_requires_target(row) {
            required_classes.insert(row.to_class.label.clone());
        }
        if row.from_class.create {
            required_classes.insert(row.from_class.label.clone());
        }

        if row.column_maps_to_class {
            if let Some(short_label) = &row.to_class.short_label {
                rename_pairs.push((short_label.as_str(), row.column.as_str()));
            }
        }

        order_map.insert(row.column.as_str(), row.column_order);
    }

    let mut classes = Vec::new();
    let mut seen = HashSet::new();
    if !from_classes.contains(&config.study_class) && !to_classes.contains(&config.study_class) {
        push_unique(&mut classes, &mut seen, &config.study_class);
    }
    for class in from_classes.iter().chain(to_classes.iter()) {
        push_unique(&mut classes, &mut seen, class);
    }

    let sort_keys = snapshot
        .sort_order
        .as_ref()
        .map(|spec| spec.keys(config.sort_order_delimiter))
        .unwrap_or_default();

    DomainMetadata {
        relationships,
        classes,
        required_classes,
        rename_map: rename_pairs.into_iter().collect(),
        order_map,
        sort_keys,
    }
}

/// Resolves the extraction metadata of `(standard, domain)` pairs
pub struct MetadataResolver<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    config: &'a ExtractionConfig,
}

impl<'a, S: GraphStore + ?Sized> MetadataResolver<'a, S> {
    pub fn new(store: &'a S, config: &'a ExtractionConfig) -> Self {
        Self { store, config }
    }

    /// `Ok(None)` when the standard has no such domain table, or the table has
    /// no class mapped to any of its columns
    pub async fn resolve(
        &self,
        standard: &str,
        domain: &str,
    ) -> Result<Option<DomainMetadata>, ExtractionError> {
        let Some(snapshot) = self.store.fetch_domain_metadata(standard, domain).await? else {
            info!("No table '{}' configured for standard '{}'", domain, standard);
            return Ok(None);
        };
        if snapshot.rows.is_empty() {
            info!(
                "Table '{}' of standard '{}' has no class mappings",
                domain, standard
            );
            return Ok(None);
        }

        let metadata = build_metadata(&snapshot, self.config);
        debug!("Resolved metadata for {}/{}: {:?}", standard, domain, metadata);
        Ok(Some(metadata))
    }
}
