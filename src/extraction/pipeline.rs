//! Domain extraction pipeline.
//!
//! ```text
//! MetadataResolver ─► ClassValidator ─► AccessController ─► RelationshipFilter
//!        ─► DataExtractor ─► ColumnProjector ─► ResultSorter ─► DataTable
//! ```
//!
//! Everything up to the extractor is exposed separately as [`plan_extraction`]
//! so a caller can inspect what would be fetched without fetching it.
//!
//! Every step reads the graph; nothing is written. Counts and role
//! restrictions are read after the metadata, so a class invalidated in between
//! may still be listed in the resolved metadata.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::access_control::AccessController;
use super::class_validator::ClassValidator;
use super::extractor::{ClassSelection, DataExtractor, ExtractOptions, ExtractRequest, WhereFilters};
use super::metadata::{DomainMetadata, MetadataResolver};
use super::projector::project;
use super::relationship_filter::exclude_relationships;
use super::sorter::{sort, SortOutcome};
use super::table::DataTable;
use crate::config::ExtractionConfig;
use crate::graph_catalog::errors::ExtractionError;
use crate::graph_catalog::model::Relationship;
use crate::graph_store::GraphStore;

/// What a caller asks for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    pub standard: String,
    pub domain: String,
    /// Restrict the study class to this study (by its label property)
    #[serde(default)]
    pub study: Option<String>,
    #[serde(default)]
    pub where_filters: WhereFilters,
    /// Hide the classes this role is restricted from
    #[serde(default)]
    pub role: Option<String>,
}

impl ExtractionRequest {
    pub fn new(standard: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            standard: standard.into(),
            domain: domain.into(),
            ..Default::default()
        }
    }

    pub fn with_study(mut self, study: impl Into<String>) -> Self {
        self.study = Some(study.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_filter(
        mut self,
        class: impl Into<String>,
        property: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.where_filters
            .entry(class.into())
            .or_default()
            .insert(property.into(), value.into());
        self
    }
}

/// Everything that was left out of an extraction, and why
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    /// Never created during reshaping
    pub invalid_classes: Vec<String>,
    /// Hidden from the requesting role
    pub restricted_classes: Vec<String>,
    /// Relationships touching an invalid or restricted class
    pub excluded_relationships: Vec<Relationship>,
    pub sort: SortOutcome,
}

impl ExtractionReport {
    pub fn excluded_classes(&self) -> Vec<String> {
        self.restricted_classes
            .iter()
            .chain(self.invalid_classes.iter())
            .cloned()
            .collect()
    }
}

/// Resolved extraction, ready to be handed to a [`DataExtractor`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionPlan {
    pub metadata: DomainMetadata,
    pub request: ExtractRequest,
    pub report: ExtractionReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub table: DataTable,
    pub report: ExtractionReport,
}

/// Tag classes for the extractor
///
/// Required classes are fetched strictly, all others optionally. When the
/// domain declares no required class at all, every class is fetched strictly.
pub fn select_labels(classes: &[String], metadata: &DomainMetadata) -> Vec<ClassSelection> {
    let strict_only = metadata.required_classes.is_empty();
    classes
        .iter()
        .map(|class| {
            if strict_only || metadata.is_required(class) {
                ClassSelection::required(class.as_str())
            } else {
                ClassSelection::optional(class.as_str())
            }
        })
        .collect()
}

fn extract_options(config: &ExtractionConfig) -> ExtractOptions {
    ExtractOptions {
        return_node_ids: false,
        return_property_names: false,
        use_short_label: config.use_short_label,
        only_properties: vec![config.label_property.clone()],
        limit: None,
        optional_marker: config.optional_marker.clone(),
    }
}

/// Caller filters, with the study filter replacing any study class filter
fn where_filters(config: &ExtractionConfig, request: &ExtractionRequest) -> WhereFilters {
    let mut filters = request.where_filters.clone();
    if let Some(study) = &request.study {
        filters.insert(
            config.study_class.clone(),
            BTreeMap::from([(config.label_property.clone(), Value::String(study.clone()))]),
        );
    }
    filters
}

/// Resolve and filter everything needed for an extraction, without extracting
///
/// `Ok(None)` when the domain is not configured for the standard.
pub async fn plan_extraction<S: GraphStore + ?Sized>(
    store: &S,
    config: &ExtractionConfig,
    request: &ExtractionRequest,
) -> Result<Option<ExtractionPlan>, ExtractionError> {
    let resolver = MetadataResolver::new(store, config);
    let Some(metadata) = resolver.resolve(&request.standard, &request.domain).await? else {
        return Ok(None);
    };

    let mut report = ExtractionReport::default();
    let mut classes = metadata.classes.clone();

    if config.check_for_refactored {
        let partition = ClassValidator::new(store)
            .partition_by_materialization(&classes)
            .await?;
        classes = partition.kept;
        report.invalid_classes = partition.excluded;
    }

    let partition = AccessController::new(store)
        .partition_by_access(&classes, request.role.as_deref())
        .await?;
    classes = partition.kept;
    report.restricted_classes = partition.excluded;

    let labels = select_labels(&classes, &metadata);
    debug!("Getting classes: {:?}", labels);

    let excluded_classes = report.excluded_classes();
    let relationships = if excluded_classes.is_empty() {
        metadata.relationships.clone()
    } else {
        info!("Excluding the following classes from rels: {:?}", excluded_classes);
        let partition = exclude_relationships(&metadata.relationships, &excluded_classes);
        report.excluded_relationships = partition.excluded;
        partition.kept
    };

    let extract_request = ExtractRequest {
        labels,
        relationships,
        where_filters: where_filters(config, request),
        options: extract_options(config),
    };

    Ok(Some(ExtractionPlan {
        metadata,
        request: extract_request,
        report,
    }))
}

pub struct DomainExtractor<S: GraphStore, E: DataExtractor> {
    store: S,
    extractor: E,
    config: ExtractionConfig,
}

impl<S: GraphStore, E: DataExtractor> DomainExtractor<S, E> {
    pub fn new(store: S, extractor: E, config: ExtractionConfig) -> Self {
        Self {
            store,
            extractor,
            config,
        }
    }

    /// Resolve and filter everything needed for an extraction
    ///
    /// `Ok(None)` when the domain is not configured for the standard.
    pub async fn plan(
        &self,
        request: &ExtractionRequest,
    ) -> Result<Option<ExtractionPlan>, ExtractionError> {
        plan_extraction(&self.store, &self.config, request).await
    }

    /// Extract, project and sort the domain table
    ///
    /// `Ok(None)` when the domain is not configured for the standard. The only
    /// fatal condition besides store failures is an unknown role.
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<Option<ExtractionOutcome>, ExtractionError> {
        let Some(plan) = self.plan(request).await? else {
            return Ok(None);
        };
        let ExtractionPlan {
            metadata,
            request: extract_request,
            mut report,
        } = plan;

        let raw = self.extractor.extract(&extract_request).await?;
        debug!(
            "Extracted {} rows with columns {:?}",
            raw.height(),
            raw.columns()
        );

        let projected = project(raw, &metadata.rename_map, &metadata.order_map);
        let (table, sort_outcome) = sort(projected, &metadata.sort_keys);
        report.sort = sort_outcome;

        Ok(Some(ExtractionOutcome { table, report }))
    }
}
