//! Cypher implementation of the typed graph store operations.
//!
//! Every operation is a single parameterized query run through a
//! [`QueryRunner`]. Values always travel as parameters; only the fixed graph
//! vocabulary of the reshaping pipeline is part of the query text.

use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};

use super::{DomainSnapshot, GraphStore, MappingRow, Params, QueryRunner, Record};
use crate::graph_catalog::errors::GraphStoreError;
use crate::graph_catalog::model::SortOrderSpec;

/// One row per (column, relationship) pair of the requested domain table.
///
/// `ORDER BY` in Cypher sorts nulls last, so columns without an `Order` follow
/// the declared ones; node ids keep the order stable between runs.
pub const DOMAIN_METADATA_QUERY: &str = r#"
MATCH (sdf:`Data Extraction Standard`{_tag_:$standard})-[:HAS_TABLE]->(sdt:`Source Data Table`{_domain_:$domain}),
      (sdt)-[:HAS_COLUMN]->(sdc:`Source Data Column`),
      (class:Class)<-[:TO]-(rel:Relationship)-[:FROM]->(fromclass:Class)
WITH *, EXISTS((sdc)<-[:MAPS_TO_COLUMN]-(rel)) AS via_column
WHERE via_column OR EXISTS((sdt)-[:MAPS_TO_CLASS]->(class))
OPTIONAL MATCH (sdc)-[r:MAPS_TO_CLASS]->(class)
WITH *
ORDER BY sdc.Order, id(sdc), id(rel)
RETURN
  sdt.SortOrder AS sort_order,
  sdc._columnname_ AS column,
  sdc.Order AS column_order,
  sdc.Core AS column_core,
  via_column,
  r IS NOT NULL AS column_maps_to_class,
  {label: fromclass.label, short_label: fromclass.short_label, create: coalesce(fromclass.create, false)} AS from_class,
  {label: class.label, short_label: class.short_label, create: coalesce(class.create, false)} AS to_class,
  coalesce(rel.relationship_type, '') AS rel_type
"#;

/// Requested classes whose Class node has a zero or missing count
///
/// Labels without a Class node are not returned.
pub const INVALID_CLASSES_QUERY: &str = r#"
MATCH (n:Class)
WHERE n.label IN $classes AND (n.count = 0 OR n.count IS NULL)
RETURN DISTINCT n.label AS class
"#;

/// One record per restricted class; a single record with a null class for a
/// role that restricts nothing; no record for an unknown role.
pub const ROLE_RESTRICTIONS_QUERY: &str = r#"
MATCH (role:`User Role`{name:$user_role})
OPTIONAL MATCH (role)-[:ACCESS_RESTRICTED]->(c:Class)
RETURN DISTINCT role.name AS role, c.label AS class
"#;

pub struct CypherGraphStore<R: QueryRunner> {
    runner: R,
}

impl<R: QueryRunner> CypherGraphStore<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Run `query`, naming the store operation in query failures
    async fn query(
        &self,
        operation: &str,
        query: &str,
        params: Params,
    ) -> Result<Vec<Record>, GraphStoreError> {
        debug!("Running {} with parameters {:?}", operation, params);
        self.runner.run(query, params).await.map_err(|e| match e {
            GraphStoreError::Query { message } => GraphStoreError::query_error_with_context(
                message,
                format!("While running {}", operation),
            ),
            other => other,
        })
    }
}

fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

fn decode_sort_order(record: &Record) -> Result<Option<SortOrderSpec>, GraphStoreError> {
    match record.get("sort_order") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| GraphStoreError::decode("sort_order", e.to_string())),
    }
}

fn decode_row(record: Record) -> Result<MappingRow, GraphStoreError> {
    serde_json::from_value(Value::Object(record))
        .map_err(|e| GraphStoreError::decode("mapping row", e.to_string()))
}

#[async_trait]
impl<R: QueryRunner> GraphStore for CypherGraphStore<R> {
    async fn fetch_domain_metadata(
        &self,
        standard: &str,
        domain: &str,
    ) -> Result<Option<DomainSnapshot>, GraphStoreError> {
        let records = self
            .query(
                "fetch_domain_metadata",
                DOMAIN_METADATA_QUERY,
                params(json!({ "standard": standard, "domain": domain })),
            )
            .await?;

        let Some(first) = records.first() else {
            return Ok(None);
        };
        let sort_order = decode_sort_order(first)?;

        let rows = records
            .into_iter()
            .map(|mut record| {
                record.remove("sort_order");
                decode_row(record)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(DomainSnapshot { sort_order, rows }))
    }

    async fn fetch_invalid_classes(
        &self,
        classes: &[String],
    ) -> Result<Vec<String>, GraphStoreError> {
        let records = self
            .query(
                "fetch_invalid_classes",
                INVALID_CLASSES_QUERY,
                params(json!({ "classes": classes })),
            )
            .await?;

        records
            .iter()
            .map(|record| match record.get("class") {
                Some(Value::String(label)) => Ok(label.clone()),
                other => Err(GraphStoreError::decode(
                    "class",
                    format!("expected a class label, got {:?}", other),
                )),
            })
            .collect()
    }

    async fn fetch_role_restrictions(
        &self,
        role: &str,
    ) -> Result<Option<Vec<String>>, GraphStoreError> {
        let records = self
            .query(
                "fetch_role_restrictions",
                ROLE_RESTRICTIONS_QUERY,
                params(json!({ "user_role": role })),
            )
            .await?;

        if records.is_empty() {
            return Ok(None);
        }

        let restricted = records
            .iter()
            .filter_map(|record| record.get("class").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        Ok(Some(restricted))
    }
}
