//! End-to-end extraction of the DM and AE fixture domains

#[cfg(test)]
mod domain_extraction_tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use clinigraph::config::ExtractionConfig;
    use clinigraph::extraction::{
        plan_extraction, DataExtractor, DataTable, DomainExtractor, ExtractRequest,
        ExtractionRequest,
    };
    use clinigraph::graph_catalog::{ExtractionError, GraphSnapshot, GraphStoreError};

    const GRAPH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/sdtm_graph.yaml");

    /// Requests seen by a fixture extractor, readable after it moved into a pipeline
    #[derive(Clone, Default)]
    struct RequestLog(Arc<Mutex<Vec<ExtractRequest>>>);

    impl RequestLog {
        fn record(&self, request: &ExtractRequest) {
            self.0.lock().unwrap().push(request.clone());
        }

        fn all(&self) -> Vec<ExtractRequest> {
            self.0.lock().unwrap().clone()
        }

        fn last(&self) -> ExtractRequest {
            self.all().pop().expect("extractor was never called")
        }

        fn is_empty(&self) -> bool {
            self.0.lock().unwrap().is_empty()
        }
    }

    /// Emits one column per requested class it holds values for, named the
    /// way the graph engine names it (short label or label)
    struct FixtureExtractor {
        graph: GraphSnapshot,
        values: Vec<(String, Vec<Value>)>,
        log: RequestLog,
    }

    impl FixtureExtractor {
        fn new(graph: GraphSnapshot) -> Self {
            Self {
                graph,
                values: Vec::new(),
                log: RequestLog::default(),
            }
        }

        fn with_class(mut self, label: &str, values: Vec<Value>) -> Self {
            self.values.push((label.to_string(), values));
            self
        }

        fn log(&self) -> RequestLog {
            self.log.clone()
        }
    }

    #[async_trait]
    impl DataExtractor for FixtureExtractor {
        async fn extract(&self, request: &ExtractRequest) -> Result<DataTable, GraphStoreError> {
            self.log.record(request);
            let columns = request
                .labels
                .iter()
                .filter_map(|selection| {
                    let (_, values) = self.values.iter().find(|(l, _)| *l == selection.label)?;
                    let class = self.graph.class(&selection.label)?;
                    let name = match (&class.short_label, request.options.use_short_label) {
                        (Some(short_label), true) => short_label.clone(),
                        _ => class.label.clone(),
                    };
                    Some((name, values.clone()))
                })
                .collect::<Vec<_>>();
            Ok(DataTable::from_columns(columns))
        }
    }

    fn load_graph() -> GraphSnapshot {
        GraphSnapshot::from_file(GRAPH).expect("fixture graph should load")
    }

    fn dm_extractor(graph: GraphSnapshot) -> FixtureExtractor {
        FixtureExtractor::new(graph)
            .with_class("Demographics", vec![json!("DM"), json!("DM")])
            .with_class("Study", vec![json!("test_study_2"), json!("test_study_1")])
            .with_class("test_class_6", vec![json!("test_data_1"), json!("test_data_2")])
    }

    fn ae_extractor(graph: GraphSnapshot) -> FixtureExtractor {
        FixtureExtractor::new(graph)
            .with_class("Study", vec![json!("test_study_2"), json!("test_study_1")])
            .with_class("test_class_2", vec![json!("test_data_2"), json!("test_data_1")])
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_dm_extraction() {
        let graph = load_graph();
        let extractor = dm_extractor(graph.clone());
        let pipeline = DomainExtractor::new(graph, extractor, ExtractionConfig::default());

        let outcome = pipeline
            .extract(&ExtractionRequest::new("test_standard", "DM"))
            .await
            .unwrap()
            .expect("DM is configured");

        let expected = DataTable::from_columns(vec![
            ("TC4", vec![json!("test_data_2"), json!("test_data_1")]),
            ("TC5", vec![Value::Null, Value::Null]),
            ("TC3", vec![json!("test_study_1"), json!("test_study_2")]),
        ]);
        assert_eq!(outcome.table, expected);
        assert_eq!(outcome.report.invalid_classes, strings(&["test_class_7"]));
        assert_eq!(outcome.report.sort.applied, strings(&["TC3", "TC4", "TC5"]));
        assert!(outcome.report.sort.dropped.is_empty());
    }

    #[tokio::test]
    async fn test_ae_extraction() {
        let graph = load_graph();
        let extractor = ae_extractor(graph.clone());
        let pipeline = DomainExtractor::new(graph, extractor, ExtractionConfig::default());

        let outcome = pipeline
            .extract(&ExtractionRequest::new("test_standard", "AE"))
            .await
            .unwrap()
            .expect("AE is configured");

        let expected = DataTable::from_columns(vec![
            ("TC1", vec![json!("test_data_1"), json!("test_data_2")]),
            ("TC2", vec![json!("test_study_1"), json!("test_study_2")]),
        ]);
        assert_eq!(outcome.table, expected);
        assert!(outcome.report.excluded_classes().is_empty());
    }

    #[tokio::test]
    async fn test_ae_extraction_restricted_role() {
        let graph = load_graph();
        let extractor = FixtureExtractor::new(graph.clone())
            .with_class("Study", vec![json!("test_study_4"), json!("test_study_3")])
            .with_class("test_class_2", vec![json!("hidden_1"), json!("hidden_2")]);
        let log = extractor.log();
        let pipeline = DomainExtractor::new(graph, extractor, ExtractionConfig::default());

        let outcome = pipeline
            .extract(&ExtractionRequest::new("test_standard", "AE").with_role("test_role"))
            .await
            .unwrap()
            .unwrap();

        let expected = DataTable::from_columns(vec![
            ("TC1", vec![Value::Null, Value::Null]),
            ("TC2", vec![json!("test_study_3"), json!("test_study_4")]),
        ]);
        assert_eq!(outcome.table, expected);
        assert_eq!(outcome.report.restricted_classes, strings(&["test_class_2"]));
        assert_eq!(outcome.report.excluded_relationships.len(), 1);
        assert_eq!(outcome.report.excluded_relationships[0].to, "test_class_2");

        let request = log.last();
        assert!(!request.contains_label("test_class_2"));
        assert!(request.relationships.iter().all(|r| r.to != "test_class_2"));
    }

    #[tokio::test]
    async fn test_unrestricted_role_sees_everything() {
        let graph = load_graph();
        let extractor = ae_extractor(graph.clone());
        let pipeline = DomainExtractor::new(graph, extractor, ExtractionConfig::default());

        let outcome = pipeline
            .extract(&ExtractionRequest::new("test_standard", "AE").with_role("Study Lead"))
            .await
            .unwrap()
            .unwrap();
        assert!(outcome.report.restricted_classes.is_empty());
        assert_eq!(outcome.table.height(), 2);
    }

    #[tokio::test]
    async fn test_unknown_role_is_fatal() {
        let graph = load_graph();
        let extractor = ae_extractor(graph.clone());
        let log = extractor.log();
        let pipeline = DomainExtractor::new(graph, extractor, ExtractionConfig::default());

        let result = pipeline
            .extract(&ExtractionRequest::new("test_standard", "AE").with_role("Directors"))
            .await;
        assert!(matches!(result, Err(ExtractionError::RoleNotFound { role }) if role == "Directors"));
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_unmaterialized_classes_never_reach_extractor() {
        let graph = load_graph();
        let extractor = dm_extractor(graph.clone());
        let log = extractor.log();
        let pipeline = DomainExtractor::new(graph, extractor, ExtractionConfig::default());

        pipeline
            .extract(&ExtractionRequest::new("test_standard", "DM"))
            .await
            .unwrap();

        let request = log.last();
        assert!(!request.contains_label("test_class_7"));
        assert!(request.relationships.iter().all(|r| !r.touches(&["test_class_7"])));
        assert!(request.contains_label("test_class_6"));
    }

    #[tokio::test]
    async fn test_optional_tagging_follows_required_classes() {
        let graph = load_graph();
        let plan = plan_extraction(
            &graph,
            &ExtractionConfig::default(),
            &ExtractionRequest::new("test_standard", "DM"),
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(
            plan.request.marked_labels(),
            strings(&["Demographics**", "test_class_6", "Study**"])
        );
    }

    #[tokio::test]
    async fn test_study_filter_is_passed_to_extractor() {
        let graph = load_graph();
        let extractor = ae_extractor(graph.clone());
        let log = extractor.log();
        let pipeline = DomainExtractor::new(graph, extractor, ExtractionConfig::default());

        pipeline
            .extract(&ExtractionRequest::new("test_standard", "AE").with_study("test_study_1"))
            .await
            .unwrap();

        let request = log.last();
        assert_eq!(request.where_filters["Study"]["rdfs:label"], json!("test_study_1"));
    }

    #[tokio::test]
    async fn test_domain_without_mappings_is_skipped() {
        let graph = load_graph();
        let extractor = ae_extractor(graph.clone());
        let log = extractor.log();
        let pipeline = DomainExtractor::new(graph, extractor, ExtractionConfig::default());

        for domain in ["TS", "XX"] {
            let outcome = pipeline
                .extract(&ExtractionRequest::new("test_standard", domain))
                .await
                .unwrap();
            assert!(outcome.is_none(), "{} should not be extracted", domain);
        }
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_extraction_is_deterministic() {
        let graph = load_graph();
        let extractor = dm_extractor(graph.clone());
        let log = extractor.log();
        let pipeline = DomainExtractor::new(graph, extractor, ExtractionConfig::default());
        let request = ExtractionRequest::new("test_standard", "DM");

        let first = pipeline.extract(&request).await.unwrap().unwrap();
        let second = pipeline.extract(&request).await.unwrap().unwrap();
        assert_eq!(first, second);

        let requests = log.all();
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test]
    async fn test_sort_order_from_declared_columns() {
        let mut graph = load_graph();
        graph.set_sort_order("test_standard", &["DM"]);

        let plan = plan_extraction(
            &graph,
            &ExtractionConfig::default(),
            &ExtractionRequest::new("test_standard", "DM"),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(plan.metadata.sort_keys, strings(&["TC4", "TC5", "TC3"]));

        let extractor = dm_extractor(graph.clone());
        let pipeline = DomainExtractor::new(graph, extractor, ExtractionConfig::default());
        let outcome = pipeline
            .extract(&ExtractionRequest::new("test_standard", "DM"))
            .await
            .unwrap()
            .unwrap();
        let tc4: Vec<&Value> = outcome.table.column("TC4").unwrap();
        assert_eq!(tc4, vec![&json!("test_data_1"), &json!("test_data_2")]);
    }

    #[tokio::test]
    async fn test_injected_study_without_class_node_is_kept() {
        let mut graph = load_graph();
        graph.classes.retain(|class| class.label != "Study");
        graph
            .relationships
            .retain(|rel| rel.to != "Study" && rel.from != "Study");

        let plan = plan_extraction(
            &graph,
            &ExtractionConfig::default(),
            &ExtractionRequest::new("test_standard", "AE"),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(plan.metadata.classes[0], "Study");
        assert!(plan.request.contains_label("Study"));
        assert!(plan.report.invalid_classes.is_empty());
    }

    #[tokio::test]
    async fn test_without_materialization_check_keeps_all_classes() {
        let graph = load_graph();
        let config = ExtractionConfig {
            check_for_refactored: false,
            ..Default::default()
        };
        let plan = plan_extraction(&graph, &config, &ExtractionRequest::new("test_standard", "DM"))
            .await
            .unwrap()
            .unwrap();
        assert!(plan.request.contains_label("test_class_7"));
        assert!(plan.report.invalid_classes.is_empty());
    }
}
