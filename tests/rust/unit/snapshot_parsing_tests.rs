//! Parsing of graph snapshots and extraction configuration

#[cfg(test)]
mod snapshot_parsing_tests {
    use clinigraph::config::ExtractionConfig;
    use clinigraph::graph_catalog::{
        sort_order_from_columns, GraphSnapshot, SnapshotError, SortOrderSpec,
    };
    use clinigraph::graph_store::GraphStore;
    use test_case::test_case;

    const GRAPH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/sdtm_graph.yaml");

    #[test]
    fn test_fixture_graph_loads() {
        let graph = GraphSnapshot::from_file(GRAPH).unwrap();
        assert_eq!(graph.classes.len(), 6);
        assert_eq!(graph.relationships.len(), 5);
        assert_eq!(graph.roles.len(), 2);
        assert!(!graph.class("test_class_7").unwrap().is_materialized());
        assert!(graph.class("test_class_6").unwrap().create);
    }

    #[test]
    fn test_sort_order_accepts_list_and_string() {
        let graph = GraphSnapshot::from_file(GRAPH).unwrap();
        let ae = graph.table("test_standard", "AE").unwrap();
        let dm = graph.table("test_standard", "DM").unwrap();
        assert!(matches!(ae.sort_order, Some(SortOrderSpec::List(_))));
        assert_eq!(
            dm.sort_order,
            Some(SortOrderSpec::Delimited("TC3,TC4,TC5".to_string()))
        );
        assert!(graph.table("test_standard", "TS").unwrap().sort_order.is_none());
    }

    #[test_case("TC3,TC4,TC5", vec!["TC3", "TC4", "TC5"] ; "plain")]
    #[test_case(" TC3 , TC4 ,", vec!["TC3", "TC4"] ; "padded with trailing delimiter")]
    #[test_case("", vec![] ; "empty")]
    fn test_delimited_sort_order(raw: &str, expected: Vec<&str>) {
        assert_eq!(SortOrderSpec::from(raw).keys(','), expected);
    }

    #[test]
    fn test_sort_order_from_fixture_columns() {
        let graph = GraphSnapshot::from_file(GRAPH).unwrap();
        let dm = graph.table("test_standard", "DM").unwrap();
        assert_eq!(sort_order_from_columns(&dm.columns), vec!["TC4", "TC5", "TC3"]);
    }

    #[test]
    fn test_set_sort_order_skips_unknown_domains() {
        let mut graph = GraphSnapshot::from_file(GRAPH).unwrap();
        graph.set_sort_order("test_standard", &["AE", "LB"]);
        graph.set_sort_order("other_standard", &["DM"]);
        assert_eq!(
            graph.table("test_standard", "AE").unwrap().sort_order,
            Some(SortOrderSpec::List(vec!["TC1".to_string(), "TC2".to_string()]))
        );
        assert_eq!(
            graph.table("test_standard", "DM").unwrap().sort_order,
            Some(SortOrderSpec::Delimited("TC3,TC4,TC5".to_string()))
        );
    }

    #[test]
    fn test_duplicate_class_is_rejected() {
        let yaml = r#"
classes:
  - label: Study
  - label: Study
"#;
        let err = GraphSnapshot::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid { .. }));
    }

    #[test]
    fn test_malformed_snapshot_is_a_parse_error() {
        let err = GraphSnapshot::from_yaml_str("classes: 5").unwrap_err();
        assert!(matches!(err, SnapshotError::Parse { .. }));
    }

    #[test]
    fn test_json_snapshot() {
        let json = r#"{"classes": [{"label": "Study", "short_label": "STUDYID", "count": 1}]}"#;
        let graph = GraphSnapshot::from_yaml_str(json).unwrap();
        assert!(graph.class("Study").unwrap().is_materialized());
    }

    #[test]
    fn test_snapshot_store_answers() {
        let graph = GraphSnapshot::from_file(GRAPH).unwrap();
        tokio_test::block_on(async {
            let invalid = graph
                .fetch_invalid_classes(&["Study".to_string(), "test_class_7".to_string()])
                .await
                .unwrap();
            assert_eq!(invalid, vec!["test_class_7"]);

            assert_eq!(
                graph.fetch_role_restrictions("test_role").await.unwrap(),
                Some(vec!["test_class_2".to_string()])
            );
            assert_eq!(
                graph.fetch_role_restrictions("Study Lead").await.unwrap(),
                Some(vec![])
            );
            assert_eq!(graph.fetch_role_restrictions("Directors").await.unwrap(), None);

            let ts = graph
                .fetch_domain_metadata("test_standard", "TS")
                .await
                .unwrap()
                .unwrap();
            assert!(ts.rows.is_empty());
        });
    }

    #[test]
    fn test_config_yaml_partial_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extraction.yaml");
        std::fs::write(&path, "study_class: Trial\nsort_order_delimiter: \";\"\n").unwrap();

        let config = ExtractionConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.study_class, "Trial");
        assert_eq!(config.sort_order_delimiter, ';');
        assert_eq!(config.label_property, "rdfs:label");
        assert!(config.check_for_refactored);
    }

    #[test]
    fn test_config_rejects_empty_study_class() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extraction.yaml");
        std::fs::write(&path, "study_class: \"\"\n").unwrap();
        assert!(ExtractionConfig::from_yaml_file(&path).is_err());
    }
}
