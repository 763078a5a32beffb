//! Integration tests - full domain extraction over a graph snapshot
//!
//! These tests run the pipeline end to end against the YAML fixtures in
//! tests/data, with a fixture extractor standing in for the graph engine.

mod domain_extraction_tests;
