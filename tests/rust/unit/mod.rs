//! Unit tests - snapshot loading and configuration
//!
//! These run without any graph backend.

mod snapshot_parsing_tests;
