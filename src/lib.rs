//! clinigraph - clinical data domains from a reshaped class graph
//!
//! Source tables are reshaped into a canonical graph of classes and
//! relationships elsewhere. This crate reconstructs domain tables from it:
//! - Extraction metadata resolution per standard and domain
//! - Materialization and role-based class filtering
//! - Column projection to the declared names and order
//! - Deterministic row sorting

pub mod config;
pub mod extraction;
pub mod graph_catalog;
pub mod graph_store;
