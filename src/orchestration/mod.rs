//! Orchestration layer for schema vendoring
//!
//! This module provides the high-level pipeline stages: aggregating every
//! manifest source into vendored schemas, rewriting import coordinates, and
//! publishing or exporting the results.

pub mod aggregator;
pub mod exporter;
pub mod publisher;
pub mod rewriter;

pub use aggregator::VendorAggregator;
pub use exporter::CrdExporter;
pub use publisher::{PublishFailure, PublishReport, SchemaPublisher};
pub use rewriter::ImportPathRewriter;
