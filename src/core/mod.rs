//! Core business logic module
//!
//! This module contains the pipeline components between parsing and output:
//! - `validator` - Ordered business rules that accept or reject candidates
//! - `batch_processor` - Parallel parse and validation with resequencing
//! - `traits` - The `CatalogSource` capability
//! - `catalog` - Immutable product lookup and in-memory/file sources
//! - `catalog_client` - HTTP catalog source with pagination and retries
//! - `engine` - Enrichment join of validated transactions against the catalog
//! - `summary` - Aggregated counts for a completed run

pub mod batch_processor;
pub mod catalog;
pub mod catalog_client;
pub mod engine;
pub mod summary;
pub mod traits;
pub mod validator;

pub use batch_processor::{validate_lines, BatchProcessor, ValidationOutcome};
pub use catalog::{
    CatalogBuilder, CatalogSnapshot, CatalogWarning, FileCatalogSource, ProductCatalog,
    StaticCatalogSource,
};
pub use catalog_client::HttpCatalogClient;
pub use engine::{enrich, EnrichmentEngine};
pub use summary::{LineSample, RunSummary, SAMPLE_LIMIT};
pub use traits::CatalogSource;
pub use validator::Validator;
