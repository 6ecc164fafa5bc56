//! Sales Pipeline Library
//! # Overview
//!
//! This library validates delimited sales transaction files and enriches
//! every accepted transaction with product metadata from a catalog service.
//! It provides a sequential strategy and a parallel batch strategy that
//! produce identical output.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (candidates, validated transactions, enriched records, errors)
//! - [`config`] - Pipeline and catalog configuration
//! - [`cli`] - CLI arguments parsing
//! - [`io`] - Input decoding, line parsing and output serialization
//! - [`core`] - Business logic components:
//!   - [`core::validator`] - Ordered business rules
//!   - [`core::catalog`] and [`core::catalog_client`] - Catalog lookup and its sources
//!   - [`core::engine`] - Enrichment join
//!   - [`core::summary`] - Run summary
//! - [`strategy`] - End-to-end sync and async runs
//! - [`logging`] - tracing subscriber setup
//!
//! # Data Flow
//!
//! ```text
//! raw lines -> parse_line -> TransactionCandidate -> Validator
//!     -> ValidatedTransaction + Rejection log
//!     -> EnrichmentEngine (joined against the fetched ProductCatalog)
//!     -> EnrichedRecord
//! ```
//!
//! # Rejection Reasons
//!
//! Rules run in a fixed order and the first failing rule names the reason:
//!
//! - **missing-field**: a field is empty
//! - **non-numeric-quantity** / **quantity-below-minimum**
//! - **non-numeric-price** / **price-below-minimum**
//! - **invalid-region**: not in the configured region set (case-insensitive)
//! - **invalid-product-id**: contains the delimiter or whitespace, or lacks the required prefix

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use crate::core::{
    enrich, CatalogSource, EnrichmentEngine, FileCatalogSource, HttpCatalogClient, ProductCatalog,
    RunSummary, StaticCatalogSource, Validator,
};
pub use config::{CatalogConfig, ConfigFile, PipelineConfig};
pub use strategy::{create_strategy, BatchConfig, PipelineRun, ProcessingStrategy};
pub use types::{
    CatalogError, EnrichedRecord, ParseFailure, PipelineError, ProductEntry, Rejection,
    RejectionReason, TransactionCandidate, ValidatedTransaction,
};
