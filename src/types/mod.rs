//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transaction`: Source lines, candidates, validated transactions and rejections
//! - `product`: Catalog entries and enriched records
//! - `error`: Parse failures, rejection reasons and fatal errors

pub mod error;
pub mod product;
pub mod transaction;

pub use error::{CatalogError, ParseFailure, PipelineError, RejectionReason};
pub use product::{EnrichedRecord, ProductAttributes, ProductEntry, ProductId};
pub use transaction::{
    LineFailure, LineNumber, Rejection, SourceLine, TransactionCandidate, ValidatedTransaction,
};
