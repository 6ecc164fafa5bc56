//! Error types for the sales pipeline
//!
//! This module defines every error and rejection tag that can occur while a
//! batch moves from raw lines to enriched records. Errors are designed to be
//! descriptive and user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **Parse failures**: per-line, recoverable. The line is skipped and counted.
//! - **Rejection reasons**: per-record business-rule failures, recoverable.
//! - **Catalog errors**: fatal once retries are exhausted.
//! - **Pipeline errors**: anything that aborts the whole run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a raw line could not be turned into a transaction candidate
///
/// Parse failures never abort a batch; the caller records them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "reason")]
pub enum ParseFailure {
    /// The line was empty or contained only whitespace
    #[error("empty line")]
    EmptyLine,

    /// The line split into the wrong number of fields
    #[error("field count mismatch: expected {expected}, found {found}")]
    FieldCountMismatch {
        /// Number of fields a record must have
        expected: usize,
        /// Number of fields actually present
        found: usize,
    },

    /// The line carries replacement or control characters left over from decoding
    #[error("encoding artifact")]
    EncodingArtifact,
}

impl ParseFailure {
    /// Stable code used for aggregation in run summaries
    pub fn code(&self) -> &'static str {
        match self {
            ParseFailure::EmptyLine => "empty-line",
            ParseFailure::FieldCountMismatch { .. } => "field-count-mismatch",
            ParseFailure::EncodingArtifact => "encoding-artifact",
        }
    }
}

/// Closed set of validation rejection codes
///
/// Variants are declared in rule order, so sorting by this enum sorts
/// by the order in which the validator applies its rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    /// A required field is absent or blank
    MissingField,
    /// Quantity is not an integer
    NonNumericQuantity,
    /// Quantity parsed but is below the configured minimum
    QuantityBelowMinimum,
    /// Unit price is not a decimal number
    NonNumericPrice,
    /// Unit price parsed but is below the configured minimum
    PriceBelowMinimum,
    /// Region is not in the configured region set
    InvalidRegion,
    /// Product id is syntactically malformed
    InvalidProductId,
}

impl RejectionReason {
    /// Every reason code, in rule order
    pub const ALL: [RejectionReason; 7] = [
        RejectionReason::MissingField,
        RejectionReason::NonNumericQuantity,
        RejectionReason::QuantityBelowMinimum,
        RejectionReason::NonNumericPrice,
        RejectionReason::PriceBelowMinimum,
        RejectionReason::InvalidRegion,
        RejectionReason::InvalidProductId,
    ];

    /// Kebab-case reason code as it appears in logs and reports
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::MissingField => "missing-field",
            RejectionReason::NonNumericQuantity => "non-numeric-quantity",
            RejectionReason::QuantityBelowMinimum => "quantity-below-minimum",
            RejectionReason::NonNumericPrice => "non-numeric-price",
            RejectionReason::PriceBelowMinimum => "price-below-minimum",
            RejectionReason::InvalidRegion => "invalid-region",
            RejectionReason::InvalidProductId => "invalid-product-id",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Errors raised while retrieving the product catalog
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// The catalog could not be retrieved, after retries where they apply
    ///
    /// This is fatal: enrichment never runs against a partial catalog.
    #[error("catalog unavailable after {attempts} attempt(s): {last_error}")]
    Unavailable {
        /// Number of attempts made for the failing request
        attempts: u32,
        /// Description of the last failure
        last_error: String,
    },

    /// The catalog payload could not be understood
    #[error("invalid catalog payload: {message}")]
    InvalidPayload {
        /// What was wrong with the payload
        message: String,
    },

    /// The HTTP client could not be constructed
    #[error("catalog client error: {message}")]
    Client {
        /// Description of the client error
        message: String,
    },
}

/// Fatal error for a pipeline run
///
/// Per-record problems never surface here; only conditions that stop the
/// whole run do.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Input file not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error while reading input or writing output
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// None of the configured encodings decoded the input cleanly
    #[error("Unable to decode input with any of: {}", tried.join(", "))]
    Decoding {
        /// Encoding labels that were attempted
        tried: Vec<String>,
    },

    /// The product catalog could not be fetched
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Output could not be serialized or persisted
    #[error("Output error: {message}")]
    Output {
        /// Description of the output failure
        message: String,
    },

    /// The async runtime could not be created
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the runtime failure
        message: String,
    },

    /// Configuration is inconsistent or unreadable
    #[error("Invalid configuration: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },
}

// Conversion from io::Error to PipelineError
impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        PipelineError::Io {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to PipelineError
impl From<csv::Error> for PipelineError {
    fn from(error: csv::Error) -> Self {
        PipelineError::Output {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(error: serde_json::Error) -> Self {
        PipelineError::Config {
            message: error.to_string(),
        }
    }
}

impl PipelineError {
    /// Create a Config error
    pub fn config(message: impl Into<String>) -> Self {
        PipelineError::Config {
            message: message.into(),
        }
    }

    /// Create an Output error
    pub fn output(message: impl Into<String>) -> Self {
        PipelineError::Output {
            message: message.into(),
        }
    }
}
