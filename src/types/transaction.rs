//! Transaction-related types for the sales pipeline
//!
//! A record moves through three shapes: the raw `SourceLine`, the parsed but
//! unchecked `TransactionCandidate`, and the type- and range-checked
//! `ValidatedTransaction`. A candidate that fails a rule becomes a
//! `Rejection` instead.

use crate::types::error::{ParseFailure, RejectionReason};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 1-based line number in the decoded input file
///
/// Used to resequence records after parallel processing.
pub type LineNumber = usize;

/// One raw line of input, tagged with its position in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub line_no: LineNumber,
    pub text: String,
}

/// Parsed-but-unvalidated transaction record
///
/// Every field is kept as the trimmed text found on the line. Numeric
/// fields are not interpreted until validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCandidate {
    /// Line the candidate was parsed from
    pub line_no: LineNumber,
    pub transaction_id: String,
    pub product_id: String,
    pub quantity: String,
    pub unit_price: String,
    pub region: String,
    pub timestamp: String,
}

/// A record that passed every business rule
///
/// Created only by the validator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedTransaction {
    pub line_no: LineNumber,
    pub transaction_id: String,
    pub product_id: String,
    /// Always at least the configured minimum quantity
    pub quantity: i64,
    /// Always at least the configured minimum price
    pub unit_price: Decimal,
    /// Canonical spelling taken from the configured region set
    pub region: String,
    pub timestamp: String,
}

impl ValidatedTransaction {
    /// Revenue for this line: quantity times unit price
    ///
    /// Saturates at `Decimal::MAX` (or `MIN`) when the product does not fit.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }
}

/// A candidate that failed validation, with the first failing rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub candidate: TransactionCandidate,
    pub reason: RejectionReason,
}

/// A line the parser could not turn into a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineFailure {
    pub line_no: LineNumber,
    pub failure: ParseFailure,
    /// The raw line as decoded
    pub text: String,
}
