//! Record parser
//!
//! Turns one raw line into a `TransactionCandidate`. Malformed lines become
//! a tagged `ParseFailure` so the caller can keep going with the batch.
//!
//! The parser is a pure function over a single line: no I/O, no shared
//! state, safe to call from any number of workers at once.

use crate::config::{PipelineConfig, FIELD_COUNT};
use crate::types::{ParseFailure, SourceLine, TransactionCandidate};

/// Parse one source line into a candidate
///
/// Fields are split on the configured delimiter and trimmed. The field order is:
/// transaction id, product id, quantity, unit price, region, timestamp.
///
/// # Returns
///
/// * `Ok(TransactionCandidate)` - the line had exactly six fields
/// * `Err(ParseFailure)` - empty line, decoding residue, or wrong field count
pub fn parse_line(
    line: &SourceLine,
    config: &PipelineConfig,
) -> Result<TransactionCandidate, ParseFailure> {
    let text = line.text.as_str();

    if text.trim().is_empty() {
        return Err(ParseFailure::EmptyLine);
    }

    if has_encoding_artifact(text) {
        return Err(ParseFailure::EncodingArtifact);
    }

    let fields: Vec<&str> = text.split(config.delimiter).map(str::trim).collect();
    let &[transaction_id, product_id, quantity, unit_price, region, timestamp] = fields.as_slice()
    else {
        return Err(ParseFailure::FieldCountMismatch {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    };

    Ok(TransactionCandidate {
        line_no: line.line_no,
        transaction_id: transaction_id.to_string(),
        product_id: product_id.to_string(),
        quantity: quantity.to_string(),
        unit_price: unit_price.to_string(),
        region: region.to_string(),
        timestamp: timestamp.to_string(),
    })
}

/// Replacement characters and control bytes only appear when a file was
/// decoded with the wrong encoding or is binary garbage. Tabs are allowed.
fn has_encoding_artifact(text: &str) -> bool {
    text.chars()
        .any(|c| c == char::REPLACEMENT_CHARACTER || (c.is_control() && c != '\t'))
}
