//! Whole-file encoding fallback
//!
//! The input file is decoded with the first encoding in the configured
//! preference list that decodes every byte cleanly. Mixed encodings within
//! one file are not detected; the file is assumed to use a single encoding.
//!
//! Labels are resolved with `encoding_rs`, which follows the WHATWG
//! encoding standard. `latin-1` and `iso-8859-1` both resolve to
//! windows-1252 there, which maps every byte, so a list containing any of
//! them never falls through to a decoding error.

use crate::types::{LineNumber, PipelineError, SourceLine};
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Text decoded from an input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// Label of the encoding that succeeded, as configured
    pub encoding: String,
}

/// Decode `bytes` with the first configured encoding that fits
///
/// # Errors
///
/// `PipelineError::Decoding` if no label decodes the input without
/// replacement characters. Unknown labels are skipped with a warning.
pub fn decode_bytes(bytes: &[u8], encodings: &[String]) -> Result<DecodedText, PipelineError> {
    for label in encodings {
        let Some(encoding) = Encoding::for_label(label.trim().as_bytes()) else {
            warn!(label = %label, "unknown encoding label, skipping");
            continue;
        };

        let input = if encoding == UTF_8 {
            bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
        } else {
            bytes
        };

        match encoding.decode_without_bom_handling_and_without_replacement(input) {
            Some(text) => {
                debug!(label = %label, resolved = encoding.name(), "decoded input");
                return Ok(DecodedText {
                    text: text.into_owned(),
                    encoding: label.clone(),
                });
            }
            None => debug!(label = %label, "input does not decode cleanly"),
        }
    }

    Err(PipelineError::Decoding {
        tried: encodings.to_vec(),
    })
}

/// Read and decode a file from disk
pub fn decode_file(
    path: &std::path::Path,
    encodings: &[String],
) -> Result<DecodedText, PipelineError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PipelineError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => PipelineError::from(e),
    })?;
    decode_bytes(&bytes, encodings)
}

/// Split decoded text into numbered lines
///
/// Line numbers are 1-based positions in the file, so a skipped header
/// still counts as line 1. Trailing `\r` is removed.
pub fn split_lines(text: &str, has_header: bool) -> Vec<SourceLine> {
    text.lines()
        .enumerate()
        .skip(usize::from(has_header))
        .map(|(idx, line)| SourceLine {
            line_no: idx as LineNumber + 1,
            text: line.strip_suffix('\r').unwrap_or(line).to_string(),
        })
        .collect()
}
