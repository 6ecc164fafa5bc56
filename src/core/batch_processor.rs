//! Batch processing for parse and validation
//!
//! Parsing and validating a line depends on nothing but the line and the
//! configuration, so the input can be cut into batches that run on separate
//! tokio tasks. Batches complete in any order; `ValidationOutcome::resequence`
//! restores input order by line number before anything downstream sees the
//! records.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<Validator>  (shared, read-only rules and configuration)
//! ```

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::core::validator::Validator;
use crate::io::parse_line;
use crate::types::{LineFailure, PipelineError, Rejection, SourceLine, ValidatedTransaction};

/// Accepted records, rejections and parse failures of some set of lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    pub accepted: Vec<ValidatedTransaction>,
    pub rejected: Vec<Rejection>,
    pub parse_failures: Vec<LineFailure>,
}

impl ValidationOutcome {
    /// Parse and validate one line, routing the result to the right bucket
    pub fn push_line(&mut self, line: &SourceLine, validator: &Validator) {
        match parse_line(line, validator.config()) {
            Ok(candidate) => match validator.validate(candidate) {
                Ok(transaction) => self.accepted.push(transaction),
                Err(rejection) => self.rejected.push(rejection),
            },
            Err(failure) => {
                warn!(line = line.line_no, %failure, "skipping malformed line");
                self.parse_failures.push(LineFailure {
                    line_no: line.line_no,
                    failure,
                    text: line.text.clone(),
                });
            }
        }
    }

    pub fn merge(&mut self, other: ValidationOutcome) {
        self.accepted.extend(other.accepted);
        self.rejected.extend(other.rejected);
        self.parse_failures.extend(other.parse_failures);
    }

    /// Restore input order after batches completed out of order
    pub fn resequence(&mut self) {
        self.accepted.sort_by_key(|tx| tx.line_no);
        self.rejected.sort_by_key(|r| r.candidate.line_no);
        self.parse_failures.sort_by_key(|f| f.line_no);
    }

    /// Number of lines accounted for
    pub fn len(&self) -> usize {
        self.accepted.len() + self.rejected.len() + self.parse_failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse and validate lines one after another on the current thread
pub fn validate_lines(lines: &[SourceLine], validator: &Validator) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    for line in lines {
        outcome.push_line(line, validator);
    }
    outcome
}

/// Runs parse and validation batches on tokio tasks
///
/// The processor is cloneable and can be shared across tasks; every clone
/// points at the same validator.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    validator: Arc<Validator>,
}

impl BatchProcessor {
    pub fn new(validator: Arc<Validator>) -> Self {
        Self { validator }
    }

    /// Cut lines into consecutive batches of at most `batch_size` lines
    pub fn partition(&self, lines: Vec<SourceLine>, batch_size: usize) -> Vec<Vec<SourceLine>> {
        let batch_size = batch_size.max(1);
        let mut batches = Vec::with_capacity(lines.len().div_ceil(batch_size));
        let mut lines = lines.into_iter().peekable();
        while lines.peek().is_some() {
            batches.push(lines.by_ref().take(batch_size).collect());
        }
        batches
    }

    /// Parse and validate a single batch
    pub async fn process_batch(&self, batch: Vec<SourceLine>) -> ValidationOutcome {
        validate_lines(&batch, &self.validator)
    }

    /// Process every line with at most `max_concurrent` batches in flight
    ///
    /// The returned outcome is in input order regardless of which batch
    /// finished first. A panicked batch task aborts the run rather than
    /// silently dropping its lines.
    pub async fn process_lines(
        &self,
        lines: Vec<SourceLine>,
        batch_size: usize,
        max_concurrent: usize,
    ) -> Result<ValidationOutcome, PipelineError> {
        let batches = self.partition(lines, batch_size);
        debug!(batches = batches.len(), "dispatching validation batches");

        let mut results = stream::iter(batches)
            .map(|batch| {
                let processor = self.clone();
                tokio::spawn(async move { processor.process_batch(batch).await })
            })
            .buffer_unordered(max_concurrent.max(1));

        let mut outcome = ValidationOutcome::default();
        while let Some(joined) = results.next().await {
            let batch_outcome = joined
                .map_err(|e| PipelineError::Runtime {
                    message: format!("Validation task failed: {}", e),
                })?;
            outcome.merge(batch_outcome);
        }

        outcome.resequence();
        Ok(outcome)
    }
}
