//! Run summary
//!
//! Aggregates per-record outcomes into the counts a completed run always
//! reports: total input, accepted, rejected by reason, unmatched enrichment,
//! plus a handful of sample lines for each failure kind.

use crate::core::catalog::{CatalogSnapshot, CatalogWarning};
use crate::types::{EnrichedRecord, LineFailure, LineNumber, Rejection, RejectionReason};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Maximum number of sample lines kept per failure kind
pub const SAMPLE_LIMIT: usize = 5;

/// A failed line kept for the summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSample {
    pub line: LineNumber,
    pub reason: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Encoding the input file was decoded with
    pub encoding: String,
    /// Lines considered after the optional header
    pub total_lines: usize,
    /// Parse failures keyed by failure code
    pub parse_failures: BTreeMap<&'static str, usize>,
    pub accepted: usize,
    /// Rejections keyed by reason, iterated in rule order
    pub rejected: BTreeMap<RejectionReason, usize>,
    pub matched: usize,
    pub unmatched: usize,
    pub matched_revenue: Decimal,
    pub unmatched_revenue: Decimal,
    pub catalog_size: usize,
    pub catalog_warnings: Vec<CatalogWarning>,
    pub parse_failure_samples: Vec<LineSample>,
    pub rejection_samples: Vec<LineSample>,
}

impl RunSummary {
    pub fn new(encoding: impl Into<String>, total_lines: usize) -> Self {
        Self {
            encoding: encoding.into(),
            total_lines,
            ..Self::default()
        }
    }

    pub fn record_parse_failures(&mut self, failures: &[LineFailure]) {
        for failure in failures {
            *self.parse_failures.entry(failure.failure.code()).or_default() += 1;
            if self.parse_failure_samples.len() < SAMPLE_LIMIT {
                self.parse_failure_samples.push(LineSample {
                    line: failure.line_no,
                    reason: failure.failure.to_string(),
                    text: failure.text.clone(),
                });
            }
        }
    }

    pub fn record_validation(&mut self, accepted: usize, rejections: &[Rejection]) {
        self.accepted += accepted;
        for rejection in rejections {
            *self.rejected.entry(rejection.reason).or_default() += 1;
            if self.rejection_samples.len() < SAMPLE_LIMIT {
                let c = &rejection.candidate;
                self.rejection_samples.push(LineSample {
                    line: c.line_no,
                    reason: rejection.reason.code().to_string(),
                    text: [
                        c.transaction_id.as_str(),
                        c.product_id.as_str(),
                        c.quantity.as_str(),
                        c.unit_price.as_str(),
                        c.region.as_str(),
                        c.timestamp.as_str(),
                    ]
                    .join("|"),
                });
            }
        }
    }

    pub fn record_catalog(&mut self, snapshot: &CatalogSnapshot) {
        self.catalog_size = snapshot.catalog.len();
        self.catalog_warnings = snapshot.warnings.clone();
    }

    pub fn record_enrichment(&mut self, records: &[EnrichedRecord]) {
        for record in records {
            if record.matched() {
                self.matched += 1;
                self.matched_revenue =
                    self.matched_revenue.saturating_add(record.line_total());
            } else {
                self.unmatched += 1;
                self.unmatched_revenue =
                    self.unmatched_revenue.saturating_add(record.line_total());
            }
        }
    }

    pub fn parse_failure_count(&self) -> usize {
        self.parse_failures.values().sum()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.values().sum()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run summary")?;
        writeln!(f, "  encoding:        {}", self.encoding)?;
        writeln!(f, "  input lines:     {}", self.total_lines)?;
        writeln!(f, "  parse failures:  {}", self.parse_failure_count())?;
        for (code, count) in &self.parse_failures {
            writeln!(f, "    {:<24}{}", code, count)?;
        }
        writeln!(f, "  accepted:        {}", self.accepted)?;
        writeln!(f, "  rejected:        {}", self.rejected_count())?;
        for (reason, count) in &self.rejected {
            writeln!(f, "    {:<24}{}", reason.code(), count)?;
        }
        writeln!(f, "  catalog size:    {}", self.catalog_size)?;
        for warning in &self.catalog_warnings {
            writeln!(f, "    warning: {}", warning)?;
        }
        writeln!(
            f,
            "  matched:         {} (revenue {:.2})",
            self.matched, self.matched_revenue
        )?;
        write!(
            f,
            "  unmatched:       {} (revenue {:.2})",
            self.unmatched, self.unmatched_revenue
        )?;
        for sample in self.parse_failure_samples.iter().chain(&self.rejection_samples) {
            write!(
                f,
                "\n  line {}: {}: {}",
                sample.line, sample.reason, sample.text
            )?;
        }
        Ok(())
    }
}
