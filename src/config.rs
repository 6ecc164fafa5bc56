//! Run configuration
//!
//! Every business constant the pipeline consumes lives here and is passed
//! explicitly to the parser, validator and catalog client. Two runs in the
//! same process can use different policies.
//!
//! Values are layered: `Default` impls, then an optional JSON file
//! (`ConfigFile::load`), then individual CLI flags.

use crate::types::PipelineError;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Number of fields every input record must carry
pub const FIELD_COUNT: usize = 6;

/// Parsing and validation policy
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Field delimiter for input lines
    pub delimiter: char,
    /// Encoding labels to try, in preference order
    pub encodings: Vec<String>,
    /// Accepted regions, in canonical spelling
    pub valid_regions: Vec<String>,
    pub min_quantity: i64,
    pub min_price: Decimal,
    /// Skip the first line of the file
    pub has_header: bool,
    /// Remove `,` thousands separators from numeric fields (ignored when `,` is the delimiter)
    pub strip_thousands_separators: bool,
    /// Prefix every product id must start with, if any
    pub product_id_prefix: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter: '|',
            encodings: ["utf-8", "latin-1", "iso-8859-1", "cp1252"]
                .into_iter()
                .map(String::from)
                .collect(),
            valid_regions: ["North", "South", "East", "West"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_quantity: 1,
            min_price: Decimal::new(1, 2),
            has_header: false,
            strip_thousands_separators: true,
            product_id_prefix: None,
        }
    }
}

impl PipelineConfig {
    /// Check the configuration for values no run could work with
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.valid_regions.iter().all(|r| r.trim().is_empty()) {
            return Err(PipelineError::config("region set is empty"));
        }
        if self.encodings.is_empty() {
            return Err(PipelineError::config("encoding list is empty"));
        }
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '\n' | '\r') {
            return Err(PipelineError::config(format!(
                "delimiter {:?} must be a single ASCII character other than a newline",
                self.delimiter
            )));
        }
        Ok(())
    }

    /// Canonical spelling of `region` if it is in the region set
    ///
    /// Matching is ASCII case-insensitive and ignores surrounding whitespace.
    pub fn canonical_region(&self, region: &str) -> Option<&str> {
        let region = region.trim();
        self.valid_regions
            .iter()
            .find(|valid| valid.eq_ignore_ascii_case(region))
            .map(String::as_str)
    }
}

/// Catalog service connection and retry policy
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Service root, e.g. `https://dummyjson.com`
    pub base_url: String,
    pub page_size: usize,
    /// Hard stop for pagination
    pub max_pages: usize,
    /// Attempts per page request, including the first
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Per-attempt time budget
    pub request_timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dummyjson.com".to_string(),
            page_size: 100,
            max_pages: 1000,
            max_attempts: 3,
            initial_backoff_ms: 200,
            max_backoff_ms: 5_000,
            request_timeout_ms: 10_000,
        }
    }
}

impl CatalogConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Delay before retry number `attempt` (1-based: the wait after the first failure)
    ///
    /// Doubles from `initial_backoff_ms` and never exceeds `max_backoff_ms`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

/// On-disk configuration file layout
///
/// ```json
/// { "pipeline": { "min_quantity": 2 }, "catalog": { "max_attempts": 5 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub pipeline: PipelineConfig,
    pub catalog: CatalogConfig,
}

impl ConfigFile {
    /// Read a configuration file; missing sections fall back to defaults
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("cannot read '{}': {}", path.display(), e))
        })?;
        let config: ConfigFile = serde_json::from_str(&contents)?;
        config.pipeline.validate()?;
        Ok(config)
    }
}
