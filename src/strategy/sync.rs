//! Synchronous processing strategy
//!
//! This module provides a sequential implementation of the ProcessingStrategy
//! trait. It orchestrates a run by coordinating the decoder, the validator,
//! the catalog source and the enrichment engine, one stage after another.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - Decoding and line splitting to `io::decoding`
//! - Parsing and validation to `validate_lines`
//! - The catalog fetch to the configured `CatalogSource`
//! - Enrichment and the summary to the shared `assemble` step
//!
//! The catalog source is async, so the fetch runs on a current-thread tokio
//! runtime created for the duration of the call.

use crate::core::{validate_lines, CatalogSource, Validator};
use crate::strategy::{assemble, load_input, LoadedInput, PipelineRun, ProcessingStrategy};
use crate::types::PipelineError;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Sequential strategy: validate every line, then fetch the catalog, then enrich
#[derive(Clone)]
pub struct SyncProcessingStrategy {
    validator: Arc<Validator>,
    catalog: Arc<dyn CatalogSource>,
}

impl SyncProcessingStrategy {
    pub fn new(validator: Arc<Validator>, catalog: Arc<dyn CatalogSource>) -> Self {
        Self { validator, catalog }
    }
}

impl std::fmt::Debug for SyncProcessingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncProcessingStrategy")
            .field("validator", &self.validator)
            .field("catalog", &self.catalog.describe())
            .finish()
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn run(&self, input_path: &Path) -> Result<PipelineRun, PipelineError> {
        let LoadedInput { encoding, lines } = load_input(input_path, self.validator.config())?;
        let total_lines = lines.len();

        let outcome = validate_lines(&lines, &self.validator);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PipelineError::Runtime {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        info!(source = %self.catalog.describe(), "fetching catalog");
        let snapshot = runtime.block_on(self.catalog.fetch())?;

        Ok(assemble(encoding, total_lines, outcome, snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::strategy::tests::{create_temp_input, widget_catalog, UnavailableCatalog};
    use crate::types::RejectionReason;

    fn strategy(config: PipelineConfig) -> SyncProcessingStrategy {
        SyncProcessingStrategy::new(Arc::new(Validator::new(config)), widget_catalog())
    }

    #[test]
    fn test_sync_strategy_processes_valid_line() {
        let file = create_temp_input(b"TX1|P100|5|19.99|North|2024-01-01\n");

        let run = strategy(PipelineConfig::default()).run(file.path()).unwrap();

        assert_eq!(run.records.len(), 1);
        assert!(run.records[0].matched());
        assert_eq!(
            run.records[0].product.as_ref().map(|p| p.name.as_str()),
            Some("Widget")
        );
    }

    #[test]
    fn test_sync_strategy_continues_on_malformed_lines() {
        let file = create_temp_input(
            b"TX1|P100|5|19.99|North\n\
              \n\
              TX3|P200|1|2.00|East|2024-01-01\n",
        );

        let run = strategy(PipelineConfig::default()).run(file.path()).unwrap();

        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].line_no, 3);
        assert_eq!(run.summary.parse_failure_count(), 2);
        assert_eq!(run.summary.parse_failures.get("field-count-mismatch"), Some(&1));
        assert_eq!(run.summary.parse_failures.get("empty-line"), Some(&1));
    }

    #[test]
    fn test_sync_strategy_skips_header_and_uses_custom_delimiter() {
        let file = create_temp_input(
            b"id;product;qty;price;region;date\n\
              TX1;P100;2;1.00;Nord;2024-01-01\n\
              TX2;P100;2;1.00;North;2024-01-01\n",
        );
        let config = PipelineConfig {
            delimiter: ';',
            has_header: true,
            valid_regions: vec!["Nord".to_string(), "Sud".to_string()],
            ..PipelineConfig::default()
        };

        let run = strategy(config).run(file.path()).unwrap();

        assert_eq!(run.summary.total_lines, 2);
        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].region, "Nord");
        assert_eq!(run.rejections[0].reason, RejectionReason::InvalidRegion);
    }

    #[test]
    fn test_sync_strategy_fails_when_catalog_unavailable() {
        let file = create_temp_input(b"TX1|P100|5|19.99|North|2024-01-01\n");
        let strategy = SyncProcessingStrategy::new(
            Arc::new(Validator::new(PipelineConfig::default())),
            Arc::new(UnavailableCatalog),
        );

        let result = strategy.run(file.path());
        assert!(matches!(result, Err(PipelineError::Catalog(_))));
    }

    #[test]
    fn test_sync_strategy_empty_file() {
        let file = create_temp_input(b"");

        let run = strategy(PipelineConfig::default()).run(file.path()).unwrap();

        assert!(run.records.is_empty());
        assert_eq!(run.summary.total_lines, 0);
        assert_eq!(run.summary.catalog_size, 2);
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
