//! Processing strategy module for complete pipeline runs
//!
//! This module defines the Strategy pattern for end-to-end runs, covering
//! decoding, parsing, validation, the catalog fetch and enrichment. Different
//! implementations (sequential, parallel batch) can be selected at runtime
//! and must produce identical results for identical inputs.

use crate::cli::StrategyType;
use crate::config::PipelineConfig;
use crate::core::{
    enrich, CatalogSnapshot, CatalogSource, RunSummary, ValidationOutcome, Validator,
};
use crate::io::{decode_file, split_lines, write_enriched_csv, OUTPUT_DELIMITER};
use crate::types::{EnrichedRecord, PipelineError, Rejection, SourceLine};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Everything a completed run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineRun {
    /// One record per accepted transaction, in input order
    pub records: Vec<EnrichedRecord>,
    /// Rejected candidates, in input order
    pub rejections: Vec<Rejection>,
    pub summary: RunSummary,
}

/// Processing strategy trait for complete pipeline runs
///
/// Each strategy reads the input file, partitions its lines into accepted,
/// rejected and unparseable, fetches the catalog and joins the accepted
/// transactions against it.
pub trait ProcessingStrategy: Send + Sync {
    /// Run the pipeline over `input_path`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened or read
    /// - No configured encoding decodes the file
    /// - The catalog cannot be fetched after all retries
    /// - The runtime cannot be started
    ///
    /// Malformed lines and rejected records never cause an error; they are
    /// counted in the summary and the run continues.
    fn run(&self, input_path: &Path) -> Result<PipelineRun, PipelineError>;

    /// Run the pipeline and write the enriched records to `output`
    ///
    /// Nothing is written unless the whole run succeeded.
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<RunSummary, PipelineError> {
        let run = self.run(input_path)?;
        write_enriched_csv(&run.records, output, OUTPUT_DELIMITER)?;
        Ok(run.summary)
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// `batch_config` only applies to the async strategy; `None` selects the
/// defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    batch_config: Option<BatchConfig>,
    pipeline_config: PipelineConfig,
    catalog: Arc<dyn CatalogSource>,
) -> Box<dyn ProcessingStrategy> {
    let validator = Arc::new(Validator::new(pipeline_config));
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(validator, catalog)),
        StrategyType::Async => {
            let config = batch_config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(validator, catalog, config))
        }
    }
}

/// Decoded input ready for parsing
pub(crate) struct LoadedInput {
    pub encoding: String,
    pub lines: Vec<SourceLine>,
}

pub(crate) fn load_input(
    input_path: &Path,
    config: &PipelineConfig,
) -> Result<LoadedInput, PipelineError> {
    let decoded = decode_file(input_path, &config.encodings)?;
    let lines = split_lines(&decoded.text, config.has_header);
    info!(
        path = %input_path.display(),
        encoding = %decoded.encoding,
        lines = lines.len(),
        "input decoded"
    );
    Ok(LoadedInput {
        encoding: decoded.encoding,
        lines,
    })
}

/// Join validated records against the catalog and build the summary
///
/// Called once both the validation outcome and the catalog are complete.
pub(crate) fn assemble(
    encoding: String,
    total_lines: usize,
    outcome: ValidationOutcome,
    snapshot: CatalogSnapshot,
) -> PipelineRun {
    for warning in &snapshot.warnings {
        warn!(%warning, "catalog warning");
    }

    let records = enrich(&outcome.accepted, &snapshot.catalog);

    let mut summary = RunSummary::new(encoding, total_lines);
    summary.record_parse_failures(&outcome.parse_failures);
    summary.record_validation(outcome.accepted.len(), &outcome.rejected);
    summary.record_catalog(&snapshot);
    summary.record_enrichment(&records);

    info!(
        accepted = summary.accepted,
        rejected = summary.rejected_count(),
        parse_failures = summary.parse_failure_count(),
        matched = summary.matched,
        unmatched = summary.unmatched,
        "run complete"
    );

    PipelineRun {
        records,
        rejections: outcome.rejected,
        summary,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::catalog::tests::entry;
    use crate::core::StaticCatalogSource;
    use crate::types::CatalogError;
    use async_trait::async_trait;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    pub(crate) fn create_temp_input(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    pub(crate) fn widget_catalog() -> Arc<dyn CatalogSource> {
        Arc::new(StaticCatalogSource::new(vec![
            entry("P100", "Widget", "Hardware"),
            entry("P200", "Gadget", "Electronics"),
        ]))
    }

    /// Catalog source that always fails as if retries ran out
    pub(crate) struct UnavailableCatalog;

    #[async_trait]
    impl CatalogSource for UnavailableCatalog {
        async fn fetch(&self) -> Result<CatalogSnapshot, CatalogError> {
            Err(CatalogError::Unavailable {
                attempts: 3,
                last_error: "connection refused".to_string(),
            })
        }

        fn describe(&self) -> String {
            "unavailable".to_string()
        }
    }

    const INPUT: &str = "TX1|P100|5|19.99|North|2024-01-01\n\
                         TX2|P999|0|19.99|North|2024-01-01\n\
                         TX3|P999|2|3.50|west|2024-01-02\n\
                         TX4|P200|1,000|0.01|East|2024-01-02\n\
                         garbage line\n";

    fn strategy(strategy_type: StrategyType) -> Box<dyn ProcessingStrategy> {
        create_strategy(
            strategy_type,
            Some(BatchConfig::new(2, 2)),
            PipelineConfig::default(),
            widget_catalog(),
        )
    }

    #[rstest]
    fn test_run_partitions_and_enriches(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy_type: StrategyType,
    ) {
        let file = create_temp_input(INPUT.as_bytes());

        let run = strategy(strategy_type).run(file.path()).unwrap();

        let ids: Vec<_> = run.records.iter().map(|r| r.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["TX1", "TX3", "TX4"]);
        let matched: Vec<_> = run.records.iter().map(EnrichedRecord::matched).collect();
        assert_eq!(matched, vec![true, false, true]);
        assert_eq!(run.records[1].region, "West");
        assert_eq!(run.records[2].quantity, 1000);

        assert_eq!(run.rejections.len(), 1);
        assert_eq!(run.rejections[0].candidate.transaction_id, "TX2");

        let summary = &run.summary;
        assert_eq!(summary.total_lines, 5);
        assert_eq!(summary.accepted, 3);
        assert_eq!(summary.rejected_count(), 1);
        assert_eq!(summary.parse_failure_count(), 1);
        assert_eq!(summary.matched, 2);
        assert_eq!(summary.unmatched, 1);
        assert_eq!(summary.unmatched_revenue, rust_decimal::Decimal::new(700, 2));
        assert_eq!(summary.catalog_size, 2);
        assert_eq!(summary.encoding, "utf-8");
    }

    #[rstest]
    fn test_process_writes_enriched_csv(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy_type: StrategyType,
    ) {
        let file = create_temp_input(b"TX1|P100|5|19.99|North|2024-01-01\n");
        let mut output = Vec::new();

        let summary = strategy(strategy_type)
            .process(file.path(), &mut output)
            .unwrap();

        assert_eq!(summary.accepted, 1);
        let text = String::from_utf8(output).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("transaction_id,product_id"));
        assert_eq!(
            lines.next(),
            Some("TX1,P100,5,19.99,North,2024-01-01,Widget,Hardware,,,true,true")
        );
        assert_eq!(lines.next(), None);
    }

    #[rstest]
    fn test_catalog_failure_aborts_without_output(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy_type: StrategyType,
    ) {
        let file = create_temp_input(INPUT.as_bytes());
        let strategy = create_strategy(
            strategy_type,
            None,
            PipelineConfig::default(),
            Arc::new(UnavailableCatalog),
        );
        let mut output = Vec::new();

        let result = strategy.process(file.path(), &mut output);

        assert!(matches!(
            result,
            Err(PipelineError::Catalog(CatalogError::Unavailable { attempts: 3, .. }))
        ));
        assert!(output.is_empty());
    }

    #[rstest]
    fn test_missing_file(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy_type: StrategyType,
    ) {
        let result = strategy(strategy_type).run(Path::new("nonexistent.txt"));
        assert!(matches!(result, Err(PipelineError::FileNotFound { .. })));
    }

    #[rstest]
    fn test_latin1_input_falls_back(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy_type: StrategyType,
    ) {
        // "Zürich" in latin-1 is not valid UTF-8
        let mut bytes = b"TX1|P100|1|2.00|North|Z".to_vec();
        bytes.push(0xFC);
        bytes.extend_from_slice(b"rich\n");
        let file = create_temp_input(&bytes);

        let run = strategy(strategy_type).run(file.path()).unwrap();

        assert_eq!(run.summary.encoding, "latin-1");
        assert_eq!(run.records[0].timestamp, "Zürich");
    }

    #[rstest]
    fn test_huge_line_total_does_not_abort_run(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy_type: StrategyType,
    ) {
        let file = create_temp_input(
            b"TX1|P100|1000000000000000000|100000000000|North|2024-01-01\n\
              TX2|P999|1000000000000000000|100000000000|North|2024-01-01\n\
              TX3|P100|2|1.00|North|2024-01-01\n",
        );

        let run = strategy(strategy_type).run(file.path()).unwrap();

        assert_eq!(run.records.len(), 3);
        assert_eq!(run.summary.matched, 2);
        assert_eq!(run.summary.matched_revenue, rust_decimal::Decimal::MAX);
        assert_eq!(run.summary.unmatched_revenue, rust_decimal::Decimal::MAX);
    }

    #[test]
    fn test_strategies_agree() {
        let text: String = (1..=500)
            .map(|i| match i % 5 {
                0 => format!("TX{}|P100|{}|1.50|north|2024-01-01\n", i, i % 4),
                1 => format!("TX{}|P200|2|0.00|South|2024-01-01\n", i),
                2 => "\n".to_string(),
                3 => format!("TX{}|P{}|3|9.99|Central|2024-01-01\n", i, i),
                _ => format!("TX{}|P{}|1|4.25|East|2024-01-01\n", i, i % 300),
            })
            .collect();
        let file = create_temp_input(text.as_bytes());

        let sequential = strategy(StrategyType::Sync).run(file.path()).unwrap();
        let parallel = strategy(StrategyType::Async).run(file.path()).unwrap();

        assert_eq!(sequential, parallel);
    }
}
