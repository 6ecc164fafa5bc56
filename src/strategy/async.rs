//! Asynchronous batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. Lines are parsed and validated in batches on a
//! tokio runtime while the catalog is fetched concurrently.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── BatchProcessor (parallel parse + validate, resequenced)
//!     └── CatalogSource (fetched alongside validation)
//! ```
//!
//! # Ordering
//!
//! - Batches run on worker threads and complete in any order
//! - The merged outcome is resequenced by line number
//! - Enrichment starts only after validation and the catalog fetch both
//!   finish; a failed fetch cancels the remaining validation work

use crate::core::{BatchProcessor, CatalogSource, Validator};
use crate::strategy::{assemble, load_input, LoadedInput, PipelineRun, ProcessingStrategy};
use crate::types::PipelineError;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Configuration for batch processing
///
/// Controls how lines are batched and the number of worker threads
/// validating batches in parallel.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of lines per batch
    pub batch_size: usize,
    /// Maximum number of batches processing concurrently
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid concurrency limit, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Parallel strategy: validation batches and the catalog fetch overlap
#[derive(Clone)]
pub struct AsyncProcessingStrategy {
    validator: Arc<Validator>,
    catalog: Arc<dyn CatalogSource>,
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(
        validator: Arc<Validator>,
        catalog: Arc<dyn CatalogSource>,
        config: BatchConfig,
    ) -> Self {
        Self {
            validator,
            catalog,
            config,
        }
    }
}

impl std::fmt::Debug for AsyncProcessingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncProcessingStrategy")
            .field("validator", &self.validator)
            .field("catalog", &self.catalog.describe())
            .field("config", &self.config)
            .finish()
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn run(&self, input_path: &Path) -> Result<PipelineRun, PipelineError> {
        let LoadedInput { encoding, lines } = load_input(input_path, self.validator.config())?;
        let total_lines = lines.len();

        // Use multi-threaded runtime with configured number of worker threads
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .enable_all()
            .build()
            .map_err(|e| PipelineError::Runtime {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        let processor = BatchProcessor::new(Arc::clone(&self.validator));

        let (outcome, snapshot) = runtime.block_on(async {
            info!(source = %self.catalog.describe(), "fetching catalog");
            let fetch = async { self.catalog.fetch().await.map_err(PipelineError::from) };
            let validation = processor.process_lines(
                lines,
                self.config.batch_size,
                self.config.max_concurrent_batches,
            );
            tokio::try_join!(validation, fetch)
        })?;

        Ok(assemble(encoding, total_lines, outcome, snapshot))
    }
}
