use crate::config::ConfigFile;
use crate::strategy::BatchConfig;
use crate::types::PipelineError;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for the sales pipeline
///
/// Values given here override the optional JSON configuration file, which
/// in turn overrides the built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "sales-pipeline")]
#[command(
    about = "Validate sales transactions and enrich them with product catalog data",
    long_about = None
)]
pub struct CliArgs {
    #[arg(value_name = "INPUT", help = "Path to the delimited sales input file")]
    pub input_file: PathBuf,

    #[arg(
        long = "catalog-url",
        value_name = "URL",
        conflicts_with = "catalog_file",
        help = "Base URL of the product catalog service (default: from config)"
    )]
    pub catalog_url: Option<String>,

    #[arg(
        long = "catalog-file",
        value_name = "PATH",
        help = "Read the catalog from a local JSON file instead of the service"
    )]
    pub catalog_file: Option<PathBuf>,

    #[arg(long = "config", value_name = "PATH", help = "JSON configuration file")]
    pub config: Option<PathBuf>,

    #[arg(
        long = "delimiter",
        value_name = "CHAR",
        help = "Input field delimiter (default: '|')"
    )]
    pub delimiter: Option<char>,

    #[arg(long = "has-header", help = "Skip the first line of the input file")]
    pub has_header: bool,

    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for parallel batches"
    )]
    pub strategy: StrategyType,

    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of lines per validation batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of batches processing concurrently (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    #[arg(
        long = "max-attempts",
        value_name = "COUNT",
        help = "Attempts per catalog page request (default: 3)"
    )]
    pub max_attempts: Option<u32>,

    #[arg(
        long = "output",
        short = 'o',
        value_name = "PATH",
        help = "Write enriched records here instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long = "rejections", value_name = "PATH", help = "Write the rejection log here")]
    pub rejections: Option<PathBuf>,

    #[arg(
        long = "summary-json",
        value_name = "PATH",
        help = "Write the run summary as JSON here"
    )]
    pub summary_json: Option<PathBuf>,

    #[arg(long = "json-logs", help = "Emit logs as JSON lines on stderr")]
    pub json_logs: bool,
}

/// Processing strategy selection
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    /// Sequential parse, validate, fetch and enrich
    Sync,
    /// Parallel validation batches overlapping the catalog fetch
    Async,
}

impl CliArgs {
    /// Convert CLI arguments to BatchConfig
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Layer defaults, the optional config file and the flags given here
    pub fn resolve_config(&self) -> Result<ConfigFile, PipelineError> {
        let mut config = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        if let Some(delimiter) = self.delimiter {
            config.pipeline.delimiter = delimiter;
        }
        if self.has_header {
            config.pipeline.has_header = true;
        }
        if let Some(url) = &self.catalog_url {
            config.catalog.base_url = url.clone();
        }
        if let Some(max_attempts) = self.max_attempts {
            config.catalog.max_attempts = max_attempts;
        }

        config.pipeline.validate()?;
        Ok(config)
    }
}
