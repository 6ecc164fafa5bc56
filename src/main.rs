//! Sales Pipeline CLI
//!
//! Command-line interface for validating sales transactions and enriching
//! them with product catalog data.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- sales.txt > enriched.csv
//! cargo run -- --catalog-file products.json sales.txt -o enriched.csv
//! cargo run -- --strategy sync --rejections rejected.csv sales.txt > enriched.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 sales.txt > enriched.csv
//! ```
//!
//! Enriched records go to stdout (or `--output`); the run summary and logs
//! go to stderr.
//!
//! # Processing Strategies
//!
//! - **sync**: Sequential validation, then the catalog fetch
//! - **async**: Parallel validation batches overlapping the catalog fetch (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing input, undecodable file, catalog unavailable, output failure, etc.)

use anyhow::Context;
use sales_pipeline::cli::{self, CliArgs};
use sales_pipeline::core::{CatalogSource, FileCatalogSource, HttpCatalogClient};
use sales_pipeline::io::{
    persist_all, stage_output, write_enriched_csv, write_rejections_csv, write_summary_json,
    OUTPUT_DELIMITER,
};
use sales_pipeline::{logging, strategy, CatalogConfig};
use std::process;
use std::sync::Arc;

fn catalog_source(
    args: &CliArgs,
    config: CatalogConfig,
) -> anyhow::Result<Arc<dyn CatalogSource>> {
    match &args.catalog_file {
        Some(path) => Ok(Arc::new(FileCatalogSource::new(path))),
        None => {
            let client =
                HttpCatalogClient::new(config).context("Failed to create catalog client")?;
            Ok(Arc::new(client))
        }
    }
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    let config = args.resolve_config()?;
    let catalog = catalog_source(&args, config.catalog)?;

    // Create the appropriate processing strategy based on CLI arguments
    let strategy = {
        let batch_config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy.clone(), batch_config, config.pipeline, catalog)
    };

    let run = strategy.run(&args.input_file)?;

    // Only a complete run reaches this point. Every file is fully written to
    // a temp file before any of them is moved into place.
    let mut staged = Vec::new();
    if let Some(path) = &args.output {
        staged.push(
            stage_output(path, |out| {
                write_enriched_csv(&run.records, out, OUTPUT_DELIMITER)
            })
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        );
    }
    if let Some(path) = &args.rejections {
        staged.push(
            stage_output(path, |out| write_rejections_csv(&run.rejections, out))
                .with_context(|| format!("Failed to write '{}'", path.display()))?,
        );
    }
    if let Some(path) = &args.summary_json {
        staged.push(
            stage_output(path, |out| write_summary_json(&run.summary, out))
                .with_context(|| format!("Failed to write '{}'", path.display()))?,
        );
    }

    if args.output.is_none() {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        write_enriched_csv(&run.records, &mut out, OUTPUT_DELIMITER)?;
    }
    persist_all(staged).context("Failed to move outputs into place")?;

    eprintln!("{}", run.summary);
    Ok(())
}

fn main() {
    // Parse command-line arguments using clap
    let args = cli::parse_args();
    logging::init(args.json_logs);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
