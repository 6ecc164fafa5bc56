//! Benchmark suite for comparing processing strategies
//!
//! This benchmark compares the performance of the synchronous and
//! asynchronous processing strategies using the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```
//!
//! # Benchmark Inputs
//!
//! Inputs are generated into a temp file before each benchmark, in three sizes
//! (1,000, 10,000 and 100,000 lines). Each input includes a mix of:
//! - Accepted lines with matched and unmatched products
//! - Lines rejected by each kind of rule
//! - Malformed lines
//!
//! The catalog is an in-memory source so no network time is measured.

use sales_pipeline::cli::StrategyType;
use sales_pipeline::config::PipelineConfig;
use sales_pipeline::core::StaticCatalogSource;
use sales_pipeline::strategy::{create_strategy, BatchConfig, ProcessingStrategy};
use sales_pipeline::types::ProductEntry;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const SIZES: &[usize] = &[1_000, 10_000, 100_000];

fn main() {
    divan::main();
}

fn generate_input(lines: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    for i in 0..lines {
        let line = match i % 10 {
            0 => format!("TX{}|P{}|0|9.99|North|2024-01-01", i, i % 500),
            1 => format!("TX{}|P{}|2|abc|South|2024-01-01", i, i % 500),
            2 => format!("TX{}|P{}|2|4.50|Central|2024-01-01", i, i % 500),
            3 => format!("TX{}|P{}|1", i, i % 500),
            4 => format!("TX{}|X{}|3|1,250.00|east|2024-01-01", i, i),
            _ => format!("TX{}|P{}|{}|19.99|West|2024-01-01", i, i % 500, i % 7 + 1),
        };
        writeln!(file, "{}", line).expect("Failed to write input");
    }
    file.flush().expect("Failed to flush input");
    file
}

fn catalog() -> Arc<StaticCatalogSource> {
    let entries = (0..500)
        .map(|i| ProductEntry {
            product_id: format!("P{}", i),
            name: format!("Product {}", i),
            category: "Bench".to_string(),
            catalog_price: None,
            available: i % 3 != 0,
            brand: None,
            rating: None,
        })
        .collect();
    Arc::new(StaticCatalogSource::new(entries))
}

fn strategy(strategy_type: StrategyType) -> Box<dyn ProcessingStrategy> {
    let batch_config = match strategy_type {
        StrategyType::Async => Some(BatchConfig::default()),
        StrategyType::Sync => None,
    };
    create_strategy(strategy_type, batch_config, PipelineConfig::default(), catalog())
}

/// Benchmark synchronous processing strategy
#[divan::bench(args = SIZES)]
fn sync_strategy(bencher: divan::Bencher, lines: usize) {
    let input = generate_input(lines);
    let strategy = strategy(StrategyType::Sync);

    bencher.bench_local(|| {
        let mut output = Vec::new();
        strategy
            .process(input.path(), &mut output)
            .expect("Processing failed");
        output
    });
}

/// Benchmark asynchronous processing strategy
#[divan::bench(args = SIZES)]
fn async_strategy(bencher: divan::Bencher, lines: usize) {
    let input = generate_input(lines);
    let strategy = strategy(StrategyType::Async);

    bencher.bench_local(|| {
        let mut output = Vec::new();
        strategy
            .process(input.path(), &mut output)
            .expect("Processing failed");
        output
    });
}
