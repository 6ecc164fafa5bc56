//! Output serialization for enriched records and the rejection log
//!
//! Writers here take any `Write`; `write_atomically` wraps them so a file
//! only appears at its destination once every row has been written.

use crate::core::summary::RunSummary;
use crate::types::{EnrichedRecord, PipelineError, Rejection};
use rust_decimal::Decimal;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Delimiter used for enriched output and the rejection log
pub const OUTPUT_DELIMITER: u8 = b',';

const ENRICHED_HEADER: [&str; 12] = [
    "transaction_id",
    "product_id",
    "quantity",
    "unit_price",
    "region",
    "timestamp",
    "product_name",
    "category",
    "brand",
    "catalog_price",
    "available",
    "matched",
];

/// At least two decimal places, never fewer digits than the value carries
fn format_price(price: Option<Decimal>) -> String {
    match price {
        Some(p) if p.scale() > 2 => p.to_string(),
        Some(p) => format!("{:.2}", p),
        None => String::new(),
    }
}

/// Write enriched records as delimited text
///
/// One header row, then one row per record in the order given. Unmatched
/// records leave the catalog columns empty and carry `matched=false`.
pub fn write_enriched_csv(
    records: &[EnrichedRecord],
    output: &mut dyn Write,
    delimiter: u8,
) -> Result<(), PipelineError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(output);

    writer.write_record(ENRICHED_HEADER)?;

    for record in records {
        let product = record.product.as_ref();
        writer.write_record(&[
            record.transaction_id.clone(),
            record.product_id.clone(),
            record.quantity.to_string(),
            format_price(Some(record.unit_price)),
            record.region.clone(),
            record.timestamp.clone(),
            product.map(|p| p.name.clone()).unwrap_or_default(),
            product.map(|p| p.category.clone()).unwrap_or_default(),
            product.and_then(|p| p.brand.clone()).unwrap_or_default(),
            format_price(product.and_then(|p| p.catalog_price)),
            product.map(|p| p.available.to_string()).unwrap_or_default(),
            record.matched().to_string(),
        ])?;
    }

    writer
        .flush()
        .map_err(|e| PipelineError::output(format!("Failed to flush output: {}", e)))?;

    Ok(())
}

/// Write the rejection log: line number, reason code and the original fields
pub fn write_rejections_csv(
    rejections: &[Rejection],
    output: &mut dyn Write,
) -> Result<(), PipelineError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record([
        "line",
        "reason",
        "transaction_id",
        "product_id",
        "quantity",
        "unit_price",
        "region",
        "timestamp",
    ])?;

    for rejection in rejections {
        let c = &rejection.candidate;
        writer.write_record([
            c.line_no.to_string().as_str(),
            rejection.reason.code(),
            c.transaction_id.as_str(),
            c.product_id.as_str(),
            c.quantity.as_str(),
            c.unit_price.as_str(),
            c.region.as_str(),
            c.timestamp.as_str(),
        ])?;
    }

    writer
        .flush()
        .map_err(|e| PipelineError::output(format!("Failed to flush rejections: {}", e)))?;

    Ok(())
}

/// Write the run summary as pretty-printed JSON
pub fn write_summary_json(summary: &RunSummary, output: &mut dyn Write) -> Result<(), PipelineError> {
    serde_json::to_writer_pretty(&mut *output, summary)
        .map_err(|e| PipelineError::output(format!("Failed to serialize summary: {}", e)))?;
    writeln!(output)?;
    Ok(())
}

/// A fully written output waiting in a temp file next to its destination
#[derive(Debug)]
pub struct StagedOutput {
    temp: NamedTempFile,
    path: PathBuf,
}

impl StagedOutput {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the temp file into place
    pub fn persist(self) -> Result<(), PipelineError> {
        let path = self.path;
        self.temp.persist(&path).map_err(|e| {
            PipelineError::output(format!("Failed to persist '{}': {}", path.display(), e))
        })?;
        Ok(())
    }
}

/// Run `write` against a temp file next to `path` without touching `path`
///
/// If `write` fails, the temp file is removed.
pub fn stage_output<F>(path: &Path, write: F) -> Result<StagedOutput, PipelineError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), PipelineError>,
{
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let writer: &mut dyn Write = &mut temp;
        write(writer)?;
    }
    temp.as_file().sync_all()?;

    Ok(StagedOutput {
        temp,
        path: path.to_path_buf(),
    })
}

/// Persist staged outputs once all of them have been written
pub fn persist_all(staged: Vec<StagedOutput>) -> Result<(), PipelineError> {
    staged.into_iter().try_for_each(StagedOutput::persist)
}

/// Run `write` against a temp file next to `path`, then move it into place
///
/// If `write` fails, the temp file is removed and `path` is left untouched.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<(), PipelineError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), PipelineError>,
{
    stage_output(path, write)?.persist()
}
