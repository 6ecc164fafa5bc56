//! I/O module
//!
//! Handles input decoding, line parsing and output.
//!
//! # Components
//!
//! - `decoding` - Whole-file encoding fallback and line splitting
//! - `line_parser` - Record parser producing transaction candidates
//! - `output` - Enriched record, rejection log and summary serialization

pub mod decoding;
pub mod line_parser;
pub mod output;

pub use decoding::{decode_bytes, decode_file, split_lines, DecodedText};
pub use line_parser::parse_line;
pub use output::{
    persist_all, stage_output, write_atomically, write_enriched_csv, write_rejections_csv,
    write_summary_json, StagedOutput, OUTPUT_DELIMITER,
};
