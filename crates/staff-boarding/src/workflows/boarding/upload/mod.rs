//! Tabular upload handling: header resolution, typed rows, and date normalization.

mod dates;
mod fields;
mod headers;
mod normalizer;
mod parser;

pub use dates::{canonical, normalize_date};
pub use fields::{UploadField, UploadRow};
pub use headers::{resolve_header, resolve_headers};
pub use parser::{ParsedRow, ParsedUpload};

/// Whole-file failures. Any of these aborts the batch before a row is looked at.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not find a header row containing an Employee Code column")]
    MissingHeaderRow,
}
