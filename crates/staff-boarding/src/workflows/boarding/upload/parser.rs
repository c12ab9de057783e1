use std::io::Read;

use super::fields::{UploadField, UploadRow};
use super::headers::resolve_headers;
use super::UploadError;

/// A data row together with its 1-based position in the uploaded table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub row_number: usize,
    pub row: UploadRow,
}

/// The upload after header detection. Blank rows are already dropped.
#[derive(Debug, Clone)]
pub struct ParsedUpload {
    pub header_row: usize,
    pub columns: Vec<Option<UploadField>>,
    pub rows: Vec<ParsedRow>,
}

impl ParsedUpload {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, UploadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut header: Option<(usize, Vec<Option<UploadField>>)> = None;
        let mut rows = Vec::new();

        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            let row_number = record
                .position()
                .map(|position| position.line() as usize)
                .unwrap_or(index + 1);

            if header.is_none() {
                let columns = resolve_headers(record.iter());
                if columns.contains(&Some(UploadField::EmployeeCode)) {
                    header = Some((row_number, columns));
                }
                continue;
            }
            let Some((_, columns)) = header.as_ref() else {
                continue;
            };

            let mut row = UploadRow::default();
            for (cell, column) in record.iter().zip(columns.iter()) {
                if let Some(field) = column {
                    row.set(*field, cell);
                }
            }

            if row.is_blank() {
                continue;
            }

            rows.push(ParsedRow { row_number, row });
        }

        let (header_row, columns) = header.ok_or(UploadError::MissingHeaderRow)?;
        tracing::debug!(
            header_row,
            mapped = columns.iter().flatten().count(),
            rows = rows.len(),
            "parsed boarding upload"
        );

        Ok(Self {
            header_row,
            columns,
            rows,
        })
    }
}
