use serde::Serialize;

use super::domain::RecruitmentTicket;
use super::repository::{ReferenceDirectory, RepositoryError, StaffLookup};
use super::upload::ParsedUpload;
use super::validation::{BatchLookup, RejectedRow, RowValidator, ValidatedRow, ValidationOutcome};

pub const VALID_SAMPLE_LIMIT: usize = 10;
pub const INVALID_SAMPLE_LIMIT: usize = 20;
pub const ERROR_SUMMARY_LIMIT: usize = 50;

/// Identifying columns echoed back for a rejected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIdentity {
    pub employee_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidRecord {
    pub row_number: usize,
    pub data: RowIdentity,
    pub errors: Vec<String>,
}

impl From<&RejectedRow> for InvalidRecord {
    fn from(rejected: &RejectedRow) -> Self {
        Self {
            row_number: rejected.row_number,
            data: RowIdentity {
                employee_code: rejected.employee_code.clone(),
                first_name: rejected.first_name.clone(),
                last_name: rejected.last_name.clone(),
            },
            errors: rejected.messages(),
        }
    }
}

/// Read-only summary shown to the uploader before anything is written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewReport {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub available_slots: u32,
    pub preview_data: Vec<ValidatedRow>,
    pub invalid_records: Vec<InvalidRecord>,
    pub error_summary: Vec<String>,
    pub can_proceed: bool,
    pub warnings: Vec<String>,
}

pub fn capacity_warning(valid: usize, slots: u32) -> String {
    format!("You have {valid} valid records but only {slots} available slots")
}

/// Validates every row without persisting. Keys accepted earlier in the file count as
/// taken for later rows, matching what a commit of the same file would report.
pub fn assemble_preview<L, D>(
    ticket: &RecruitmentTicket,
    upload: ParsedUpload,
    lookup: &L,
    directory: &D,
) -> Result<PreviewReport, RepositoryError>
where
    L: StaffLookup + ?Sized,
    D: ReferenceDirectory + ?Sized,
{
    let mut batch = BatchLookup::new(lookup, ticket.client_id);
    let mut total_rows = 0;
    let mut valid_rows = 0;
    let mut preview_data = Vec::new();
    let mut rejected = Vec::new();

    for parsed in upload.rows {
        total_rows += 1;
        let outcome = RowValidator::new(ticket, &batch, directory).validate(parsed)?;
        match outcome {
            ValidationOutcome::Valid(row) => {
                valid_rows += 1;
                batch.claim(&row);
                if preview_data.len() < VALID_SAMPLE_LIMIT {
                    preview_data.push(*row);
                }
            }
            ValidationOutcome::Invalid(row) => rejected.push(row),
        }
    }

    let invalid_rows = rejected.len();
    let available_slots = ticket.available_slots();

    let mut warnings = Vec::new();
    if valid_rows > available_slots as usize {
        warnings.push(capacity_warning(valid_rows, available_slots));
    }

    let can_proceed =
        invalid_rows == 0 && valid_rows > 0 && valid_rows <= available_slots as usize;

    let invalid_records = rejected
        .iter()
        .take(INVALID_SAMPLE_LIMIT)
        .map(InvalidRecord::from)
        .collect();
    let error_summary = rejected
        .iter()
        .flat_map(|row| {
            row.messages()
                .into_iter()
                .map(move |message| format!("Row {}: {}", row.row_number, message))
        })
        .take(ERROR_SUMMARY_LIMIT)
        .collect();

    Ok(PreviewReport {
        total_rows,
        valid_rows,
        invalid_rows,
        available_slots,
        preview_data,
        invalid_records,
        error_summary,
        can_proceed,
        warnings,
    })
}
