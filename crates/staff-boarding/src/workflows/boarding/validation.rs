use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use super::domain::{normalize_grade_code, ClientId, PayGradeId, RecruitmentTicket};
use super::repository::{ReferenceDirectory, RepositoryError, StaffLookup};
use super::upload::{normalize_date, ParsedRow, UploadField, UploadRow};

/// Coarse classification of a row problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Validation,
    ReferenceResolution,
    DuplicateConflict,
}

/// A single reason a row cannot be boarded. The display text is what the uploader sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowIssue {
    #[error("{} is required", .0.label())]
    MissingField(UploadField),
    #[error("Employee Code '{0}' already exists for this client")]
    DuplicateEmployeeCode(String),
    #[error("Staff ID '{0}' already exists")]
    DuplicateStaffIdentifier(String),
    /// A unique key was taken between the existence check and the insert.
    #[error("{0}")]
    InsertConflict(String),
    #[error("Invalid Grade Code: '{0}'. Check Pay Grades Reference sheet for valid codes.")]
    UnknownGradeCode(String),
    #[error("Invalid Entry Date format: '{0}'. Use YYYY-MM-DD or DD/MM/YYYY")]
    InvalidEntryDate(String),
}

impl RowIssue {
    pub fn kind(&self) -> IssueKind {
        match self {
            RowIssue::MissingField(_) | RowIssue::InvalidEntryDate(_) => IssueKind::Validation,
            RowIssue::UnknownGradeCode(_) => IssueKind::ReferenceResolution,
            RowIssue::DuplicateEmployeeCode(_)
            | RowIssue::DuplicateStaffIdentifier(_)
            | RowIssue::InsertConflict(_) => IssueKind::DuplicateConflict,
        }
    }
}

/// A row that passed every check, with dates parsed and the grade resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedRow {
    pub row_number: usize,
    pub employee_code: String,
    pub staff_identifier: String,
    pub first_name: String,
    pub last_name: String,
    pub grade_code: String,
    pub pay_grade_id: PayGradeId,
    pub entry_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_end_date: Option<NaiveDate>,
    /// Remaining optional columns, untouched apart from trimming.
    #[serde(flatten)]
    pub details: UploadRow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub row_number: usize,
    pub employee_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub issues: Vec<RowIssue>,
}

impl RejectedRow {
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    /// `"Row 4: First Name is required, Staff ID 'S-9' already exists"`
    pub fn summary(&self) -> String {
        format!("Row {}: {}", self.row_number, self.messages().join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(Box<ValidatedRow>),
    Invalid(RejectedRow),
}

/// Checks one row at a time against a ticket. The lookup decides which existing staff
/// count as duplicates: committed data during preview, the open transaction during
/// commit.
pub struct RowValidator<'a, L: ?Sized, D: ?Sized> {
    ticket: &'a RecruitmentTicket,
    lookup: &'a L,
    directory: &'a D,
}

impl<'a, L, D> RowValidator<'a, L, D>
where
    L: StaffLookup + ?Sized,
    D: ReferenceDirectory + ?Sized,
{
    pub fn new(ticket: &'a RecruitmentTicket, lookup: &'a L, directory: &'a D) -> Self {
        Self {
            ticket,
            lookup,
            directory,
        }
    }

    /// Runs every check and collects all issues. Only storage failures short-circuit.
    pub fn validate(&self, parsed: ParsedRow) -> Result<ValidationOutcome, RepositoryError> {
        let ParsedRow {
            row_number,
            mut row,
        } = parsed;
        let mut issues = Vec::new();

        let [employee_code, staff_identifier, first_name, last_name, raw_grade, raw_entry_date] =
            UploadField::REQUIRED.map(|field| {
                let value = row.take(field);
                if value.is_none() {
                    issues.push(RowIssue::MissingField(field));
                }
                value
            });

        if let Some(code) = employee_code.as_deref() {
            if self
                .lookup
                .employee_code_exists(self.ticket.client_id, code)?
            {
                issues.push(RowIssue::DuplicateEmployeeCode(code.to_string()));
            }
        }

        if let Some(identifier) = staff_identifier.as_deref() {
            if self.lookup.staff_identifier_exists(identifier)? {
                issues.push(RowIssue::DuplicateStaffIdentifier(identifier.to_string()));
            }
        }

        let grade = match raw_grade.as_deref() {
            Some(raw) => {
                let normalized = normalize_grade_code(raw);
                let found = self
                    .directory
                    .active_pay_grade(self.ticket.job_structure_id, &normalized)?;
                if found.is_none() {
                    issues.push(RowIssue::UnknownGradeCode(raw.to_string()));
                }
                found
            }
            None => None,
        };

        let entry_date = raw_entry_date.as_deref().and_then(|raw| {
            let parsed = normalize_date(raw);
            if parsed.is_none() {
                issues.push(RowIssue::InvalidEntryDate(raw.to_string()));
            }
            parsed
        });

        let date_of_birth = optional_date(&mut row, UploadField::DateOfBirth, row_number);
        let experience_start_date =
            optional_date(&mut row, UploadField::ExperienceStartDate, row_number);
        let experience_end_date =
            optional_date(&mut row, UploadField::ExperienceEndDate, row_number);

        let outcome = match (
            issues.is_empty(),
            employee_code,
            staff_identifier,
            first_name,
            last_name,
            grade,
            entry_date,
        ) {
            (
                true,
                Some(employee_code),
                Some(staff_identifier),
                Some(first_name),
                Some(last_name),
                Some(grade),
                Some(entry_date),
            ) => ValidationOutcome::Valid(Box::new(ValidatedRow {
                row_number,
                employee_code,
                staff_identifier,
                first_name,
                last_name,
                grade_code: grade.code,
                pay_grade_id: grade.id,
                entry_date,
                date_of_birth,
                experience_start_date,
                experience_end_date,
                details: row,
            })),
            (_, employee_code, _, first_name, last_name, _, _) => {
                ValidationOutcome::Invalid(RejectedRow {
                    row_number,
                    employee_code,
                    first_name,
                    last_name,
                    issues,
                })
            }
        };

        Ok(outcome)
    }
}

/// Optional dates never fail a row; an unreadable value is dropped.
fn optional_date(
    row: &mut UploadRow,
    field: UploadField,
    row_number: usize,
) -> Option<NaiveDate> {
    let raw = row.take(field)?;
    let parsed = normalize_date(&raw);
    if parsed.is_none() {
        warn!(
            row = row_number,
            field = field.label(),
            value = %raw,
            "cleared unreadable optional date"
        );
    }
    parsed
}

/// Staff lookup that also treats keys accepted earlier in the same upload as taken, so a
/// preview reports in-file duplicates the way the commit would.
pub struct BatchLookup<'a, L: ?Sized> {
    inner: &'a L,
    client_id: ClientId,
    employee_codes: HashSet<String>,
    staff_identifiers: HashSet<String>,
}

impl<'a, L: StaffLookup + ?Sized> BatchLookup<'a, L> {
    pub fn new(inner: &'a L, client_id: ClientId) -> Self {
        Self {
            inner,
            client_id,
            employee_codes: HashSet::new(),
            staff_identifiers: HashSet::new(),
        }
    }

    pub fn claim(&mut self, row: &ValidatedRow) {
        self.employee_codes.insert(row.employee_code.clone());
        self.staff_identifiers.insert(row.staff_identifier.clone());
    }
}

impl<L: StaffLookup + ?Sized> StaffLookup for BatchLookup<'_, L> {
    fn employee_code_exists(
        &self,
        client_id: ClientId,
        code: &str,
    ) -> Result<bool, RepositoryError> {
        if client_id == self.client_id && self.employee_codes.contains(code) {
            return Ok(true);
        }
        self.inner.employee_code_exists(client_id, code)
    }

    fn staff_identifier_exists(&self, staff_identifier: &str) -> Result<bool, RepositoryError> {
        if self.staff_identifiers.contains(staff_identifier) {
            return Ok(true);
        }
        self.inner.staff_identifier_exists(staff_identifier)
    }
}
