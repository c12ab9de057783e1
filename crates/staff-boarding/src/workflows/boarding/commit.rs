use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use super::domain::{
    Actor, AuditStamp, BoardingApprovalStatus, BoardingAudit, EmploymentType, NewStaffRecord,
    OfferStatus, RecruitmentTicket, StaffId, StaffProfile, StaffType, StaffTypeId, StaffTypeRule,
};
use super::preview::capacity_warning;
use super::repository::{BoardingTransaction, ReferenceDirectory, RepositoryError};
use super::subordinate::{plan_subordinates, SubordinateFailure};
use super::upload::ParsedUpload;
use super::validation::{RejectedRow, RowIssue, RowValidator, ValidatedRow, ValidationOutcome};

pub const SKIP_APPROVAL_NOTE: &str =
    "Initial approval granted at boarding; awaiting final approval";
const DEFAULT_APPOINTMENT_STATUS: &str = "probation";

/// Approval state and audit trail a freshly boarded record starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardingStart {
    pub status: BoardingApprovalStatus,
    pub audit: BoardingAudit,
}

impl BoardingStart {
    pub fn for_submitter(actor: &Actor, may_skip_approval: bool, now: DateTime<Utc>) -> Self {
        if !may_skip_approval {
            return Self {
                status: BoardingApprovalStatus::Pending,
                audit: BoardingAudit::default(),
            };
        }

        Self {
            status: BoardingApprovalStatus::PendingFinalApproval,
            audit: BoardingAudit {
                approval: Some(AuditStamp {
                    actor: actor.id,
                    at: now,
                    note: Some(SKIP_APPROVAL_NOTE.to_string()),
                }),
                ..BoardingAudit::default()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedStaff {
    pub id: StaffId,
    pub employee_code: String,
    pub name: String,
    pub status: BoardingApprovalStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TicketFill {
    pub filled: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    pub successful_records: usize,
    pub failed_records: usize,
    pub created_staff: Vec<CreatedStaff>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub ticket_status: TicketFill,
}

enum RowOutcome {
    Created {
        staff: CreatedStaff,
        warnings: Vec<String>,
    },
    Failed(RejectedRow),
}

/// Folds per-row outcomes; a failed row never stops the rows after it.
#[derive(Default)]
struct OutcomeCollector {
    created: Vec<CreatedStaff>,
    failed: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl OutcomeCollector {
    fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Created { staff, warnings } => {
                self.created.push(staff);
                self.warnings.extend(warnings);
            }
            RowOutcome::Failed(rejected) => {
                self.failed += 1;
                self.errors.push(rejected.summary());
            }
        }
    }
}

/// Everything one commit needs besides the transaction itself.
pub struct CommitPipeline<'a, D: ?Sized> {
    pub ticket: &'a RecruitmentTicket,
    pub directory: &'a D,
    pub submitter: &'a Actor,
    pub start: BoardingStart,
    pub offer_status: OfferStatus,
    pub staff_types: StaffTypeRule,
    pub now: DateTime<Utc>,
}

impl<D> CommitPipeline<'_, D>
where
    D: ReferenceDirectory + ?Sized,
{
    /// Boards every row inside `tx`. Row problems end up in the report; an `Err` means
    /// the caller must drop the transaction.
    pub fn run<T>(&self, tx: &mut T, upload: ParsedUpload) -> Result<CommitReport, RepositoryError>
    where
        T: BoardingTransaction + ?Sized,
    {
        let mut collector = OutcomeCollector::default();
        let mut staff_type: Option<StaffType> = None;

        for parsed in upload.rows {
            let validated = RowValidator::new(self.ticket, &*tx, self.directory).validate(parsed)?;
            let outcome = match validated {
                ValidationOutcome::Valid(row) => self.board_row(tx, &mut staff_type, *row)?,
                ValidationOutcome::Invalid(rejected) => RowOutcome::Failed(rejected),
            };
            collector.record(outcome);
        }

        let created = collector.created.len() as u32;
        let filled = if created > 0 {
            tx.record_boarded(self.ticket.id, created)?
        } else {
            self.ticket.accepted_count
        };

        let available = self.ticket.available_slots();
        if created > available {
            warn!(
                ticket = %self.ticket.id,
                created,
                available,
                "commit boarded more staff than the ticket has slots for"
            );
            collector
                .warnings
                .push(capacity_warning(created as usize, available));
        }

        Ok(CommitReport {
            successful_records: collector.created.len(),
            failed_records: collector.failed,
            created_staff: collector.created,
            errors: collector.errors,
            warnings: collector.warnings,
            ticket_status: TicketFill {
                filled,
                total: self.ticket.vacancy_count,
            },
        })
    }

    fn board_row<T>(
        &self,
        tx: &mut T,
        staff_type: &mut Option<StaffType>,
        row: ValidatedRow,
    ) -> Result<RowOutcome, RepositoryError>
    where
        T: BoardingTransaction + ?Sized,
    {
        let staff_type_id = self.resolve_staff_type(tx, staff_type)?;
        let new_record = NewStaffRecord {
            profile: self.profile(&row, staff_type_id),
            boarding_approval_status: self.start.status,
            offer_status: self.offer_status,
            onboarded_by: self.submitter.id,
            audit: self.start.audit.clone(),
            created_at: self.now,
        };

        let record = match tx.insert_staff(new_record) {
            Ok(record) => record,
            Err(RepositoryError::Conflict(reason)) => {
                return Ok(RowOutcome::Failed(RejectedRow {
                    row_number: row.row_number,
                    employee_code: Some(row.employee_code),
                    first_name: Some(row.first_name),
                    last_name: Some(row.last_name),
                    issues: vec![RowIssue::InsertConflict(reason)],
                }));
            }
            Err(err) => return Err(err),
        };

        let mut warnings = Vec::new();
        for planned in plan_subordinates(&row) {
            let stored = planned.and_then(|subordinate| {
                let kind = subordinate.kind();
                tx.insert_subordinate(record.id, subordinate)
                    .map_err(|err| SubordinateFailure::new(kind, err.to_string()))
            });
            if let Err(failure) = stored {
                warn!(
                    row = row.row_number,
                    staff_id = %record.id,
                    kind = failure.kind.label(),
                    reason = %failure.reason,
                    "subordinate record skipped"
                );
                warnings.push(format!("Row {}: {}", row.row_number, failure));
            }
        }

        Ok(RowOutcome::Created {
            staff: CreatedStaff {
                id: record.id,
                employee_code: record.profile.employee_code.clone(),
                name: record.full_name(),
                status: record.boarding_approval_status,
            },
            warnings,
        })
    }

    /// Finds or creates the client's staff type once per batch.
    fn resolve_staff_type<T>(
        &self,
        tx: &mut T,
        cached: &mut Option<StaffType>,
    ) -> Result<StaffTypeId, RepositoryError>
    where
        T: BoardingTransaction + ?Sized,
    {
        if let Some(staff_type) = cached {
            return Ok(staff_type.id);
        }

        let client_id = self.ticket.client_id;
        let (code, title) = self.staff_types.classify(client_id);
        let staff_type = match tx.find_staff_type(client_id, code)? {
            Some(existing) => existing,
            None => tx.insert_staff_type(client_id, code, title)?,
        };
        let id = staff_type.id;
        *cached = Some(staff_type);
        Ok(id)
    }

    fn profile(&self, row: &ValidatedRow, staff_type_id: StaffTypeId) -> StaffProfile {
        let details = &row.details;
        StaffProfile {
            client_id: self.ticket.client_id,
            ticket_id: self.ticket.id,
            staff_type_id,
            employee_code: row.employee_code.clone(),
            staff_identifier: row.staff_identifier.clone(),
            first_name: row.first_name.clone(),
            middle_name: details.middle_name.clone(),
            last_name: row.last_name.clone(),
            email: details.email.clone(),
            mobile_phone: details.mobile_phone.clone(),
            gender: details.gender.clone(),
            date_of_birth: row.date_of_birth,
            pay_grade_id: row.pay_grade_id,
            grade_code: row.grade_code.clone(),
            entry_date: row.entry_date,
            appointment_status: details
                .appointment_status
                .clone()
                .unwrap_or_else(|| DEFAULT_APPOINTMENT_STATUS.to_string()),
            employment_type: EmploymentType::from_free_text(details.employment_type.as_deref()),
            department: details.department.clone(),
            job_title: details.last_position.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::boarding::domain::ActorId;

    #[test]
    fn skipping_submitter_starts_at_final_stage_with_stamp() {
        let now = Utc::now();
        let actor = Actor::new(9, "hr_manager");

        let start = BoardingStart::for_submitter(&actor, true, now);
        assert_eq!(start.status, BoardingApprovalStatus::PendingFinalApproval);
        let stamp = start.audit.approval.expect("approval stamp");
        assert_eq!(stamp.actor, ActorId(9));
        assert_eq!(stamp.note.as_deref(), Some(SKIP_APPROVAL_NOTE));

        let start = BoardingStart::for_submitter(&actor, false, now);
        assert_eq!(start.status, BoardingApprovalStatus::Pending);
        assert_eq!(start.audit, BoardingAudit::default());
    }
}
