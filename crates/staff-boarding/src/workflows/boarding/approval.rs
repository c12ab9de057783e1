use std::fmt;

use serde::Serialize;

use super::domain::{
    ActorId, AuditStamp, BoardingApprovalStatus, EmploymentStatus, OfferStatus, StaffId,
    StaffRecord, TicketId,
};
use super::repository::RepositoryError;

/// The four transitions of the boarding approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalAction {
    Approve,
    Reject,
    FinalApprove,
    FinalReject,
}

impl ApprovalAction {
    pub const fn label(self) -> &'static str {
        match self {
            ApprovalAction::Approve => "approve",
            ApprovalAction::Reject => "reject",
            ApprovalAction::FinalApprove => "final approve",
            ApprovalAction::FinalReject => "final reject",
        }
    }

    /// State the record must be in for this action.
    pub const fn required_status(self) -> BoardingApprovalStatus {
        match self {
            ApprovalAction::Approve | ApprovalAction::Reject => BoardingApprovalStatus::Pending,
            ApprovalAction::FinalApprove | ApprovalAction::FinalReject => {
                BoardingApprovalStatus::PendingFinalApproval
            }
        }
    }

    pub const fn target_status(self) -> BoardingApprovalStatus {
        match self {
            ApprovalAction::Approve => BoardingApprovalStatus::PendingFinalApproval,
            ApprovalAction::Reject => BoardingApprovalStatus::Rejected,
            ApprovalAction::FinalApprove => BoardingApprovalStatus::FinalApproved,
            ApprovalAction::FinalReject => BoardingApprovalStatus::FinalRejected,
        }
    }

    pub const fn requires_reason(self) -> bool {
        matches!(self, ApprovalAction::Reject | ApprovalAction::FinalReject)
    }

    pub const fn is_final_stage(self) -> bool {
        matches!(
            self,
            ApprovalAction::FinalApprove | ApprovalAction::FinalReject
        )
    }
}

impl fmt::Display for ApprovalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} staff record {staff_id}: status is {current}, expected {expected}")]
pub struct StateError {
    pub staff_id: StaffId,
    pub action: ApprovalAction,
    pub current: BoardingApprovalStatus,
    pub expected: BoardingApprovalStatus,
}

/// Failure of a single approval operation.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    #[error("staff record {0} not found")]
    NotFound(StaffId),
    #[error("ticket {ticket} for staff record {staff_id} not found")]
    TicketMissing { staff_id: StaffId, ticket: TicketId },
    #[error("actor {actor} may not {action} staff boarded against ticket {ticket}")]
    PermissionDenied {
        actor: ActorId,
        action: ApprovalAction,
        ticket: TicketId,
    },
    #[error(transparent)]
    State(#[from] StateError),
    #[error("a reason is required to {0}")]
    MissingReason(ApprovalAction),
    #[error("no staff ids supplied")]
    EmptyBatch,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Applies `action` to a copy of `record`. The input is never modified, so a failed
/// transition leaves nothing to undo.
pub fn transition(
    record: &StaffRecord,
    action: ApprovalAction,
    stamp: AuditStamp,
) -> Result<StaffRecord, StateError> {
    let expected = action.required_status();
    if record.boarding_approval_status != expected {
        return Err(StateError {
            staff_id: record.id,
            action,
            current: record.boarding_approval_status,
            expected,
        });
    }

    let mut updated = record.clone();
    updated.boarding_approval_status = action.target_status();
    match action {
        ApprovalAction::Approve => updated.audit.approval = Some(stamp),
        ApprovalAction::Reject => updated.audit.rejection = Some(stamp),
        ApprovalAction::FinalApprove => {
            updated.audit.final_approval = Some(stamp);
            if updated.offer_status == OfferStatus::Accepted {
                updated.employment_status = EmploymentStatus::Active;
            }
        }
        ApprovalAction::FinalReject => updated.audit.final_rejection = Some(stamp),
    }

    Ok(updated)
}

/// Non-blank reason or note, trimmed.
pub fn clean_note(note: Option<String>) -> Option<String> {
    note.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovedItem {
    pub id: StaffId,
    pub staff_name: String,
    pub status: BoardingApprovalStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub id: StaffId,
    pub error: String,
}

/// Per-item results of a bulk operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkApprovalReport {
    pub approved: Vec<ApprovedItem>,
    pub failed: Vec<FailedItem>,
    pub total: usize,
    pub approved_count: usize,
    pub failed_count: usize,
    /// Percentage of items that succeeded, rounded to two decimals.
    pub success_rate: f64,
}

impl BulkApprovalReport {
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = (StaffId, Result<StaffRecord, ApprovalError>)>,
    {
        let mut approved = Vec::new();
        let mut failed = Vec::new();
        for (id, result) in results {
            match result {
                Ok(record) => approved.push(ApprovedItem {
                    id,
                    staff_name: record.full_name(),
                    status: record.boarding_approval_status,
                }),
                Err(err) => failed.push(FailedItem {
                    id,
                    error: err.to_string(),
                }),
            }
        }

        let total = approved.len() + failed.len();
        let success_rate = if total == 0 {
            0.0
        } else {
            (approved.len() as f64 / total as f64 * 10_000.0).round() / 100.0
        };

        Self {
            approved_count: approved.len(),
            failed_count: failed.len(),
            approved,
            failed,
            total,
            success_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_table_is_consistent() {
        for action in [
            ApprovalAction::Approve,
            ApprovalAction::Reject,
            ApprovalAction::FinalApprove,
            ApprovalAction::FinalReject,
        ] {
            assert!(!action.required_status().is_terminal());
            assert_ne!(action.required_status(), action.target_status());
        }
        assert!(ApprovalAction::Reject.requires_reason());
        assert!(ApprovalAction::FinalReject.requires_reason());
        assert!(!ApprovalAction::FinalApprove.requires_reason());
        assert!(ApprovalAction::FinalReject.is_final_stage());
        assert!(!ApprovalAction::Reject.is_final_stage());
    }

    #[test]
    fn notes_are_trimmed_and_blank_is_none() {
        assert_eq!(clean_note(Some("  ok ".to_string())).as_deref(), Some("ok"));
        assert_eq!(clean_note(Some("   ".to_string())), None);
        assert_eq!(clean_note(None), None);
    }

    #[test]
    fn success_rate_rounds_to_two_decimals() {
        let results = vec![
            (StaffId(1), Err(ApprovalError::NotFound(StaffId(1)))),
            (StaffId(2), Err(ApprovalError::NotFound(StaffId(2)))),
        ];
        let report = BulkApprovalReport::from_results(results);
        assert_eq!(report.success_rate, 0.0);
        assert_eq!(report.failed_count, 2);
        assert_eq!(report.failed[0].error, "staff record 1 not found");

        let empty =
            BulkApprovalReport::from_results(Vec::<(StaffId, Result<StaffRecord, _>)>::new());
        assert_eq!(empty.total, 0);
        assert_eq!(empty.success_rate, 0.0);
    }
}
