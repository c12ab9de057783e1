use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::approval::{
    clean_note, transition, ApprovalAction, ApprovalError, BulkApprovalReport, StateError,
};
use super::commit::{BoardingStart, CommitPipeline, CommitReport};
use super::domain::{
    Actor, ActorId, AuditStamp, OfferStatus, RecruitmentTicket, StaffId, StaffRecord,
    StaffTypeRule, TicketId,
};
use super::permissions::PermissionResolver;
use super::preview::{assemble_preview, PreviewReport};
use super::repository::{ReferenceDirectory, RepositoryError, StaffRepository};
use super::upload::{ParsedUpload, UploadError};

/// Source of timestamps for audit stamps and created records.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Service composing the upload pipeline, the approval workflow, and their stores.
pub struct BoardingService<R, D, P> {
    repository: Arc<R>,
    directory: Arc<D>,
    permissions: Arc<P>,
    clock: Arc<dyn Clock>,
    staff_types: StaffTypeRule,
}

impl<R, D, P> BoardingService<R, D, P>
where
    R: StaffRepository + 'static,
    D: ReferenceDirectory + 'static,
    P: PermissionResolver + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<D>, permissions: Arc<P>) -> Self {
        Self {
            repository,
            directory,
            permissions,
            clock: Arc::new(SystemClock),
            staff_types: StaffTypeRule::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_staff_type_rule(mut self, rule: StaffTypeRule) -> Self {
        self.staff_types = rule;
        self
    }

    /// Validates an upload against the ticket without writing anything.
    pub fn preview<U: Read>(
        &self,
        ticket_id: TicketId,
        actor: &Actor,
        upload: U,
    ) -> Result<PreviewReport, BoardingError> {
        let ticket = self.usable_ticket(ticket_id, actor)?;
        let parsed = ParsedUpload::from_reader(upload)?;

        let report = assemble_preview(
            &ticket,
            parsed,
            self.repository.as_ref(),
            self.directory.as_ref(),
        )?;

        info!(
            ticket = %ticket_id,
            actor = %actor.id,
            total = report.total_rows,
            valid = report.valid_rows,
            invalid = report.invalid_rows,
            can_proceed = report.can_proceed,
            "boarding preview assembled"
        );
        Ok(report)
    }

    /// Boards every valid row in one transaction. Invalid rows are reported and skipped;
    /// any storage failure rolls the whole batch back.
    pub fn commit<U: Read>(
        &self,
        ticket_id: TicketId,
        actor: &Actor,
        upload: U,
        offer_already_accepted: bool,
    ) -> Result<CommitReport, BoardingError> {
        let ticket = self.usable_ticket(ticket_id, actor)?;
        let parsed = ParsedUpload::from_reader(upload)?;
        let now = self.clock.now();

        let pipeline = CommitPipeline {
            ticket: &ticket,
            directory: self.directory.as_ref(),
            submitter: actor,
            start: BoardingStart::for_submitter(
                actor,
                self.permissions.may_skip_approval(actor, &ticket),
                now,
            ),
            offer_status: if offer_already_accepted {
                OfferStatus::Accepted
            } else {
                OfferStatus::Pending
            },
            staff_types: self.staff_types,
            now,
        };

        let mut tx = self.repository.begin()?;
        let report = match pipeline.run(tx.as_mut(), parsed) {
            Ok(report) => report,
            Err(err) => {
                error!(ticket = %ticket_id, error = %err, "boarding commit rolled back");
                return Err(err.into());
            }
        };

        if let Err(err) = tx.commit() {
            error!(ticket = %ticket_id, error = %err, "boarding commit rolled back");
            return Err(err.into());
        }

        info!(
            ticket = %ticket_id,
            actor = %actor.id,
            succeeded = report.successful_records,
            failed = report.failed_records,
            filled = report.ticket_status.filled,
            total = report.ticket_status.total,
            "boarding commit finished"
        );
        Ok(report)
    }

    pub fn get(&self, staff_id: StaffId) -> Result<StaffRecord, ApprovalError> {
        self.repository
            .fetch(staff_id)?
            .ok_or(ApprovalError::NotFound(staff_id))
    }

    /// Records waiting on `actor`: first-stage items they may approve and final-stage
    /// items they may finalize, oldest first.
    pub fn pending_for(&self, actor: &Actor) -> Result<Vec<StaffRecord>, ApprovalError> {
        let mut tickets: HashMap<TicketId, Option<RecruitmentTicket>> = HashMap::new();
        let mut queue = Vec::new();

        for action in [ApprovalAction::Approve, ApprovalAction::FinalApprove] {
            for record in self.repository.with_status(action.required_status())? {
                let ticket_id = record.profile.ticket_id;
                let ticket = match tickets.get(&ticket_id) {
                    Some(cached) => cached.clone(),
                    None => {
                        let loaded = self.directory.ticket(ticket_id)?;
                        tickets.insert(ticket_id, loaded.clone());
                        loaded
                    }
                };

                if let Some(ticket) = ticket {
                    if self.is_permitted(actor, &ticket, action) {
                        queue.push(record);
                    }
                }
            }
        }

        queue.sort_by_key(|record| (record.created_at, record.id));
        Ok(queue)
    }

    pub fn approve(
        &self,
        staff_id: StaffId,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<StaffRecord, ApprovalError> {
        self.apply(staff_id, actor, ApprovalAction::Approve, notes)
    }

    pub fn reject(
        &self,
        staff_id: StaffId,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<StaffRecord, ApprovalError> {
        self.apply(staff_id, actor, ApprovalAction::Reject, reason)
    }

    pub fn final_approve(
        &self,
        staff_id: StaffId,
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<StaffRecord, ApprovalError> {
        self.apply(staff_id, actor, ApprovalAction::FinalApprove, notes)
    }

    pub fn final_reject(
        &self,
        staff_id: StaffId,
        actor: &Actor,
        reason: Option<String>,
    ) -> Result<StaffRecord, ApprovalError> {
        self.apply(staff_id, actor, ApprovalAction::FinalReject, reason)
    }

    pub fn bulk_approve(
        &self,
        staff_ids: &[StaffId],
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<BulkApprovalReport, ApprovalError> {
        self.apply_bulk(staff_ids, actor, ApprovalAction::Approve, notes)
    }

    pub fn bulk_final_approve(
        &self,
        staff_ids: &[StaffId],
        actor: &Actor,
        notes: Option<String>,
    ) -> Result<BulkApprovalReport, ApprovalError> {
        self.apply_bulk(staff_ids, actor, ApprovalAction::FinalApprove, notes)
    }

    fn apply_bulk(
        &self,
        staff_ids: &[StaffId],
        actor: &Actor,
        action: ApprovalAction,
        notes: Option<String>,
    ) -> Result<BulkApprovalReport, ApprovalError> {
        if staff_ids.is_empty() {
            return Err(ApprovalError::EmptyBatch);
        }

        let results = staff_ids
            .iter()
            .map(|&staff_id| (staff_id, self.apply(staff_id, actor, action, notes.clone())));
        let report = BulkApprovalReport::from_results(results);

        info!(
            actor = %actor.id,
            action = %action,
            total = report.total,
            approved = report.approved_count,
            failed = report.failed_count,
            "bulk boarding approval processed"
        );
        Ok(report)
    }

    fn apply(
        &self,
        staff_id: StaffId,
        actor: &Actor,
        action: ApprovalAction,
        note: Option<String>,
    ) -> Result<StaffRecord, ApprovalError> {
        let note = clean_note(note);
        if action.requires_reason() && note.is_none() {
            return Err(ApprovalError::MissingReason(action));
        }

        let record = self.get(staff_id)?;
        let ticket_id = record.profile.ticket_id;
        let ticket = self
            .directory
            .ticket(ticket_id)?
            .ok_or(ApprovalError::TicketMissing {
                staff_id,
                ticket: ticket_id,
            })?;

        if !self.is_permitted(actor, &ticket, action) {
            return Err(ApprovalError::PermissionDenied {
                actor: actor.id,
                action,
                ticket: ticket_id,
            });
        }

        let stamp = AuditStamp {
            actor: actor.id,
            at: self.clock.now(),
            note,
        };
        let updated = transition(&record, action, stamp)?;

        self.repository
            .update_status(&updated, record.boarding_approval_status)
            .map_err(|err| match err {
                RepositoryError::StatusChanged(current) => ApprovalError::State(StateError {
                    staff_id,
                    action,
                    current,
                    expected: action.required_status(),
                }),
                RepositoryError::NotFound => ApprovalError::NotFound(staff_id),
                other => ApprovalError::Repository(other),
            })?;

        info!(
            staff_id = %staff_id,
            from = %record.boarding_approval_status,
            to = %updated.boarding_approval_status,
            actor = %actor.id,
            "boarding approval transition"
        );
        Ok(updated)
    }

    fn is_permitted(
        &self,
        actor: &Actor,
        ticket: &RecruitmentTicket,
        action: ApprovalAction,
    ) -> bool {
        if action.is_final_stage() {
            self.permissions.may_final_approve(actor, ticket)
        } else {
            self.permissions.may_approve(actor, ticket)
        }
    }

    fn usable_ticket(
        &self,
        ticket_id: TicketId,
        actor: &Actor,
    ) -> Result<RecruitmentTicket, BoardingError> {
        let ticket = self
            .directory
            .ticket(ticket_id)?
            .ok_or(BoardingError::TicketNotFound(ticket_id))?;

        if !self.permissions.can_use_ticket(actor, &ticket) {
            return Err(BoardingError::TicketAccessDenied {
                actor: actor.id,
                ticket: ticket_id,
            });
        }

        Ok(ticket)
    }
}

/// Whole-request failures of preview and commit.
#[derive(Debug, thiserror::Error)]
pub enum BoardingError {
    #[error("recruitment ticket {0} not found")]
    TicketNotFound(TicketId),
    #[error("actor {actor} may not board staff against ticket {ticket}")]
    TicketAccessDenied { actor: ActorId, ticket: TicketId },
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
