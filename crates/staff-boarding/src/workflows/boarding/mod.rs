//! Bulk staff boarding against recruitment tickets.
//!
//! An upload is parsed and validated row by row, previewed without side effects, and
//! committed in a single transaction. Every boarded record then moves through a two-stage
//! approval workflow before it becomes payroll-eligible.

pub mod approval;
pub mod commit;
pub mod domain;
pub mod memory;
pub mod permissions;
pub mod preview;
pub mod repository;
pub mod router;
pub mod service;
pub(crate) mod subordinate;
pub mod upload;
pub mod validation;

#[cfg(test)]
mod tests;

pub use approval::{ApprovalAction, ApprovalError, BulkApprovalReport, StateError};
pub use commit::{CommitReport, CreatedStaff, TicketFill};
pub use domain::{
    Actor, ActorId, BoardingApprovalStatus, ClientId, EmploymentStatus, JobStructureId,
    OfferStatus, PayGradeId, PayGradeReference, RecruitmentTicket, StaffId, StaffRecord,
    StaffTypeRule, SubordinateRecord, TicketId,
};
pub use memory::{BoardingFixtures, InMemoryBoardingStore};
pub use permissions::{PermissionResolver, RoleHierarchy, RolePermissions};
pub use preview::{InvalidRecord, PreviewReport};
pub use repository::{
    BoardingTransaction, ReferenceDirectory, RepositoryError, StaffLookup, StaffRepository,
};
pub use router::boarding_router;
pub use service::{BoardingError, BoardingService, Clock, SystemClock};
pub use upload::{ParsedUpload, UploadError, UploadField};
pub use validation::{IssueKind, RejectedRow, RowIssue};
