use super::domain::{
    BoardingApprovalStatus, ClientId, JobStructureId, NewStaffRecord, PayGradeReference,
    RecruitmentTicket, StaffId, StaffRecord, StaffType, SubordinateRecord, TicketId,
};

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("record status changed concurrently (now {0})")]
    StatusChanged(BoardingApprovalStatus),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read-only reference data owned by the recruitment and compensation modules.
pub trait ReferenceDirectory: Send + Sync {
    fn ticket(&self, id: TicketId) -> Result<Option<RecruitmentTicket>, RepositoryError>;

    /// Looks up an active grade; `code` is already normalized.
    fn active_pay_grade(
        &self,
        job_structure_id: JobStructureId,
        code: &str,
    ) -> Result<Option<PayGradeReference>, RepositoryError>;
}

/// Existence checks for the two uniqueness domains. These are advisory; the insert is
/// what actually enforces uniqueness.
pub trait StaffLookup {
    fn employee_code_exists(&self, client_id: ClientId, code: &str)
        -> Result<bool, RepositoryError>;

    fn staff_identifier_exists(&self, staff_identifier: &str) -> Result<bool, RepositoryError>;
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait StaffRepository: StaffLookup + Send + Sync {
    fn begin(&self) -> Result<Box<dyn BoardingTransaction + '_>, RepositoryError>;

    fn fetch(&self, id: StaffId) -> Result<Option<StaffRecord>, RepositoryError>;

    /// Records in the given status, oldest first.
    fn with_status(
        &self,
        status: BoardingApprovalStatus,
    ) -> Result<Vec<StaffRecord>, RepositoryError>;

    /// Replaces the stored record only if its status is still `expected`.
    fn update_status(
        &self,
        record: &StaffRecord,
        expected: BoardingApprovalStatus,
    ) -> Result<(), RepositoryError>;
}

/// Batch-scoped unit of work. Lookups see the transaction's own pending writes; dropping
/// it without calling [`BoardingTransaction::commit`] discards everything.
pub trait BoardingTransaction: StaffLookup {
    fn find_staff_type(
        &self,
        client_id: ClientId,
        code: &str,
    ) -> Result<Option<StaffType>, RepositoryError>;

    fn insert_staff_type(
        &mut self,
        client_id: ClientId,
        code: &str,
        title: &str,
    ) -> Result<StaffType, RepositoryError>;

    /// Fails with [`RepositoryError::Conflict`] when either unique key is already taken.
    fn insert_staff(&mut self, record: NewStaffRecord) -> Result<StaffRecord, RepositoryError>;

    fn insert_subordinate(
        &mut self,
        staff_id: StaffId,
        record: SubordinateRecord,
    ) -> Result<(), RepositoryError>;

    /// Adds `boarded` to the ticket's accepted count and returns the new count.
    fn record_boarded(&mut self, ticket_id: TicketId, boarded: u32)
        -> Result<u32, RepositoryError>;

    fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}
