use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Deserialize;

use super::domain::{
    normalize_grade_code, BoardingApprovalStatus, ClientId, JobStructureId, NewStaffRecord,
    PayGradeReference, RecruitmentTicket, StaffId, StaffRecord, StaffType, StaffTypeId,
    SubordinateRecord, TicketId,
};
use super::repository::{
    BoardingTransaction, ReferenceDirectory, RepositoryError, StaffLookup, StaffRepository,
};

/// Reference data and existing staff used to seed an in-memory store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardingFixtures {
    #[serde(default)]
    pub tickets: Vec<RecruitmentTicket>,
    #[serde(default)]
    pub pay_grades: Vec<PayGradeReference>,
    #[serde(default)]
    pub staff: Vec<StaffRecord>,
}

#[derive(Debug, Default)]
struct StoreState {
    tickets: HashMap<TicketId, RecruitmentTicket>,
    pay_grades: Vec<PayGradeReference>,
    staff: BTreeMap<StaffId, StaffRecord>,
    staff_types: Vec<StaffType>,
    subordinates: Vec<(StaffId, SubordinateRecord)>,
}

impl StoreState {
    fn employee_code_taken(&self, client_id: ClientId, code: &str) -> bool {
        self.staff
            .values()
            .any(|record| same_employee_code(record, client_id, code))
    }

    fn staff_identifier_taken(&self, staff_identifier: &str) -> bool {
        self.staff
            .values()
            .any(|record| record.profile.staff_identifier == staff_identifier)
    }
}

fn same_employee_code(record: &StaffRecord, client_id: ClientId, code: &str) -> bool {
    record.profile.client_id == client_id && record.profile.employee_code == code
}

fn conflict_for(
    record: &StaffRecord,
    state: &StoreState,
    pending: &[StaffRecord],
) -> Option<String> {
    let profile = &record.profile;
    let code_taken = state.employee_code_taken(profile.client_id, &profile.employee_code)
        || pending
            .iter()
            .any(|other| same_employee_code(other, profile.client_id, &profile.employee_code));
    if code_taken {
        return Some(format!(
            "Employee Code '{}' already exists for client {}",
            profile.employee_code, profile.client_id.0
        ));
    }

    let identifier_taken = state.staff_identifier_taken(&profile.staff_identifier)
        || pending
            .iter()
            .any(|other| other.profile.staff_identifier == profile.staff_identifier);
    if identifier_taken {
        return Some(format!(
            "Staff ID '{}' already exists",
            profile.staff_identifier
        ));
    }

    None
}

/// Process-local store backing every persistence trait of the boarding workflow. The
/// unique keys are enforced when a staff record is inserted and again when a
/// transaction commits, so two overlapping uploads cannot both create the same person.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardingStore {
    state: Arc<Mutex<StoreState>>,
    staff_sequence: Arc<AtomicU64>,
    type_sequence: Arc<AtomicU64>,
}

impl InMemoryBoardingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixtures(fixtures: BoardingFixtures) -> Result<Self, RepositoryError> {
        let store = Self::new();
        for ticket in fixtures.tickets {
            store.insert_ticket(ticket)?;
        }
        for grade in fixtures.pay_grades {
            store.insert_pay_grade(grade)?;
        }
        for record in fixtures.staff {
            store.seed_staff(record)?;
        }
        Ok(store)
    }

    pub fn insert_ticket(&self, ticket: RecruitmentTicket) -> Result<(), RepositoryError> {
        self.lock()?.tickets.insert(ticket.id, ticket);
        Ok(())
    }

    pub fn insert_pay_grade(&self, grade: PayGradeReference) -> Result<(), RepositoryError> {
        self.lock()?.pay_grades.push(grade);
        Ok(())
    }

    /// Inserts an already-identified record, bypassing the boarding pipeline.
    pub fn seed_staff(&self, record: StaffRecord) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if let Some(reason) = conflict_for(&record, &state, &[]) {
            return Err(RepositoryError::Conflict(reason));
        }
        self.staff_sequence.fetch_max(record.id.0, Ordering::SeqCst);
        state.staff.insert(record.id, record);
        Ok(())
    }

    pub fn subordinates_of(
        &self,
        staff_id: StaffId,
    ) -> Result<Vec<SubordinateRecord>, RepositoryError> {
        Ok(self
            .lock()?
            .subordinates
            .iter()
            .filter(|(owner, _)| *owner == staff_id)
            .map(|(_, record)| record.clone())
            .collect())
    }

    pub fn staff_types(&self) -> Result<Vec<StaffType>, RepositoryError> {
        Ok(self.lock()?.staff_types.clone())
    }

    pub fn staff_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.staff.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("boarding store lock poisoned".to_string()))
    }

    fn next_staff_id(&self) -> StaffId {
        StaffId(self.staff_sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn next_type_id(&self) -> StaffTypeId {
        StaffTypeId(self.type_sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl ReferenceDirectory for InMemoryBoardingStore {
    fn ticket(&self, id: TicketId) -> Result<Option<RecruitmentTicket>, RepositoryError> {
        Ok(self.lock()?.tickets.get(&id).cloned())
    }

    fn active_pay_grade(
        &self,
        job_structure_id: JobStructureId,
        code: &str,
    ) -> Result<Option<PayGradeReference>, RepositoryError> {
        Ok(self
            .lock()?
            .pay_grades
            .iter()
            .find(|grade| {
                grade.active
                    && grade.job_structure_id == job_structure_id
                    && normalize_grade_code(&grade.code) == code
            })
            .cloned())
    }
}

impl StaffLookup for InMemoryBoardingStore {
    fn employee_code_exists(
        &self,
        client_id: ClientId,
        code: &str,
    ) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.employee_code_taken(client_id, code))
    }

    fn staff_identifier_exists(&self, staff_identifier: &str) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.staff_identifier_taken(staff_identifier))
    }
}

impl StaffRepository for InMemoryBoardingStore {
    fn begin(&self) -> Result<Box<dyn BoardingTransaction + '_>, RepositoryError> {
        Ok(Box::new(InMemoryTransaction {
            store: self,
            staff: Vec::new(),
            staff_types: Vec::new(),
            subordinates: Vec::new(),
            boarded: HashMap::new(),
        }))
    }

    fn fetch(&self, id: StaffId) -> Result<Option<StaffRecord>, RepositoryError> {
        Ok(self.lock()?.staff.get(&id).cloned())
    }

    fn with_status(
        &self,
        status: BoardingApprovalStatus,
    ) -> Result<Vec<StaffRecord>, RepositoryError> {
        let mut records: Vec<_> = self
            .lock()?
            .staff
            .values()
            .filter(|record| record.boarding_approval_status == status)
            .cloned()
            .collect();
        records.sort_by_key(|record| (record.created_at, record.id));
        Ok(records)
    }

    fn update_status(
        &self,
        record: &StaffRecord,
        expected: BoardingApprovalStatus,
    ) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        let stored = state
            .staff
            .get_mut(&record.id)
            .ok_or(RepositoryError::NotFound)?;
        if stored.boarding_approval_status != expected {
            return Err(RepositoryError::StatusChanged(
                stored.boarding_approval_status,
            ));
        }

        stored.boarding_approval_status = record.boarding_approval_status;
        stored.employment_status = record.employment_status;
        stored.audit = record.audit.clone();
        Ok(())
    }
}

/// Pending writes of one commit. Nothing reaches the shared state until `commit`.
struct InMemoryTransaction<'a> {
    store: &'a InMemoryBoardingStore,
    staff: Vec<StaffRecord>,
    staff_types: Vec<StaffType>,
    subordinates: Vec<(StaffId, SubordinateRecord)>,
    boarded: HashMap<TicketId, u32>,
}

impl StaffLookup for InMemoryTransaction<'_> {
    fn employee_code_exists(
        &self,
        client_id: ClientId,
        code: &str,
    ) -> Result<bool, RepositoryError> {
        if self
            .staff
            .iter()
            .any(|record| same_employee_code(record, client_id, code))
        {
            return Ok(true);
        }
        self.store.employee_code_exists(client_id, code)
    }

    fn staff_identifier_exists(&self, staff_identifier: &str) -> Result<bool, RepositoryError> {
        if self
            .staff
            .iter()
            .any(|record| record.profile.staff_identifier == staff_identifier)
        {
            return Ok(true);
        }
        self.store.staff_identifier_exists(staff_identifier)
    }
}

impl BoardingTransaction for InMemoryTransaction<'_> {
    fn find_staff_type(
        &self,
        client_id: ClientId,
        code: &str,
    ) -> Result<Option<StaffType>, RepositoryError> {
        let matches = |staff_type: &&StaffType| {
            staff_type.client_id == client_id && staff_type.code == code
        };
        if let Some(found) = self.staff_types.iter().find(matches) {
            return Ok(Some(found.clone()));
        }
        Ok(self.store.lock()?.staff_types.iter().find(matches).cloned())
    }

    fn insert_staff_type(
        &mut self,
        client_id: ClientId,
        code: &str,
        title: &str,
    ) -> Result<StaffType, RepositoryError> {
        let staff_type = StaffType {
            id: self.store.next_type_id(),
            client_id,
            code: code.to_string(),
            title: title.to_string(),
        };
        self.staff_types.push(staff_type.clone());
        Ok(staff_type)
    }

    fn insert_staff(&mut self, record: NewStaffRecord) -> Result<StaffRecord, RepositoryError> {
        let record = record.into_record(StaffId(0));
        {
            let state = self.store.lock()?;
            if let Some(reason) = conflict_for(&record, &state, &self.staff) {
                return Err(RepositoryError::Conflict(reason));
            }
        }

        let record = StaffRecord {
            id: self.store.next_staff_id(),
            ..record
        };
        self.staff.push(record.clone());
        Ok(record)
    }

    fn insert_subordinate(
        &mut self,
        staff_id: StaffId,
        record: SubordinateRecord,
    ) -> Result<(), RepositoryError> {
        let owned_here = self.staff.iter().any(|staff| staff.id == staff_id);
        if !owned_here && !self.store.lock()?.staff.contains_key(&staff_id) {
            return Err(RepositoryError::NotFound);
        }
        self.subordinates.push((staff_id, record));
        Ok(())
    }

    fn record_boarded(
        &mut self,
        ticket_id: TicketId,
        boarded: u32,
    ) -> Result<u32, RepositoryError> {
        let accepted = self
            .store
            .lock()?
            .tickets
            .get(&ticket_id)
            .map(|ticket| ticket.accepted_count)
            .ok_or(RepositoryError::NotFound)?;

        let pending = self.boarded.entry(ticket_id).or_insert(0);
        *pending += boarded;
        Ok(accepted + *pending)
    }

    fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let store = self.store;
        let mut state = store.lock()?;

        for (index, record) in self.staff.iter().enumerate() {
            if let Some(reason) = conflict_for(record, &state, &self.staff[..index]) {
                return Err(RepositoryError::Conflict(reason));
            }
        }
        for ticket_id in self.boarded.keys() {
            if !state.tickets.contains_key(ticket_id) {
                return Err(RepositoryError::NotFound);
            }
        }

        let InMemoryTransaction {
            staff,
            staff_types,
            subordinates,
            boarded,
            ..
        } = *self;

        // A type committed concurrently under the same code replaces ours.
        let mut replaced: HashMap<StaffTypeId, StaffTypeId> = HashMap::new();
        for staff_type in staff_types {
            let existing = state
                .staff_types
                .iter()
                .find(|existing| {
                    existing.client_id == staff_type.client_id && existing.code == staff_type.code
                })
                .map(|existing| existing.id);
            match existing {
                Some(id) => {
                    replaced.insert(staff_type.id, id);
                }
                None => state.staff_types.push(staff_type),
            }
        }
        for mut record in staff {
            if let Some(id) = replaced.get(&record.profile.staff_type_id) {
                record.profile.staff_type_id = *id;
            }
            state.staff.insert(record.id, record);
        }
        state.subordinates.extend(subordinates);
        for (ticket_id, count) in boarded {
            if let Some(ticket) = state.tickets.get_mut(&ticket_id) {
                ticket.accepted_count += count;
            }
        }

        Ok(())
    }
}
