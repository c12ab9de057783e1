use std::io::Cursor;
use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::boarding::domain::{
    Actor, ActorId, BoardingApprovalStatus, BoardingAudit, ClientId, EmploymentStatus,
    EmploymentType, JobStructureId, OfferStatus, PayGradeId, PayGradeReference,
    RecruitmentTicket, StaffId, StaffProfile, StaffRecord, StaffTypeId, TicketId,
};
use crate::workflows::boarding::repository::{
    BoardingTransaction, ReferenceDirectory, RepositoryError, StaffLookup, StaffRepository,
};
use crate::workflows::boarding::upload::{ParsedRow, ParsedUpload};
use crate::workflows::boarding::{
    boarding_router, BoardingService, Clock, InMemoryBoardingStore, RoleHierarchy,
};

pub(super) const TICKET: TicketId = TicketId(10);
pub(super) const CLIENT: ClientId = ClientId(1);
pub(super) const JOB_STRUCTURE: JobStructureId = JobStructureId(3);

pub(super) const HEADER: &str =
    "Employee Code,Staff ID,First Name,Last Name,Grade Code,Entry Date";

pub(super) type TestService =
    BoardingService<InMemoryBoardingStore, InMemoryBoardingStore, RoleHierarchy>;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        now()
    }
}

pub(super) fn ticket(vacancy_count: u32, accepted_count: u32) -> RecruitmentTicket {
    RecruitmentTicket {
        id: TICKET,
        client_id: CLIENT,
        job_structure_id: JOB_STRUCTURE,
        vacancy_count,
        accepted_count,
        created_by: Some(ActorId(100)),
        assigned_to: Some(ActorId(200)),
    }
}

pub(super) fn pay_grades() -> Vec<PayGradeReference> {
    vec![
        PayGradeReference {
            id: PayGradeId(1),
            job_structure_id: JOB_STRUCTURE,
            code: "ENG-01".to_string(),
            active: true,
        },
        PayGradeReference {
            id: PayGradeId(2),
            job_structure_id: JOB_STRUCTURE,
            code: "eng-02".to_string(),
            active: true,
        },
        PayGradeReference {
            id: PayGradeId(3),
            job_structure_id: JOB_STRUCTURE,
            code: "OPS-01".to_string(),
            active: false,
        },
        PayGradeReference {
            id: PayGradeId(4),
            job_structure_id: JobStructureId(4),
            code: "MGR-01".to_string(),
            active: true,
        },
    ]
}

pub(super) fn seeded_store(ticket: RecruitmentTicket) -> InMemoryBoardingStore {
    let store = InMemoryBoardingStore::new();
    store.insert_ticket(ticket).expect("ticket seeds");
    for grade in pay_grades() {
        store.insert_pay_grade(grade).expect("pay grade seeds");
    }
    store
}

pub(super) fn build_service(store: &InMemoryBoardingStore) -> Arc<TestService> {
    Arc::new(
        BoardingService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(RoleHierarchy::standard()),
        )
        .with_clock(Arc::new(FixedClock)),
    )
}

pub(super) fn router_for(store: &InMemoryBoardingStore) -> Router {
    boarding_router(build_service(store))
}

/// Created the ticket; skips the first approval stage on its own uploads.
pub(super) fn ticket_creator() -> Actor {
    Actor::new(100, "recruiter")
}

/// Assigned to the ticket; uploads land in `pending`.
pub(super) fn recruiter() -> Actor {
    Actor::new(200, "recruiter")
}

pub(super) fn supervisor() -> Actor {
    Actor::new(300, "supervisor")
}

pub(super) fn control() -> Actor {
    Actor::new(400, "control")
}

pub(super) fn hr_manager() -> Actor {
    Actor::new(500, "hr_manager")
}

pub(super) fn outsider() -> Actor {
    Actor::new(600, "recruiter")
}

pub(super) fn staff_row(n: usize) -> String {
    format!("EMP-{n:03},STF-{n:03},First{n},Last{n},ENG-01,2025-01-15")
}

pub(super) fn upload<I>(rows: I) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut csv = String::from(HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(&row);
    }
    csv.push('\n');
    csv
}

pub(super) fn valid_upload(count: usize) -> String {
    upload((1..=count).map(staff_row))
}

pub(super) fn parse(csv: &str) -> ParsedUpload {
    ParsedUpload::from_reader(Cursor::new(csv.as_bytes().to_vec())).expect("upload parses")
}

pub(super) fn single_row(csv: &str) -> ParsedRow {
    let mut parsed = parse(csv);
    assert_eq!(parsed.rows.len(), 1, "expected exactly one data row");
    parsed.rows.remove(0)
}

pub(super) fn existing_staff(
    id: u64,
    employee_code: &str,
    staff_identifier: &str,
    status: BoardingApprovalStatus,
) -> StaffRecord {
    StaffRecord {
        id: StaffId(id),
        profile: StaffProfile {
            client_id: CLIENT,
            ticket_id: TICKET,
            staff_type_id: StaffTypeId(1),
            employee_code: employee_code.to_string(),
            staff_identifier: staff_identifier.to_string(),
            first_name: "Grace".to_string(),
            middle_name: None,
            last_name: "Hopper".to_string(),
            email: None,
            mobile_phone: None,
            gender: None,
            date_of_birth: None,
            pay_grade_id: PayGradeId(1),
            grade_code: "ENG-01".to_string(),
            entry_date: date(2024, 6, 1),
            appointment_status: "probation".to_string(),
            employment_type: EmploymentType::FullTime,
            department: None,
            job_title: None,
        },
        boarding_approval_status: status,
        offer_status: OfferStatus::Pending,
        employment_status: EmploymentStatus::Inactive,
        onboarded_by: ActorId(200),
        audit: BoardingAudit::default(),
        created_at: now(),
    }
}

/// Commits `count` valid rows as the assigned recruiter and returns the new ids.
pub(super) fn board_pending(service: &TestService, count: usize) -> Vec<StaffId> {
    let report = service
        .commit(
            TICKET,
            &recruiter(),
            Cursor::new(valid_upload(count).into_bytes()),
            false,
        )
        .expect("commit succeeds");
    assert_eq!(report.successful_records, count);
    report.created_staff.iter().map(|staff| staff.id).collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Every call fails as if the backing database were down.
pub(super) struct UnavailableStore;

fn unavailable<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl ReferenceDirectory for UnavailableStore {
    fn ticket(&self, _id: TicketId) -> Result<Option<RecruitmentTicket>, RepositoryError> {
        unavailable()
    }

    fn active_pay_grade(
        &self,
        _job_structure_id: JobStructureId,
        _code: &str,
    ) -> Result<Option<PayGradeReference>, RepositoryError> {
        unavailable()
    }
}

impl StaffLookup for UnavailableStore {
    fn employee_code_exists(
        &self,
        _client_id: ClientId,
        _code: &str,
    ) -> Result<bool, RepositoryError> {
        unavailable()
    }

    fn staff_identifier_exists(&self, _staff_identifier: &str) -> Result<bool, RepositoryError> {
        unavailable()
    }
}

impl StaffRepository for UnavailableStore {
    fn begin(&self) -> Result<Box<dyn BoardingTransaction + '_>, RepositoryError> {
        unavailable()
    }

    fn fetch(&self, _id: StaffId) -> Result<Option<StaffRecord>, RepositoryError> {
        unavailable()
    }

    fn with_status(
        &self,
        _status: BoardingApprovalStatus,
    ) -> Result<Vec<StaffRecord>, RepositoryError> {
        unavailable()
    }

    fn update_status(
        &self,
        _record: &StaffRecord,
        _expected: BoardingApprovalStatus,
    ) -> Result<(), RepositoryError> {
        unavailable()
    }
}
