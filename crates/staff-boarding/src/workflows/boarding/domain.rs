use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for recruitment tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobStructureId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayGradeId(pub u64);

/// Identifier wrapper for persisted staff records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StaffId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StaffTypeId(pub u64);

/// Identifier of the person driving an upload or an approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticated caller. Authentication happens upstream; only the identity and the
/// role name used by the permission resolver travel through the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: String,
}

impl Actor {
    pub fn new(id: u64, role: impl Into<String>) -> Self {
        Self {
            id: ActorId(id),
            role: role.into(),
        }
    }
}

/// Recruitment vacancy the upload is boarded against. Owned by the recruitment module;
/// boarding only reads it and bumps the accepted count on commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitmentTicket {
    pub id: TicketId,
    pub client_id: ClientId,
    pub job_structure_id: JobStructureId,
    pub vacancy_count: u32,
    #[serde(default)]
    pub accepted_count: u32,
    #[serde(default)]
    pub created_by: Option<ActorId>,
    #[serde(default)]
    pub assigned_to: Option<ActorId>,
}

impl RecruitmentTicket {
    pub fn available_slots(&self) -> u32 {
        self.vacancy_count.saturating_sub(self.accepted_count)
    }

    pub fn is_created_by(&self, actor: &Actor) -> bool {
        self.created_by == Some(actor.id)
    }

    pub fn is_assigned_to(&self, actor: &Actor) -> bool {
        self.assigned_to == Some(actor.id)
    }
}

/// Coded compensation tier scoped to a job structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayGradeReference {
    pub id: PayGradeId,
    pub job_structure_id: JobStructureId,
    pub code: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Canonical lookup key for grade codes: trimmed and upper-cased.
pub fn normalize_grade_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Two-stage boarding approval lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardingApprovalStatus {
    Pending,
    PendingFinalApproval,
    FinalApproved,
    Rejected,
    FinalRejected,
}

impl BoardingApprovalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            BoardingApprovalStatus::Pending => "pending",
            BoardingApprovalStatus::PendingFinalApproval => "pending_final_approval",
            BoardingApprovalStatus::FinalApproved => "final_approved",
            BoardingApprovalStatus::Rejected => "rejected",
            BoardingApprovalStatus::FinalRejected => "final_rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            BoardingApprovalStatus::FinalApproved
                | BoardingApprovalStatus::Rejected
                | BoardingApprovalStatus::FinalRejected
        )
    }

    pub const fn is_payroll_eligible(self) -> bool {
        matches!(self, BoardingApprovalStatus::FinalApproved)
    }
}

impl fmt::Display for BoardingApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
}

/// Whether the staff member is live on the roster. Only final approval of an accepted
/// offer activates a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Inactive,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
}

impl EmploymentType {
    /// Maps spreadsheet free text ("Full Time", "Contract staff", ...) onto the enum.
    pub fn from_free_text(raw: Option<&str>) -> Self {
        let Some(value) = raw.map(|value| value.trim().to_lowercase()) else {
            return Self::FullTime;
        };

        if value.contains("full") || value.contains("employment") {
            Self::FullTime
        } else if value.contains("part") {
            Self::PartTime
        } else if value.contains("contract") {
            Self::Contract
        } else if value.contains("intern") {
            Self::Internship
        } else if value.contains("temp") {
            Self::Temporary
        } else {
            Self::FullTime
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    BankTransfer,
    Cash,
    Cheque,
}

impl PaymentMode {
    pub fn from_free_text(raw: Option<&str>) -> Self {
        let Some(value) = raw.map(|value| value.trim().to_lowercase()) else {
            return Self::BankTransfer;
        };

        if value.contains("cash") {
            Self::Cash
        } else if value.contains("cheque") || value.contains("check") {
            Self::Cheque
        } else {
            Self::BankTransfer
        }
    }
}

/// Who did what, when, and with which note or reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub actor: ActorId,
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Audit columns for each approval transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardingAudit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<AuditStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<AuditStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_approval: Option<AuditStamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_rejection: Option<AuditStamp>,
}

/// Client-specific staff classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffType {
    pub id: StaffTypeId,
    pub client_id: ClientId,
    pub code: String,
    pub title: String,
}

/// Chooses the default staff type label for boarded staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffTypeRule {
    pub primary_client_id: ClientId,
}

impl StaffTypeRule {
    /// Returns `(code, title)` for the client.
    pub fn classify(&self, client_id: ClientId) -> (&'static str, &'static str) {
        if client_id == self.primary_client_id {
            ("PROF", "Professional")
        } else {
            ("ASSOC", "Associate")
        }
    }
}

impl Default for StaffTypeRule {
    fn default() -> Self {
        Self {
            primary_client_id: ClientId(1),
        }
    }
}

/// Identity and employment data fixed at boarding time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub client_id: ClientId,
    pub ticket_id: TicketId,
    pub staff_type_id: StaffTypeId,
    pub employee_code: String,
    pub staff_identifier: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    pub pay_grade_id: PayGradeId,
    pub grade_code: String,
    pub entry_date: NaiveDate,
    pub appointment_status: String,
    pub employment_type: EmploymentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

impl StaffProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Staff record awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaffRecord {
    pub profile: StaffProfile,
    pub boarding_approval_status: BoardingApprovalStatus,
    pub offer_status: OfferStatus,
    pub onboarded_by: ActorId,
    pub audit: BoardingAudit,
    pub created_at: DateTime<Utc>,
}

impl NewStaffRecord {
    pub fn into_record(self, id: StaffId) -> StaffRecord {
        StaffRecord {
            id,
            profile: self.profile,
            boarding_approval_status: self.boarding_approval_status,
            offer_status: self.offer_status,
            employment_status: EmploymentStatus::Inactive,
            onboarded_by: self.onboarded_by,
            audit: self.audit,
            created_at: self.created_at,
        }
    }
}

/// Core persisted entity. The approval workflow only ever touches the status fields and
/// the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRecord {
    pub id: StaffId,
    #[serde(flatten)]
    pub profile: StaffProfile,
    pub boarding_approval_status: BoardingApprovalStatus,
    pub offer_status: OfferStatus,
    pub employment_status: EmploymentStatus,
    pub onboarded_by: ActorId,
    pub audit: BoardingAudit,
    pub created_at: DateTime<Utc>,
}

impl StaffRecord {
    pub fn full_name(&self) -> String {
        self.profile.full_name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubordinateKind {
    Banking,
    PersonalInfo,
    LegalIds,
    EmergencyContact,
    Guarantor,
    Education,
    Experience,
}

impl SubordinateKind {
    pub const fn label(self) -> &'static str {
        match self {
            SubordinateKind::Banking => "banking",
            SubordinateKind::PersonalInfo => "personal info",
            SubordinateKind::LegalIds => "legal IDs",
            SubordinateKind::EmergencyContact => "emergency contact",
            SubordinateKind::Guarantor => "guarantor",
            SubordinateKind::Education => "education",
            SubordinateKind::Experience => "experience",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankingDetails {
    pub payment_mode: PaymentMode,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_name: Option<String>,
    pub sort_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub middle_name: Option<String>,
    pub marital_status: Option<String>,
    pub nationality: String,
    pub state_of_origin: Option<String>,
    pub lga_of_origin: Option<String>,
    pub current_address: Option<String>,
    pub permanent_address: Option<String>,
    pub mobile_phone: Option<String>,
    pub personal_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalIdentifiers {
    pub national_id_no: Option<String>,
    pub tax_id_no: Option<String>,
    pub pension_pin: Option<String>,
    pub pfa_name: Option<String>,
    pub bank_verification_no: Option<String>,
    pub nhf_account_no: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone_number: String,
    pub relationship: String,
    pub address: Option<String>,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guarantor {
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationHistory {
    pub institution_name: String,
    pub certificate_type: String,
    pub specialization: Option<String>,
    pub graduation_year: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentHistory {
    pub employer_name: String,
    pub designation: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Records owned by exactly one staff record, created only while committing an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubordinateRecord {
    Banking(BankingDetails),
    PersonalInfo(PersonalInfo),
    LegalIds(LegalIdentifiers),
    EmergencyContact(EmergencyContact),
    Guarantor(Guarantor),
    Education(EducationHistory),
    Experience(EmploymentHistory),
}

impl SubordinateRecord {
    pub fn kind(&self) -> SubordinateKind {
        match self {
            SubordinateRecord::Banking(_) => SubordinateKind::Banking,
            SubordinateRecord::PersonalInfo(_) => SubordinateKind::PersonalInfo,
            SubordinateRecord::LegalIds(_) => SubordinateKind::LegalIds,
            SubordinateRecord::EmergencyContact(_) => SubordinateKind::EmergencyContact,
            SubordinateRecord::Guarantor(_) => SubordinateKind::Guarantor,
            SubordinateRecord::Education(_) => SubordinateKind::Education,
            SubordinateRecord::Experience(_) => SubordinateKind::Experience,
        }
    }
}
