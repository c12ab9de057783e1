use serde::Serialize;

/// Semantic column names accepted from the boarding upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadField {
    EmployeeCode,
    StaffIdentifier,
    FirstName,
    LastName,
    MiddleName,
    GradeCode,
    EntryDate,
    Email,
    MobilePhone,
    Gender,
    DateOfBirth,
    MaritalStatus,
    Nationality,
    StateOfOrigin,
    LgaOfOrigin,
    CurrentAddress,
    PermanentAddress,
    AppointmentStatus,
    EmploymentType,
    Department,
    NationalIdNo,
    TaxIdNo,
    PensionPin,
    PfaName,
    Bvn,
    NhfAccountNo,
    PaymentMode,
    BankName,
    AccountNumber,
    AccountName,
    SortCode,
    EmergencyContactName,
    EmergencyContactPhone,
    EmergencyContactRelationship,
    EmergencyContactAddress,
    GuarantorName,
    GuarantorPhone,
    GuarantorEmail,
    GuarantorRelationship,
    HighestInstitution,
    HighestQualification,
    FieldOfStudy,
    GraduationYear,
    LastEmployer,
    LastPosition,
    ExperienceStartDate,
    ExperienceEndDate,
}

impl UploadField {
    /// Columns that must carry a value for a row to be boarded, in the order rows are
    /// checked and missing fields are reported.
    pub const REQUIRED: [UploadField; 6] = [
        UploadField::EmployeeCode,
        UploadField::StaffIdentifier,
        UploadField::FirstName,
        UploadField::LastName,
        UploadField::GradeCode,
        UploadField::EntryDate,
    ];

    /// Header text used in the upload template and in user-facing messages.
    pub const fn label(self) -> &'static str {
        match self {
            UploadField::EmployeeCode => "Employee Code",
            UploadField::StaffIdentifier => "Staff ID",
            UploadField::FirstName => "First Name",
            UploadField::LastName => "Last Name",
            UploadField::MiddleName => "Middle Name",
            UploadField::GradeCode => "Grade Code",
            UploadField::EntryDate => "Entry Date",
            UploadField::Email => "Email",
            UploadField::MobilePhone => "Mobile Phone",
            UploadField::Gender => "Gender",
            UploadField::DateOfBirth => "Date of Birth",
            UploadField::MaritalStatus => "Marital Status",
            UploadField::Nationality => "Nationality",
            UploadField::StateOfOrigin => "State of Origin",
            UploadField::LgaOfOrigin => "LGA of Origin",
            UploadField::CurrentAddress => "Current Address",
            UploadField::PermanentAddress => "Permanent Address",
            UploadField::AppointmentStatus => "Appointment Status",
            UploadField::EmploymentType => "Employment Type",
            UploadField::Department => "Department",
            UploadField::NationalIdNo => "National ID No",
            UploadField::TaxIdNo => "Tax ID No",
            UploadField::PensionPin => "Pension PIN",
            UploadField::PfaName => "PFA Name",
            UploadField::Bvn => "BVN",
            UploadField::NhfAccountNo => "NHF Account No",
            UploadField::PaymentMode => "Payment Mode",
            UploadField::BankName => "Bank Name",
            UploadField::AccountNumber => "Account Number",
            UploadField::AccountName => "Account Name",
            UploadField::SortCode => "Sort Code",
            UploadField::EmergencyContactName => "Emergency Contact Name",
            UploadField::EmergencyContactPhone => "Emergency Contact Phone",
            UploadField::EmergencyContactRelationship => "Emergency Contact Relationship",
            UploadField::EmergencyContactAddress => "Emergency Contact Address",
            UploadField::GuarantorName => "Guarantor Name",
            UploadField::GuarantorPhone => "Guarantor Phone",
            UploadField::GuarantorEmail => "Guarantor Email",
            UploadField::GuarantorRelationship => "Guarantor Relationship",
            UploadField::HighestInstitution => "Highest Institution",
            UploadField::HighestQualification => "Highest Qualification",
            UploadField::FieldOfStudy => "Field of Study",
            UploadField::GraduationYear => "Graduation Year",
            UploadField::LastEmployer => "Last Employer",
            UploadField::LastPosition => "Last Position",
            UploadField::ExperienceStartDate => "Experience Start Date",
            UploadField::ExperienceEndDate => "Experience End Date",
        }
    }
}

/// One data row after header resolution. Every column is optional at this stage; the
/// row validator decides which absences are errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_of_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lga_of_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permanent_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pension_pin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pfa_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bvn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nhf_account_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guarantor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guarantor_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guarantor_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guarantor_relationship: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_qualification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_employer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_end_date: Option<String>,
}

impl UploadRow {
    pub fn slot(&mut self, field: UploadField) -> &mut Option<String> {
        match field {
            UploadField::EmployeeCode => &mut self.employee_code,
            UploadField::StaffIdentifier => &mut self.staff_identifier,
            UploadField::FirstName => &mut self.first_name,
            UploadField::LastName => &mut self.last_name,
            UploadField::MiddleName => &mut self.middle_name,
            UploadField::GradeCode => &mut self.grade_code,
            UploadField::EntryDate => &mut self.entry_date,
            UploadField::Email => &mut self.email,
            UploadField::MobilePhone => &mut self.mobile_phone,
            UploadField::Gender => &mut self.gender,
            UploadField::DateOfBirth => &mut self.date_of_birth,
            UploadField::MaritalStatus => &mut self.marital_status,
            UploadField::Nationality => &mut self.nationality,
            UploadField::StateOfOrigin => &mut self.state_of_origin,
            UploadField::LgaOfOrigin => &mut self.lga_of_origin,
            UploadField::CurrentAddress => &mut self.current_address,
            UploadField::PermanentAddress => &mut self.permanent_address,
            UploadField::AppointmentStatus => &mut self.appointment_status,
            UploadField::EmploymentType => &mut self.employment_type,
            UploadField::Department => &mut self.department,
            UploadField::NationalIdNo => &mut self.national_id_no,
            UploadField::TaxIdNo => &mut self.tax_id_no,
            UploadField::PensionPin => &mut self.pension_pin,
            UploadField::PfaName => &mut self.pfa_name,
            UploadField::Bvn => &mut self.bvn,
            UploadField::NhfAccountNo => &mut self.nhf_account_no,
            UploadField::PaymentMode => &mut self.payment_mode,
            UploadField::BankName => &mut self.bank_name,
            UploadField::AccountNumber => &mut self.account_number,
            UploadField::AccountName => &mut self.account_name,
            UploadField::SortCode => &mut self.sort_code,
            UploadField::EmergencyContactName => &mut self.emergency_contact_name,
            UploadField::EmergencyContactPhone => &mut self.emergency_contact_phone,
            UploadField::EmergencyContactRelationship => &mut self.emergency_contact_relationship,
            UploadField::EmergencyContactAddress => &mut self.emergency_contact_address,
            UploadField::GuarantorName => &mut self.guarantor_name,
            UploadField::GuarantorPhone => &mut self.guarantor_phone,
            UploadField::GuarantorEmail => &mut self.guarantor_email,
            UploadField::GuarantorRelationship => &mut self.guarantor_relationship,
            UploadField::HighestInstitution => &mut self.highest_institution,
            UploadField::HighestQualification => &mut self.highest_qualification,
            UploadField::FieldOfStudy => &mut self.field_of_study,
            UploadField::GraduationYear => &mut self.graduation_year,
            UploadField::LastEmployer => &mut self.last_employer,
            UploadField::LastPosition => &mut self.last_position,
            UploadField::ExperienceStartDate => &mut self.experience_start_date,
            UploadField::ExperienceEndDate => &mut self.experience_end_date,
        }
    }

    /// Stores a trimmed cell value; blank cells leave the field empty.
    pub fn set(&mut self, field: UploadField, raw: &str) {
        let trimmed = raw.trim();
        *self.slot(field) = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    pub fn take(&mut self, field: UploadField) -> Option<String> {
        self.slot(field).take()
    }

    pub fn is_blank(&self) -> bool {
        *self == UploadRow::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_trims_and_drops_blank_cells() {
        let mut row = UploadRow::default();
        row.set(UploadField::FirstName, "  Ada ");
        row.set(UploadField::LastName, "   ");

        assert_eq!(row.first_name.as_deref(), Some("Ada"));
        assert!(row.last_name.is_none());
        assert!(!row.is_blank());
    }

    #[test]
    fn take_moves_value_out() {
        let mut row = UploadRow::default();
        row.set(UploadField::GradeCode, "ENG-01");
        assert_eq!(row.take(UploadField::GradeCode).as_deref(), Some("ENG-01"));
        assert!(row.is_blank());
    }

    #[test]
    fn required_fields_have_template_labels() {
        let labels: Vec<_> = UploadField::REQUIRED.iter().map(|field| field.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Employee Code",
                "Staff ID",
                "First Name",
                "Last Name",
                "Grade Code",
                "Entry Date"
            ]
        );
    }
}
