use super::domain::{
    BankingDetails, EducationHistory, EmergencyContact, EmploymentHistory, Guarantor,
    LegalIdentifiers, PaymentMode, PersonalInfo, SubordinateKind, SubordinateRecord,
};
use super::validation::ValidatedRow;

const DEFAULT_NATIONALITY: &str = "Nigerian";
const DEFAULT_RELATIONSHIP: &str = "Other";

/// A subordinate record that could not be built or stored. Never fails the row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not create {} record: {reason}", .kind.label())]
pub struct SubordinateFailure {
    pub kind: SubordinateKind,
    pub reason: String,
}

impl SubordinateFailure {
    pub fn new(kind: SubordinateKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

pub type SubordinatePlan = Vec<Result<SubordinateRecord, SubordinateFailure>>;

/// Builds every subordinate record the row carries enough data for, in a fixed order.
/// Each entry succeeds or fails independently.
pub fn plan_subordinates(row: &ValidatedRow) -> SubordinatePlan {
    let details = &row.details;
    let mut plan = Vec::new();

    if details.bank_name.is_some() || details.account_number.is_some() {
        plan.push(Ok(SubordinateRecord::Banking(BankingDetails {
            payment_mode: PaymentMode::from_free_text(details.payment_mode.as_deref()),
            bank_name: details.bank_name.clone(),
            account_number: details.account_number.clone(),
            account_name: details.account_name.clone(),
            sort_code: details.sort_code.clone(),
        })));
    }

    if details.marital_status.is_some()
        || details.nationality.is_some()
        || details.current_address.is_some()
    {
        plan.push(Ok(SubordinateRecord::PersonalInfo(PersonalInfo {
            middle_name: details.middle_name.clone(),
            marital_status: details.marital_status.clone(),
            nationality: details
                .nationality
                .clone()
                .unwrap_or_else(|| DEFAULT_NATIONALITY.to_string()),
            state_of_origin: details.state_of_origin.clone(),
            lga_of_origin: details.lga_of_origin.clone(),
            current_address: details.current_address.clone(),
            permanent_address: details.permanent_address.clone(),
            mobile_phone: details.mobile_phone.clone(),
            personal_email: details.email.clone(),
        })));
    }

    if details.national_id_no.is_some()
        || details.tax_id_no.is_some()
        || details.pension_pin.is_some()
    {
        plan.push(Ok(SubordinateRecord::LegalIds(LegalIdentifiers {
            national_id_no: details.national_id_no.clone(),
            tax_id_no: details.tax_id_no.clone(),
            pension_pin: details.pension_pin.clone(),
            pfa_name: details.pfa_name.clone(),
            bank_verification_no: details.bvn.clone(),
            nhf_account_no: details.nhf_account_no.clone(),
        })));
    }

    if let (Some(name), Some(phone)) = (
        &details.emergency_contact_name,
        &details.emergency_contact_phone,
    ) {
        plan.push(Ok(SubordinateRecord::EmergencyContact(EmergencyContact {
            name: name.clone(),
            phone_number: phone.clone(),
            relationship: details
                .emergency_contact_relationship
                .clone()
                .unwrap_or_else(|| DEFAULT_RELATIONSHIP.to_string()),
            address: details.emergency_contact_address.clone(),
            is_primary: true,
        })));
    }

    if let (Some(name), Some(phone)) = (&details.guarantor_name, &details.guarantor_phone) {
        plan.push(Ok(SubordinateRecord::Guarantor(Guarantor {
            name: name.clone(),
            phone_number: phone.clone(),
            email: details.guarantor_email.clone(),
            relationship: details.guarantor_relationship.clone(),
        })));
    }

    if let (Some(institution), Some(qualification)) = (
        &details.highest_institution,
        &details.highest_qualification,
    ) {
        let education = parse_graduation_year(details.graduation_year.as_deref()).map(
            |graduation_year| {
                SubordinateRecord::Education(EducationHistory {
                    institution_name: institution.clone(),
                    certificate_type: qualification.clone(),
                    specialization: details.field_of_study.clone(),
                    graduation_year,
                })
            },
        );
        plan.push(education);
    }

    if let (Some(employer), Some(position)) = (&details.last_employer, &details.last_position) {
        plan.push(Ok(SubordinateRecord::Experience(EmploymentHistory {
            employer_name: employer.clone(),
            designation: position.clone(),
            start_date: row.experience_start_date,
            end_date: row.experience_end_date,
        })));
    }

    plan
}

fn parse_graduation_year(raw: Option<&str>) -> Result<Option<u16>, SubordinateFailure> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let year = raw.trim();
    if year.len() == 4 && year.chars().all(|ch| ch.is_ascii_digit()) {
        if let Ok(parsed) = year.parse::<u16>() {
            return Ok(Some(parsed));
        }
    }

    Err(SubordinateFailure::new(
        SubordinateKind::Education,
        format!("invalid graduation year '{raw}'"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graduation_year_must_have_four_digits() {
        assert_eq!(parse_graduation_year(None), Ok(None));
        assert_eq!(parse_graduation_year(Some("2019")), Ok(Some(2019)));
        let failure = parse_graduation_year(Some("19")).expect_err("two digits");
        assert_eq!(
            failure.to_string(),
            "could not create education record: invalid graduation year '19'"
        );
    }
}
