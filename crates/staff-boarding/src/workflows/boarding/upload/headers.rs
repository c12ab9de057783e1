use super::fields::UploadField;
use super::normalizer::normalize_header;

/// A single way a normalized header can name a field.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Term {
    /// Substring of the normalized header.
    Phrase(&'static str),
    /// Whole word of the normalized header; used for short acronyms such as "dob".
    Word(&'static str),
}

impl Term {
    fn matches(self, header: &str) -> bool {
        match self {
            Term::Phrase(phrase) => header.contains(phrase),
            Term::Word(word) => header.split(' ').any(|token| token == word),
        }
    }
}

#[derive(Debug)]
pub(crate) struct HeaderRule {
    pub(crate) field: UploadField,
    pub(crate) any_of: &'static [Term],
    /// A header containing any of these phrases never satisfies the rule, wherever the
    /// rule sits in the table.
    pub(crate) none_of: &'static [&'static str],
}

impl HeaderRule {
    fn matches(&self, header: &str) -> bool {
        self.any_of.iter().any(|term| term.matches(header))
            && !self.none_of.iter().any(|excluded| header.contains(excluded))
    }
}

use Term::{Phrase, Word};

/// Ordered most-specific first; the first matching rule wins.
pub(crate) const HEADER_RULES: &[HeaderRule] = &[
    HeaderRule {
        field: UploadField::EmployeeCode,
        any_of: &[Phrase("employee code"), Phrase("employee number"), Phrase("employee no")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::StaffIdentifier,
        any_of: &[Phrase("staff id")],
        none_of: &["tax"],
    },
    // Emergency contact and guarantor columns come before the generic name, phone,
    // email, and address rules they would otherwise fall into.
    HeaderRule {
        field: UploadField::EmergencyContactName,
        any_of: &[Phrase("emergency contact name")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::EmergencyContactPhone,
        any_of: &[Phrase("emergency contact phone"), Phrase("emergency phone")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::EmergencyContactRelationship,
        any_of: &[Phrase("emergency contact relationship")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::EmergencyContactAddress,
        any_of: &[Phrase("emergency contact address")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::GuarantorName,
        any_of: &[Phrase("guarantor name")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::GuarantorPhone,
        any_of: &[Phrase("guarantor phone")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::GuarantorEmail,
        any_of: &[Phrase("guarantor email")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::GuarantorRelationship,
        any_of: &[Phrase("guarantor relationship")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::ExperienceStartDate,
        any_of: &[Phrase("experience start date")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::ExperienceEndDate,
        any_of: &[Phrase("experience end date")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::LastEmployer,
        any_of: &[Phrase("last employer")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::LastPosition,
        any_of: &[Phrase("last position")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::FirstName,
        any_of: &[Phrase("first name")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::MiddleName,
        any_of: &[Phrase("middle name")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::LastName,
        any_of: &[Phrase("last name"), Phrase("surname")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::GradeCode,
        any_of: &[Phrase("grade code")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::Email,
        any_of: &[Phrase("email")],
        none_of: &["guarantor", "emergency"],
    },
    HeaderRule {
        field: UploadField::MobilePhone,
        any_of: &[Phrase("mobile"), Phrase("phone")],
        none_of: &["emergency", "guarantor", "next of kin"],
    },
    HeaderRule {
        field: UploadField::Gender,
        any_of: &[Phrase("gender")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::DateOfBirth,
        any_of: &[Phrase("date of birth"), Word("dob")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::MaritalStatus,
        any_of: &[Phrase("marital status")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::Nationality,
        any_of: &[Phrase("nationality")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::StateOfOrigin,
        any_of: &[Phrase("state of origin"), Word("state")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::LgaOfOrigin,
        any_of: &[Word("lga")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::CurrentAddress,
        any_of: &[Phrase("current address")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::PermanentAddress,
        any_of: &[Phrase("permanent address")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::EntryDate,
        any_of: &[Phrase("entry date"), Phrase("date of entry")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::AppointmentStatus,
        any_of: &[Phrase("appointment status")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::EmploymentType,
        any_of: &[Phrase("employment type")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::Department,
        any_of: &[Phrase("department")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::NationalIdNo,
        any_of: &[Phrase("national id"), Word("nin")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::TaxIdNo,
        any_of: &[Phrase("tax id"), Word("tin")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::PensionPin,
        any_of: &[Phrase("pension pin")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::PfaName,
        any_of: &[Phrase("pfa name"), Word("pfa")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::Bvn,
        any_of: &[Word("bvn"), Phrase("bank verification")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::NhfAccountNo,
        any_of: &[Word("nhf")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::PaymentMode,
        any_of: &[Phrase("payment mode")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::BankName,
        any_of: &[Phrase("bank name")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::AccountNumber,
        any_of: &[Phrase("account number"), Phrase("account no")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::AccountName,
        any_of: &[Phrase("account name")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::SortCode,
        any_of: &[Phrase("sort code")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::HighestInstitution,
        any_of: &[Phrase("institution")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::HighestQualification,
        any_of: &[Phrase("qualification")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::FieldOfStudy,
        any_of: &[Phrase("field of study"), Phrase("course of study")],
        none_of: &[],
    },
    HeaderRule {
        field: UploadField::GraduationYear,
        any_of: &[Phrase("graduation year"), Phrase("year of graduation")],
        none_of: &[],
    },
];

/// Resolves one raw header cell to its semantic field, if any rule recognizes it.
pub fn resolve_header(raw: &str) -> Option<UploadField> {
    let header = normalize_header(raw);
    if header.is_empty() {
        return None;
    }

    HEADER_RULES
        .iter()
        .find(|rule| rule.matches(&header))
        .map(|rule| rule.field)
}

/// Maps each column position to a field. When two columns resolve to the same field the
/// leftmost one is kept and the others are ignored.
pub fn resolve_headers<'a, I>(cells: I) -> Vec<Option<UploadField>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = Vec::new();
    cells
        .into_iter()
        .map(|cell| match resolve_header(cell) {
            Some(field) if !seen.contains(&field) => {
                seen.push(field);
                Some(field)
            }
            Some(field) => {
                tracing::debug!(header = cell, ?field, "duplicate column ignored");
                None
            }
            None => None,
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn rule_position(field: UploadField) -> Option<usize> {
    HEADER_RULES.iter().position(|rule| rule.field == field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_template_headers() {
        assert_eq!(resolve_header("Employee Code *"), Some(UploadField::EmployeeCode));
        assert_eq!(resolve_header("Staff ID *"), Some(UploadField::StaffIdentifier));
        assert_eq!(resolve_header("Pay Grade Code *"), Some(UploadField::GradeCode));
        assert_eq!(resolve_header("Entry Date *"), Some(UploadField::EntryDate));
        assert_eq!(resolve_header("DOB"), Some(UploadField::DateOfBirth));
        assert_eq!(resolve_header("LGA of Origin"), Some(UploadField::LgaOfOrigin));
        assert_eq!(resolve_header("NHF Account No"), Some(UploadField::NhfAccountNo));
        assert_eq!(resolve_header("Account No."), Some(UploadField::AccountNumber));
        assert_eq!(resolve_header("Highest Institution"), Some(UploadField::HighestInstitution));
    }

    #[test]
    fn specific_phone_columns_are_not_absorbed_by_mobile_phone() {
        assert_eq!(
            resolve_header("Emergency Contact Phone"),
            Some(UploadField::EmergencyContactPhone)
        );
        assert_eq!(resolve_header("Guarantor Phone"), Some(UploadField::GuarantorPhone));
        assert_eq!(resolve_header("Phone Number"), Some(UploadField::MobilePhone));
        assert_eq!(resolve_header("Next of Kin Phone"), None);
    }

    #[test]
    fn guarantor_email_is_excluded_from_generic_email() {
        assert_eq!(resolve_header("Guarantor Email"), Some(UploadField::GuarantorEmail));
        assert_eq!(resolve_header("Email Address"), Some(UploadField::Email));

        let email_rule = HEADER_RULES
            .iter()
            .find(|rule| rule.field == UploadField::Email)
            .expect("email rule present");
        assert!(!email_rule.matches(&normalize_header("Guarantor Email")));
    }

    #[test]
    fn tax_id_does_not_satisfy_staff_id() {
        assert_eq!(resolve_header("Tax ID No"), Some(UploadField::TaxIdNo));
        assert_eq!(resolve_header("Staff Tax ID"), Some(UploadField::TaxIdNo));
    }

    #[test]
    fn specific_rules_precede_general_rules() {
        let before = |specific: UploadField, general: UploadField| {
            let specific_at = rule_position(specific).expect("specific rule");
            let general_at = rule_position(general).expect("general rule");
            assert!(
                specific_at < general_at,
                "{specific:?} must be checked before {general:?}"
            );
        };

        before(UploadField::EmergencyContactPhone, UploadField::MobilePhone);
        before(UploadField::GuarantorPhone, UploadField::MobilePhone);
        before(UploadField::GuarantorEmail, UploadField::Email);
        before(UploadField::EmergencyContactAddress, UploadField::CurrentAddress);
        before(UploadField::ExperienceStartDate, UploadField::EntryDate);
        before(UploadField::StateOfOrigin, UploadField::LgaOfOrigin);
    }

    #[test]
    fn every_field_has_exactly_one_rule() {
        let mut fields: Vec<_> = HEADER_RULES.iter().map(|rule| rule.field).collect();
        let total = fields.len();
        fields.sort();
        fields.dedup();
        assert_eq!(fields.len(), total);
        assert_eq!(total, 47);
    }

    #[test]
    fn unknown_and_duplicate_columns_resolve_to_none() {
        let columns = resolve_headers(["Employee Code", "Favourite Colour", "employee_code", ""]);
        assert_eq!(
            columns,
            vec![Some(UploadField::EmployeeCode), None, None, None]
        );
    }
}
