use super::common::*;
use crate::workflows::boarding::domain::{BoardingApprovalStatus, TicketId};
use crate::workflows::boarding::preview::{
    ERROR_SUMMARY_LIMIT, INVALID_SAMPLE_LIMIT, VALID_SAMPLE_LIMIT,
};
use crate::workflows::boarding::upload::UploadError;
use crate::workflows::boarding::BoardingError;

#[test]
fn preview_blocks_uploads_larger_than_remaining_slots() {
    let store = seeded_store(ticket(10, 8));
    let service = build_service(&store);

    let report = service
        .preview(TICKET, &recruiter(), valid_upload(3).as_bytes())
        .expect("preview succeeds");

    assert_eq!(report.total_rows, 3);
    assert_eq!(report.valid_rows, 3);
    assert_eq!(report.invalid_rows, 0);
    assert_eq!(report.available_slots, 2);
    assert!(!report.can_proceed);
    assert_eq!(
        report.warnings,
        vec!["You have 3 valid records but only 2 available slots".to_string()]
    );
}

#[test]
fn clean_upload_within_capacity_can_proceed() {
    let store = seeded_store(ticket(10, 0));
    let service = build_service(&store);

    let report = service
        .preview(TICKET, &recruiter(), valid_upload(4).as_bytes())
        .expect("preview succeeds");

    assert!(report.can_proceed);
    assert!(report.warnings.is_empty());
    assert_eq!(report.preview_data.len(), 4);
    assert_eq!(report.preview_data[0].employee_code, "EMP-001");
    assert_eq!(report.preview_data[3].row_number, 5);
}

#[test]
fn invalid_rows_are_echoed_with_their_messages() {
    let store = seeded_store(ticket(10, 0));
    let service = build_service(&store);
    let csv = upload([
        staff_row(1),
        "EMP-002,STF-002,Alan,Turing,XX-9,2025-01-15".to_string(),
    ]);

    let report = service
        .preview(TICKET, &recruiter(), csv.as_bytes())
        .expect("preview succeeds");

    assert_eq!(report.valid_rows, 1);
    assert_eq!(report.invalid_rows, 1);
    assert!(!report.can_proceed);

    let invalid = &report.invalid_records[0];
    assert_eq!(invalid.row_number, 3);
    assert_eq!(invalid.data.employee_code.as_deref(), Some("EMP-002"));
    assert_eq!(invalid.data.first_name.as_deref(), Some("Alan"));
    assert_eq!(
        report.error_summary,
        vec![
            "Row 3: Invalid Grade Code: 'XX-9'. Check Pay Grades Reference sheet for valid codes."
                .to_string()
        ]
    );
}

#[test]
fn in_file_duplicates_are_flagged_on_the_later_row() {
    let store = seeded_store(ticket(10, 0));
    let service = build_service(&store);
    let csv = upload([staff_row(1), staff_row(2), staff_row(1)]);

    let report = service
        .preview(TICKET, &recruiter(), csv.as_bytes())
        .expect("preview succeeds");

    assert_eq!(report.valid_rows, 2);
    assert_eq!(report.invalid_rows, 1);
    assert_eq!(report.invalid_records[0].row_number, 4);
    assert_eq!(
        report.invalid_records[0].errors,
        vec![
            "Employee Code 'EMP-001' already exists for this client".to_string(),
            "Staff ID 'STF-001' already exists".to_string(),
        ]
    );
}

#[test]
fn samples_are_truncated_but_counts_are_not() {
    let store = seeded_store(ticket(100, 0));
    let service = build_service(&store);
    let valid = (1..=25).map(staff_row);
    let invalid = (26..=55).map(|n| format!("EMP-{n:03},STF-{n:03},First{n},Last{n},XX-9,soon"));
    let csv = upload(valid.chain(invalid));

    let report = service
        .preview(TICKET, &recruiter(), csv.as_bytes())
        .expect("preview succeeds");

    assert_eq!(report.total_rows, 55);
    assert_eq!(report.valid_rows, 25);
    assert_eq!(report.invalid_rows, 30);
    assert_eq!(report.preview_data.len(), VALID_SAMPLE_LIMIT);
    assert_eq!(report.invalid_records.len(), INVALID_SAMPLE_LIMIT);
    assert_eq!(report.error_summary.len(), ERROR_SUMMARY_LIMIT);
    assert_eq!(report.invalid_records[0].errors.len(), 2);
}

#[test]
fn preview_never_writes() {
    let store = seeded_store(ticket(10, 0));
    store
        .seed_staff(existing_staff(
            90,
            "EMP-900",
            "STF-900",
            BoardingApprovalStatus::Pending,
        ))
        .expect("staff seeds");
    let service = build_service(&store);

    service
        .preview(TICKET, &recruiter(), valid_upload(3).as_bytes())
        .expect("preview succeeds");

    assert_eq!(store.staff_count().expect("count"), 1);
    assert!(store.staff_types().expect("staff types").is_empty());
}

#[test]
fn header_only_upload_cannot_proceed() {
    let store = seeded_store(ticket(10, 0));
    let service = build_service(&store);

    let report = service
        .preview(TICKET, &recruiter(), upload(Vec::new()).as_bytes())
        .expect("preview succeeds");

    assert_eq!(report.total_rows, 0);
    assert!(!report.can_proceed);
}

#[test]
fn upload_without_header_row_is_a_whole_request_failure() {
    let store = seeded_store(ticket(10, 0));
    let service = build_service(&store);

    let err = service
        .preview(TICKET, &recruiter(), "Name,Grade\nAda,ENG-01\n".as_bytes())
        .expect_err("no header row");

    assert!(matches!(
        err,
        BoardingError::Upload(UploadError::MissingHeaderRow)
    ));
}

#[test]
fn preview_requires_a_usable_ticket() {
    let store = seeded_store(ticket(10, 0));
    let service = build_service(&store);

    let err = service
        .preview(TICKET, &outsider(), valid_upload(1).as_bytes())
        .expect_err("outsider is refused");
    assert!(matches!(err, BoardingError::TicketAccessDenied { .. }));

    let err = service
        .preview(TicketId(99), &recruiter(), valid_upload(1).as_bytes())
        .expect_err("unknown ticket");
    assert!(matches!(err, BoardingError::TicketNotFound(TicketId(99))));

    service
        .preview(TICKET, &hr_manager(), valid_upload(1).as_bytes())
        .expect("trusted role may use any ticket");
}
