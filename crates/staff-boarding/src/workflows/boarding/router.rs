use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::approval::ApprovalError;
use super::domain::{Actor, StaffId, StaffRecord, TicketId};
use super::permissions::PermissionResolver;
use super::repository::{ReferenceDirectory, RepositoryError, StaffRepository};
use super::service::{BoardingError, BoardingService};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

type SharedService<R, D, P> = State<Arc<BoardingService<R, D, P>>>;

/// Router builder exposing the upload and approval endpoints.
pub fn boarding_router<R, D, P>(service: Arc<BoardingService<R, D, P>>) -> Router
where
    R: StaffRepository + 'static,
    D: ReferenceDirectory + 'static,
    P: PermissionResolver + 'static,
{
    Router::new()
        .route(
            "/api/v1/boarding/tickets/:ticket_id/preview",
            post(preview_handler::<R, D, P>),
        )
        .route(
            "/api/v1/boarding/tickets/:ticket_id/commit",
            post(commit_handler::<R, D, P>),
        )
        .route("/api/v1/boarding/pending", get(pending_handler::<R, D, P>))
        .route(
            "/api/v1/boarding/staff/:staff_id",
            get(staff_handler::<R, D, P>),
        )
        .route(
            "/api/v1/boarding/staff/:staff_id/approve",
            post(approve_handler::<R, D, P>),
        )
        .route(
            "/api/v1/boarding/staff/:staff_id/reject",
            post(reject_handler::<R, D, P>),
        )
        .route(
            "/api/v1/boarding/staff/:staff_id/final-approve",
            post(final_approve_handler::<R, D, P>),
        )
        .route(
            "/api/v1/boarding/staff/:staff_id/final-reject",
            post(final_reject_handler::<R, D, P>),
        )
        .route(
            "/api/v1/boarding/bulk-approve",
            post(bulk_approve_handler::<R, D, P>),
        )
        .route(
            "/api/v1/boarding/bulk-final-approve",
            post(bulk_final_approve_handler::<R, D, P>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CommitParams {
    #[serde(default)]
    offer_already_accepted: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NotesBody {
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReasonBody {
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkBody {
    staff_ids: Vec<u64>,
    #[serde(default)]
    notes: Option<String>,
}

pub(crate) async fn preview_handler<R, D, P>(
    State(service): SharedService<R, D, P>,
    Path(ticket_id): Path<u64>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    R: StaffRepository + 'static,
    D: ReferenceDirectory + 'static,
    P: PermissionResolver + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.preview(TicketId(ticket_id), &actor, body.as_ref()) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => boarding_error_response(err),
    }
}

pub(crate) async fn commit_handler<R, D, P>(
    State(service): SharedService<R, D, P>,
    Path(ticket_id): Path<u64>,
    Query(params): Query<CommitParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    R: StaffRepository + 'static,
    D: ReferenceDirectory + 'static,
    P: PermissionResolver + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.commit(
        TicketId(ticket_id),
        &actor,
        body.as_ref(),
        params.offer_already_accepted,
    ) {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(err) => boarding_error_response(err),
    }
}

pub(crate) async fn pending_handler<R, D, P>(
    State(service): SharedService<R, D, P>,
    headers: HeaderMap,
) -> Response
where
    R: StaffRepository + 'static,
    D: ReferenceDirectory + 'static,
    P: PermissionResolver + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };

    match service.pending_for(&actor) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => approval_error_response(err),
    }
}

pub(crate) async fn staff_handler<R, D, P>(
    State(service): SharedService<R, D, P>,
    Path(staff_id): Path<u64>,
) -> Response
where
    R: StaffRepository + 'static,
    D: ReferenceDirectory + 'static,
    P: PermissionResolver + 'static,
{
    match service.get(StaffId(staff_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => approval_error_response(err),
    }
}

pub(crate) async fn approve_handler<R, D, P>(
    State(service): SharedService<R, D, P>,
    Path(staff_id): Path<u64>,
    headers: HeaderMap,
    body: Option<Json<NotesBody>>,
) -> Response
where
    R: StaffRepository + 'static,
    D: ReferenceDirectory + 'static,
    P: PermissionResolver + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let notes = body.and_then(|Json(body)| body.notes);

    transition_response(service.approve(StaffId(staff_id), &actor, notes))
}

pub(crate) async fn reject_handler<R, D, P>(
    State(service): SharedService<R, D, P>,
    Path(staff_id): Path<u64>,
    headers: HeaderMap,
    body: Option<Json<ReasonBody>>,
) -> Response
where
    R: StaffRepository + 'static,
    D: ReferenceDirectory + 'static,
    P: PermissionResolver + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let reason = body.and_then(|Json(body)| body.reason);

    transition_response(service.reject(StaffId(staff_id), &actor, reason))
}

pub(crate) async fn final_approve_handler<R, D, P>(
    State(service): SharedService<R, D, P>,
    Path(staff_id): Path<u64>,
    headers: HeaderMap,
    body: Option<Json<NotesBody>>,
) -> Response
where
    R: StaffRepository + 'static,
    D: ReferenceDirectory + 'static,
    P: PermissionResolver + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let notes = body.and_then(|Json(body)| body.notes);

    transition_response(service.final_approve(StaffId(staff_id), &actor, notes))
}

pub(crate) async fn final_reject_handler<R, D, P>(
    State(service): SharedService<R, D, P>,
    Path(staff_id): Path<u64>,
    headers: HeaderMap,
    body: Option<Json<ReasonBody>>,
) -> Response
where
    R: StaffRepository + 'static,
    D: ReferenceDirectory + 'static,
    P: PermissionResolver + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let reason = body.and_then(|Json(body)| body.reason);

    transition_response(service.final_reject(StaffId(staff_id), &actor, reason))
}

pub(crate) async fn bulk_approve_handler<R, D, P>(
    State(service): SharedService<R, D, P>,
    headers: HeaderMap,
    Json(body): Json<BulkBody>,
) -> Response
where
    R: StaffRepository + 'static,
    D: ReferenceDirectory + 'static,
    P: PermissionResolver + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let ids: Vec<StaffId> = body.staff_ids.into_iter().map(StaffId).collect();

    match service.bulk_approve(&ids, &actor, body.notes) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => approval_error_response(err),
    }
}

pub(crate) async fn bulk_final_approve_handler<R, D, P>(
    State(service): SharedService<R, D, P>,
    headers: HeaderMap,
    Json(body): Json<BulkBody>,
) -> Response
where
    R: StaffRepository + 'static,
    D: ReferenceDirectory + 'static,
    P: PermissionResolver + 'static,
{
    let actor = match actor_from_headers(&headers) {
        Ok(actor) => actor,
        Err(response) => return response,
    };
    let ids: Vec<StaffId> = body.staff_ids.into_iter().map(StaffId).collect();

    match service.bulk_final_approve(&ids, &actor, body.notes) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => approval_error_response(err),
    }
}

/// Reads the caller identity forwarded by the authenticating gateway.
pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, Response> {
    let id = headers
        .get(ACTOR_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .ok_or_else(|| {
            error_response(
                StatusCode::BAD_REQUEST,
                format!("missing or invalid {ACTOR_ID_HEADER} header"),
            )
        })?;

    let role = headers
        .get(ACTOR_ROLE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .unwrap_or_default();

    Ok(Actor::new(id, role))
}

fn transition_response(result: Result<StaffRecord, ApprovalError>) -> Response {
    match result {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => approval_error_response(err),
    }
}

pub(crate) fn boarding_error_response(err: BoardingError) -> Response {
    let status = match &err {
        BoardingError::TicketNotFound(_) => StatusCode::NOT_FOUND,
        BoardingError::TicketAccessDenied { .. } => StatusCode::FORBIDDEN,
        BoardingError::Upload(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BoardingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

pub(crate) fn approval_error_response(err: ApprovalError) -> Response {
    let status = match &err {
        ApprovalError::NotFound(_)
        | ApprovalError::TicketMissing { .. }
        | ApprovalError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApprovalError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        ApprovalError::State(_) | ApprovalError::Repository(RepositoryError::StatusChanged(_)) => {
            StatusCode::CONFLICT
        }
        ApprovalError::MissingReason(_) | ApprovalError::EmptyBatch => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ApprovalError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

fn error_response(status: StatusCode, message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (status, Json(payload)).into_response()
}
