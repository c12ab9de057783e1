use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::boarding::domain::Actor;
use crate::workflows::boarding::router::{self, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use crate::workflows::boarding::{BoardingService, RoleHierarchy};

fn csv_request(uri: &str, actor: &Actor, csv: String) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(ACTOR_ID_HEADER, actor.id.0.to_string())
        .header(ACTOR_ROLE_HEADER, actor.role.as_str())
        .body(Body::from(csv))
        .unwrap()
}

fn json_request(uri: &str, actor: &Actor, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(ACTOR_ID_HEADER, actor.id.0.to_string())
        .header(ACTOR_ROLE_HEADER, actor.role.as_str())
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str, actor: &Actor) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(ACTOR_ID_HEADER, actor.id.0.to_string())
        .header(ACTOR_ROLE_HEADER, actor.role.as_str())
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn preview_route_returns_the_report() {
    let store = seeded_store(ticket(10, 8));
    let router = router_for(&store);

    let response = router
        .oneshot(csv_request(
            "/api/v1/boarding/tickets/10/preview",
            &recruiter(),
            valid_upload(3),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["valid_rows"], json!(3));
    assert_eq!(body["available_slots"], json!(2));
    assert_eq!(body["can_proceed"], json!(false));
    assert_eq!(body["preview_data"][0]["grade_code"], json!("ENG-01"));
    assert_eq!(body["preview_data"][0]["entry_date"], json!("2025-01-15"));
}

#[tokio::test]
async fn commit_route_creates_records() {
    let store = seeded_store(ticket(10, 0));
    let router = router_for(&store);

    let response = router
        .oneshot(csv_request(
            "/api/v1/boarding/tickets/10/commit?offer_already_accepted=true",
            &recruiter(),
            valid_upload(2),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["successful_records"], json!(2));
    assert_eq!(body["ticket_status"], json!({ "filled": 2, "total": 10 }));
    assert_eq!(body["created_staff"][0]["status"], json!("pending"));
    assert_eq!(store.staff_count().expect("count"), 2);
}

#[tokio::test]
async fn upload_routes_map_whole_request_failures() {
    let store = seeded_store(ticket(10, 0));

    let response = router_for(&store)
        .oneshot(csv_request(
            "/api/v1/boarding/tickets/99/preview",
            &recruiter(),
            valid_upload(1),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router_for(&store)
        .oneshot(csv_request(
            "/api/v1/boarding/tickets/10/commit",
            &outsider(),
            valid_upload(1),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router_for(&store)
        .oneshot(csv_request(
            "/api/v1/boarding/tickets/10/preview",
            &recruiter(),
            "just,some,cells\n".to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(
        body["error"],
        json!("could not find a header row containing an Employee Code column")
    );
}

#[tokio::test]
async fn requests_without_an_actor_are_rejected() {
    let store = seeded_store(ticket(10, 0));

    let response = router_for(&store)
        .oneshot(
            Request::post("/api/v1/boarding/tickets/10/preview")
                .body(Body::from(valid_upload(1)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], json!("missing or invalid x-actor-id header"));
}

#[tokio::test]
async fn approval_routes_walk_the_workflow() {
    let store = seeded_store(ticket(10, 0));
    let service = build_service(&store);
    let id = board_pending(&service, 1)[0];
    let router = router::boarding_router(service);

    let response = router
        .clone()
        .oneshot(json_request(
            &format!("/api/v1/boarding/staff/{}/approve", id.0),
            &supervisor(),
            json!({ "notes": "ok" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(
        body["boarding_approval_status"],
        json!("pending_final_approval")
    );
    assert_eq!(body["audit"]["approval"]["note"], json!("ok"));

    let response = router
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/boarding/staff/{}/final-approve", id.0),
            &control(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(empty_request(
            "GET",
            &format!("/api/v1/boarding/staff/{}", id.0),
            &control(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["employee_code"], json!("EMP-001"));
    assert_eq!(body["boarding_approval_status"], json!("final_approved"));
}

#[tokio::test]
async fn approval_routes_map_workflow_errors() {
    let store = seeded_store(ticket(10, 0));
    let service = build_service(&store);
    let id = board_pending(&service, 1)[0];
    let router = router::boarding_router(service);

    let response = router
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/boarding/staff/{}/final-approve", id.0),
            &control(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/boarding/staff/{}/reject", id.0),
            &supervisor(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = router
        .clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/boarding/staff/{}/approve", id.0),
            &recruiter(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/boarding/staff/999", &control()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_and_pending_routes() {
    let store = seeded_store(ticket(10, 0));
    let service = build_service(&store);
    let ids = board_pending(&service, 2);
    let router = router::boarding_router(service);

    let response = router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/boarding/pending", &supervisor()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let response = router
        .clone()
        .oneshot(json_request(
            "/api/v1/boarding/bulk-approve",
            &supervisor(),
            json!({ "staff_ids": [ids[0].0, ids[1].0, 999] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["approved_count"], json!(2));
    assert_eq!(body["failed_count"], json!(1));

    let response = router
        .oneshot(json_request(
            "/api/v1/boarding/bulk-final-approve",
            &control(),
            json!({ "staff_ids": [] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn preview_handler_returns_internal_error_when_store_is_down() {
    let service = Arc::new(BoardingService::new(
        Arc::new(UnavailableStore),
        Arc::new(UnavailableStore),
        Arc::new(RoleHierarchy::standard()),
    ));
    let mut headers = HeaderMap::new();
    headers.insert(ACTOR_ID_HEADER, HeaderValue::from_static("200"));

    let response = router::preview_handler::<UnavailableStore, UnavailableStore, RoleHierarchy>(
        State(service),
        Path(10),
        headers,
        Bytes::from(valid_upload(1)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
