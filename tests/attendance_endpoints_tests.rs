use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use attendance_monitor::store::MemoryStore;
use serde_json::{Value, json};

mod common;
use common::{config_with, get, peer, post_json, row, state, state_with};

fn two_students() -> Value {
    json!({
        "attendance": [
            { "studentId": 1, "status": "Present" },
            { "studentId": 2, "status": "Absent" }
        ],
        "date": "2024-01-01"
    })
}

#[actix_web::test]
async fn submit_then_read_back() {
    let store = Arc::new(MemoryStore::new());
    let state = state(store.clone());
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let resp = test::call_service(
        &app,
        post_json("/submit-attendance", &two_students()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Attendance saved successfully!");
    assert_eq!(body["updatedRows"], 2);
    assert_eq!(body["updatedRange"], "memory!A1:C2");

    assert_eq!(
        store.snapshot(),
        vec![
            row(&["1", "2024-01-01", "Present"]),
            row(&["2", "2024-01-01", "Absent"]),
        ]
    );

    let resp = test::call_service(&app, get("/attendance-data").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let summary: Value = test::read_body_json(resp).await;
    assert_eq!(summary, json!({ "Present": 1, "Absent": 1 }));

    let resp = test::call_service(&app, get("/all-attendance-records").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let records: Value = test::read_body_json(resp).await;
    assert_eq!(
        records,
        json!([
            { "studentId": "1", "date": "2024-01-01", "status": "Present" },
            { "studentId": "2", "date": "2024-01-01", "status": "Absent" }
        ])
    );
}

#[actix_web::test]
async fn duplicate_submissions_are_stored_twice() {
    let store = Arc::new(MemoryStore::new());
    let state = state(store.clone());
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            post_json("/submit-attendance", &two_students()).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    assert_eq!(store.row_count(), 4);
    let resp = test::call_service(&app, get("/attendance-data").to_request()).await;
    let summary: Value = test::read_body_json(resp).await;
    assert_eq!(summary, json!({ "Present": 2, "Absent": 2 }));
}

#[actix_web::test]
async fn invalid_submissions_are_client_errors() {
    let store = Arc::new(MemoryStore::new());
    let state = state(store.clone());
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    for payload in [
        json!({ "date": "2024-01-01" }),
        json!({ "attendance": "all", "date": "2024-01-01" }),
        json!({ "attendance": [], "date": "2024-01-01" }),
        json!({ "attendance": [{ "studentId": 1, "status": "Present" }] }),
    ] {
        let resp =
            test::call_service(&app, post_json("/submit-attendance", &payload).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{payload}");
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    assert_eq!(store.row_count(), 0);
}

#[actix_web::test]
async fn unparseable_body_is_a_json_client_error() {
    let store = Arc::new(MemoryStore::new());
    let state = state(store.clone());
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/submit-attendance")
        .peer_addr(peer())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("invalid JSON body"));
    assert_eq!(store.row_count(), 0);
}

#[actix_web::test]
async fn write_outage_is_reported_as_server_error() {
    let store = Arc::new(MemoryStore::new());
    store.set_write_outage(true);
    let state = state(store.clone());
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let resp = test::call_service(
        &app,
        post_json("/submit-attendance", &two_students()).to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Failed to save attendance");
    assert!(body["message"].as_str().unwrap().contains("simulated write outage"));
    assert_eq!(store.row_count(), 0);
}

#[actix_web::test]
async fn read_outage_is_never_an_empty_success() {
    let store = Arc::new(MemoryStore::with_rows(vec![row(&["1", "2024-01-01", "Present"])]));
    store.set_read_outage(true);
    let state = state(store.clone());
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    for uri in ["/attendance-data", "/all-attendance-records", "/attendance_records.csv"] {
        let resp = test::call_service(&app, get(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Failed to fetch data");
    }
}

#[actix_web::test]
async fn header_and_malformed_rows_are_skipped() {
    let store = Arc::new(MemoryStore::with_rows(vec![
        row(&["Student ID", "Date", "Status"]),
        row(&["1", "2024-01-01", "Present"]),
        row(&["2", "2024-01-01"]),
        row(&["3", "2024-01-01", "Late"]),
        row(&["4", "2024-01-01", "absent"]),
    ]));
    let state = state(store);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let resp = test::call_service(&app, get("/attendance-data").to_request()).await;
    let summary: Value = test::read_body_json(resp).await;
    assert_eq!(summary, json!({ "Present": 1, "Absent": 0 }));

    let resp = test::call_service(&app, get("/all-attendance-records").to_request()).await;
    let records: Vec<Value> = test::read_body_json(resp).await;
    let ids: Vec<&str> = records
        .iter()
        .map(|r| r["studentId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "3", "4"]);
}

#[actix_web::test]
async fn csv_download_is_an_attachment() {
    let store = Arc::new(MemoryStore::with_rows(vec![
        row(&["Student Number", "Date", "Status"]),
        row(&["1", "2024-01-01", "Present"]),
        row(&["2", "2024-01-01", "Absent"]),
    ]));
    let state = state(store);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let resp = test::call_service(&app, get("/attendance_records.csv").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("attendance_records.csv"));

    let body = test::read_body(resp).await;
    assert_eq!(
        body,
        "Student Number,Date,Status\nStudent 1,2024-01-01,Present\nStudent 2,2024-01-01,Absent"
    );
}

#[actix_web::test]
async fn submissions_beyond_the_rate_limit_are_refused() {
    let store = Arc::new(MemoryStore::new());
    let state = state_with(store.clone(), config_with(&[("RATE_SUBMIT_PER_MIN", "2")]));
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let resp = test::call_service(
            &app,
            post_json("/submit-attendance", &two_students()).to_request(),
        )
        .await;
        statuses.push(resp.status());
    }

    assert_eq!(
        statuses,
        vec![StatusCode::OK, StatusCode::OK, StatusCode::TOO_MANY_REQUESTS]
    );
    assert_eq!(store.row_count(), 4);
}
