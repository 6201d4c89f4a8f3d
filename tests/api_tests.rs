//! HTTP surface tests against the memory backend.

mod common;

use std::sync::Arc;

use chrono::Duration as ChronoDuration;

use actix_web::http::StatusCode;
use actix_web::{App, test, web::Data};
use serde_json::{Value, json};
use tokio::sync::mpsc;

use attendance_kiosk::kiosk::{
    Dashboard, FixedClock, Kiosk, Payload, PresenterEvent, parse_payload,
};
use attendance_kiosk::routes;
use common::*;

fn setup() -> (Kiosk, mpsc::Receiver<PresenterEvent>) {
    let (_store, stores) = memory_stores();
    let clock = Arc::new(FixedClock::at(2024, 3, 4, 9, 0, 0));
    kiosk(&stores, clock)
}

fn manual(employee_id: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/attendance/manual")
        .peer_addr("127.0.0.1:8080".parse().unwrap())
        .set_json(json!({ "employee_id": employee_id }))
}

#[actix_web::test]
async fn manual_check_in_records_then_reports_already_marked() {
    let (kiosk, _updates) = setup();
    let limit = routes::build_limit(30).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(Data::new(kiosk))
            .configure(|cfg| routes::configure(cfg, "/api", &limit)),
    )
    .await;

    let resp = test::call_service(&app, manual("E100").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["outcome"], "recorded");
    assert_eq!(body["employee"]["name"], "Asha");
    assert_eq!(body["event"]["verification_method"], "manual");

    let resp = test::call_service(&app, manual("E100").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["outcome"], "already_marked");
}

#[actix_web::test]
async fn unknown_employee_is_404() {
    let (kiosk, _updates) = setup();
    let limit = routes::build_limit(30).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(Data::new(kiosk))
            .configure(|cfg| routes::configure(cfg, "/api", &limit)),
    )
    .await;

    let resp = test::call_service(&app, manual("ZZZ").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "outcome": "not_found", "identifier": "ZZZ" }));
}

#[actix_web::test]
async fn manual_entry_is_rate_limited() {
    let (kiosk, _updates) = setup();
    let limit = routes::build_limit(2).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(Data::new(kiosk))
            .configure(|cfg| routes::configure(cfg, "/api", &limit)),
    )
    .await;

    for id in ["E100", "E200"] {
        let resp = test::call_service(&app, manual(id).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = test::call_service(&app, manual("E100").to_request()).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn stats_and_recent_reflect_check_ins() {
    let (kiosk, _updates) = setup();
    kiosk.check_in_manual("E100").await;

    let limit = routes::build_limit(30).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(Data::new(kiosk))
            .configure(|cfg| routes::configure(cfg, "/api", &limit)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/attendance/stats").to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["date"], "2024-03-04");
    assert_eq!(stats["total_employees"], 2);
    assert_eq!(stats["present_today"], 1);
    assert_eq!(stats["attendance_rate"], 50.0);
    assert_eq!(stats["weekly_attendance"], 1);

    let req = test::TestRequest::get()
        .uri("/api/attendance/recent?limit=5")
        .to_request();
    let recent: Value = test::call_and_read_body_json(&app, req).await;
    let recent = recent.as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["employee_id"], "E100");
}

#[actix_web::test]
async fn employee_history_validates_month() {
    let (kiosk, _updates) = setup();
    kiosk.check_in_manual("E200").await;

    let limit = routes::build_limit(30).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(Data::new(kiosk))
            .configure(|cfg| routes::configure(cfg, "/api", &limit)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/attendance/employee/E200?year=2024&month=3")
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(history.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/attendance/employee/E200?year=2024&month=2")
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    assert!(history.as_array().unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri("/api/attendance/employee/E200?month=13")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn kiosk_status_serves_the_latest_snapshot() {
    let (kiosk, mut updates) = setup();
    let (mut dashboard, snapshots) = Dashboard::new(10);

    kiosk.check_in_manual("E100").await;
    while let Ok(update) = updates.try_recv() {
        dashboard.apply(update);
    }

    let limit = routes::build_limit(30).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(Data::new(kiosk))
            .app_data(Data::new(snapshots))
            .configure(|cfg| routes::configure(cfg, "/api", &limit)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/kiosk/status").to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["status"], "Manual attendance marked for Asha");
    assert_eq!(status["severity"], "success");
    assert_eq!(status["last_employee"]["employee"]["employee_id"], "E100");
    assert_eq!(status["recent"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn refresh_reports_loaded_count() {
    let (kiosk, _updates) = setup();
    kiosk.check_in_manual("E100").await;
    kiosk.check_in_manual("E200").await;

    let limit = routes::build_limit(30).unwrap();
    let (_dashboard, snapshots) = Dashboard::new(10);
    let app = test::init_service(
        App::new()
            .app_data(Data::new(kiosk))
            .app_data(Data::new(snapshots))
            .configure(|cfg| routes::configure(cfg, "/api", &limit)),
    )
    .await;

    let req = test::TestRequest::post().uri("/api/kiosk/refresh").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "loaded": 2 }));
}

#[actix_web::test]
async fn directory_and_badges_are_readable() {
    let (kiosk, _updates) = setup();
    let limit = routes::build_limit(30).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(Data::new(kiosk))
            .configure(|cfg| routes::configure(cfg, "/api", &limit)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/employees").to_request();
    let employees: Value = test::call_and_read_body_json(&app, req).await;
    let ids: Vec<_> = employees
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["employee_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["E100", "E200"]);

    let req = test::TestRequest::get()
        .uri("/api/employees/E100/badge")
        .to_request();
    let badge: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(badge["name"], "Asha");
    let qr_data = badge["qr_data"].as_str().unwrap();
    assert_eq!(
        parse_payload(qr_data.as_bytes()),
        Payload::Identifier("E100".to_string())
    );

    let req = test::TestRequest::get()
        .uri("/api/employees/ZZZ/badge")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn kiosk_status_drops_yesterdays_check_ins() {
    let (_store, stores) = memory_stores();
    let clock = Arc::new(FixedClock::at(2024, 3, 4, 17, 0, 0));
    let (kiosk, mut updates) = kiosk(&stores, clock.clone());
    let (mut dashboard, snapshots) = Dashboard::new(10);

    kiosk.check_in_manual("E100").await;
    while let Ok(update) = updates.try_recv() {
        dashboard.apply(update);
    }
    clock.advance(ChronoDuration::hours(8));

    let limit = routes::build_limit(30).unwrap();
    let app = test::init_service(
        App::new()
            .app_data(Data::new(kiosk))
            .app_data(Data::new(snapshots))
            .configure(|cfg| routes::configure(cfg, "/api", &limit)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/kiosk/status").to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert!(status["recent"].as_array().unwrap().is_empty());
}
