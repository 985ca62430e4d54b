use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::{api, config::Config, persistence, state::AppState};

async fn setup_app() -> (axum::Router, Arc<AppState>) {
    let mut config = Config::from_env();
    config.database_path = std::env::temp_dir()
        .join(format!("gig-test-{}.db", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .to_string();
    config.rules = gig_core::SchedulingRules::default();

    let db = persistence::init_database(&config.database_path, config.database_max_connections)
        .await
        .expect("init db");
    let state = Arc::new(AppState::new(db, config));
    let app = api::routes().with_state(state.clone());

    for location in [
        json!({"location_id": "1", "name": "Library South", "code": "LIBS",
               "coordinate": {"lat": 33.7530, "lng": -84.3860}}),
        json!({"location_id": "2", "name": "Arts and Humanities", "code": "AH",
               "coordinate": {"lat": 33.7575, "lng": -84.3860}}),
        json!({"location_id": "3", "name": "Annex"}),
    ] {
        let res = app.clone().oneshot(post("/v1/locations", location)).await.unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    (app, state)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn booking(location_id: &str, start: &str, end: &str) -> Value {
    json!({
        "provider_id": "prov-1",
        "customer_id": "cust-1",
        "location_id": location_id,
        "start_at": format!("2025-03-10T{}:00Z", start),
        "ends_at": format!("2025-03-10T{}:00Z", end),
    })
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn health_and_request_id() {
    let (app, _state) = setup_app().await;

    let req = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn walking_time_between_buildings() {
    let (app, _state) = setup_app().await;

    let res = app
        .clone()
        .oneshot(get("/v1/walking-time/calculate?from=1&to=2"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["data"]["walking_time_minutes"], 8);
    assert_eq!(body["data"]["walking_time_formatted"], "8 minutes");
    assert_eq!(body["data"]["from"]["code"], "LIBS");

    let res = app
        .clone()
        .oneshot(get("/v1/walking-time/calculate?from=1&to=3"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .clone()
        .oneshot(get("/v1/walking-time/calculate?from=1&to=99"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.oneshot(get("/v1/walking-time/buildings")).await.unwrap();
    let body = read_json(res).await;
    assert_eq!(body["count"], 3);
}

#[tokio::test]
async fn overlap_is_rejected_with_conflict() {
    let (app, _state) = setup_app().await;

    let res = app
        .clone()
        .oneshot(post("/v1/bookings", booking("1", "10:00", "11:00")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = read_json(res).await;
    assert_eq!(created["data"]["status"], "pending");

    let res = app
        .clone()
        .oneshot(post("/v1/bookings", booking("2", "10:30", "11:30")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = read_json(res).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["conflictType"], "time_overlap");
    assert_eq!(
        body["details"]["booking"]["booking_id"],
        created["data"]["booking_id"]
    );
}

#[tokio::test]
async fn walking_time_after_reports_minutes() {
    let (app, _state) = setup_app().await;

    let res = app
        .clone()
        .oneshot(post("/v1/bookings", booking("1", "09:00", "10:00")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .clone()
        .oneshot(post("/v1/bookings/check", booking("2", "10:10", "11:00")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["canBook"], false);
    assert_eq!(body["conflictType"], "walking_time_after");
    assert_eq!(body["details"]["required_minutes"], 13);
    assert_eq!(body["details"]["available_minutes"], 10);

    let res = app
        .clone()
        .oneshot(post("/v1/bookings", booking("2", "10:15", "11:00")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn input_faults_are_not_conflicts() {
    let (app, _state) = setup_app().await;

    let res = app
        .clone()
        .oneshot(post("/v1/bookings", booking("3", "10:00", "11:00")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(res).await;
    assert!(body.get("conflictType").is_none());

    let res = app
        .clone()
        .oneshot(post("/v1/bookings", booking("99", "10:00", "11:00")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = app
        .clone()
        .oneshot(post("/v1/bookings", booking("1", "11:00", "10:00")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let mut own = booking("1", "10:00", "11:00");
    own["customer_id"] = json!("prov-1");
    let res = app.oneshot(post("/v1/bookings", own)).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cancelled_booking_frees_the_slot() {
    let (app, _state) = setup_app().await;

    let res = app
        .clone()
        .oneshot(post("/v1/bookings", booking("1", "10:00", "11:00")))
        .await
        .unwrap();
    let created = read_json(res).await;
    let id = created["data"]["booking_id"].as_str().unwrap().to_string();

    let res = app
        .clone()
        .oneshot(put(&format!("/v1/bookings/{}", id), json!({"status": "confirmed"})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/v1/bookings/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(get(&format!("/v1/bookings/{}", id)))
        .await
        .unwrap();
    let body = read_json(res).await;
    assert_eq!(body["data"]["status"], "cancelled");

    // Terminal: cannot be revived.
    let res = app
        .clone()
        .oneshot(put(&format!("/v1/bookings/{}", id), json!({"status": "pending"})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .clone()
        .oneshot(post("/v1/bookings", booking("2", "10:30", "11:30")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .oneshot(get("/v1/bookings?provider_id=prov-1&status=cancelled"))
        .await
        .unwrap();
    let body = read_json(res).await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn unknown_booking_is_not_found() {
    let (app, _state) = setup_app().await;

    let res = app
        .clone()
        .oneshot(get("/v1/bookings/does-not-exist"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .oneshot(put("/v1/bookings/does-not-exist", json!({"status": "cancelled"})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_is_bad_request_not_input_fault() {
    let (app, _state) = setup_app().await;

    let res = app
        .clone()
        .oneshot(post(
            "/v1/bookings",
            json!({"customer_id": "c", "location_id": "1"}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("provider_id"));

    let res = app
        .clone()
        .oneshot(post("/v1/bookings/check", json!({"provider_id": "prov-1"})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app
        .oneshot(put("/v1/bookings/any", json!({"status": "archived"})))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn far_future_booking_is_rejected_without_panicking() {
    let (app, _state) = setup_app().await;

    let far = json!({
        "provider_id": "prov-1",
        "customer_id": "cust-1",
        "location_id": "1",
        "start_at": "+262142-12-31T22:00:00Z",
        "ends_at": "+262142-12-31T23:00:00Z",
    });
    let res = app
        .clone()
        .oneshot(post("/v1/bookings", far.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = read_json(res).await;
    assert_eq!(body["success"], false);

    let res = app
        .clone()
        .oneshot(post("/v1/bookings/check", far))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // The last storable hour still books, and its window reaches past 9999.
    let last = json!({
        "provider_id": "prov-1",
        "customer_id": "cust-1",
        "location_id": "1",
        "start_at": "9999-12-31T22:00:00Z",
        "ends_at": "9999-12-31T23:00:00Z",
    });
    let res = app
        .clone()
        .oneshot(post("/v1/bookings", last.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app.oneshot(post("/v1/bookings", last)).await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}
