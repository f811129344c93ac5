use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use marquee_api::{app, AppState};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

fn test_app() -> Router {
    app(AppState::in_memory(Duration::from_millis(500)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let resp = app.clone().oneshot(req).await.expect("response");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

fn movie(title: &str) -> Value {
    json!({
        "title": title,
        "genre": "Action",
        "duration": 120,
        "rating": 8.7,
        "releaseYear": 2008
    })
}

fn showtime(movie_id: i64, theater: &str, start: &str, end: &str) -> Value {
    json!({
        "movieId": movie_id,
        "theater": theater,
        "startTime": start,
        "endTime": end,
        "price": 20.2
    })
}

async fn seed(app: &Router) -> (i64, i64) {
    let (status, body) = send(app, "POST", "/movies", Some(movie("The Dark Knight"))).await;
    assert_eq!(status, StatusCode::OK);
    let movie_id = body["id"].as_i64().expect("movie id");

    let (status, body) = send(
        app,
        "POST",
        "/showtimes",
        Some(showtime(movie_id, "Sample Theater", "2025-02-14T11:47:46", "2025-02-14T14:47:46")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (movie_id, body["id"].as_i64().expect("showtime id"))
}

#[tokio::test]
async fn test_movie_endpoints() {
    let app = test_app();

    let (status, body) = send(&app, "POST", "/movies", Some(movie("Heat"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["releaseYear"], 2008);

    let (status, _) = send(&app, "POST", "/movies", Some(movie("Heat"))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "POST", "/movies/update/Heat", Some(movie("Heat 2"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Heat 2");

    let (status, body) = send(&app, "GET", "/movies/all", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, "DELETE", "/movies/Heat%202", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "DELETE", "/movies/Heat%202", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_invalid_movie_is_bad_request() {
    let app = test_app();
    let mut body = movie("Heat");
    body["genre"] = json!("Sci-Fi");

    let (status, body) = send(&app, "POST", "/movies", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("genre"));
}

#[tokio::test]
async fn test_showtime_lifecycle() {
    let app = test_app();
    let (movie_id, id) = seed(&app).await;

    let (status, body) = send(&app, "GET", &format!("/showtimes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theater"], "Sample Theater");
    assert_eq!(body["startTime"], "2025-02-14T11:47:46");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/showtimes/update/{id}"),
        Some(showtime(movie_id, "Sample Theater", "2025-02-14T12:00:00", "2025-02-14T15:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endTime"], "2025-02-14T15:00:00");

    let (status, _) = send(&app, "DELETE", &format!("/showtimes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &format!("/showtimes/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_showtime_rejections() {
    let app = test_app();
    let (movie_id, _) = seed(&app).await;

    // Overlaps the seeded showtime.
    let (status, body) = send(
        &app,
        "POST",
        "/showtimes",
        Some(showtime(movie_id, "Sample Theater", "2025-02-14T13:00:00", "2025-02-14T16:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap_or_default().contains("Sample Theater"));

    // Unknown movie in the body.
    let (status, _) = send(
        &app,
        "POST",
        "/showtimes",
        Some(showtime(movie_id + 100, "Hall 2", "2025-02-14T13:00:00", "2025-02-14T16:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Zero-length interval.
    let (status, _) = send(
        &app,
        "POST",
        "/showtimes",
        Some(showtime(movie_id, "Hall 2", "2025-02-14T13:00:00", "2025-02-14T13:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Prices that do not fit two decimal places below 10^8.
    for price in ["12.345", "100000000"] {
        let mut body = showtime(movie_id, "Hall 2", "2025-02-14T13:00:00", "2025-02-14T16:00:00");
        body["price"] = json!(price);
        let (status, body) = send(&app, "POST", "/showtimes", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap_or_default().contains("price"));
    }

    // Unknown id in the path.
    let (status, _) = send(
        &app,
        "POST",
        "/showtimes/update/999",
        Some(showtime(movie_id, "Hall 2", "2025-02-14T13:00:00", "2025-02-14T16:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_flow() {
    let app = test_app();
    let (_, showtime_id) = seed(&app).await;
    let request = json!({
        "showtimeId": showtime_id,
        "seatNumber": 15,
        "userId": "84438967-f68f-4fa0-b620-0f08217e76af"
    });

    let (status, body) = send(&app, "POST", "/bookings", Some(request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let booking_id = body["bookingId"].as_str().expect("booking id").to_string();

    let (status, _) = send(&app, "POST", "/bookings", Some(request)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", &format!("/bookings/{booking_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seatNumber"], 15);
    assert_eq!(body["userId"], "84438967-f68f-4fa0-b620-0f08217e76af");
    assert!(body["bookingTime"].is_string());

    let (status, body) = send(&app, "GET", "/bookings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, "GET", &format!("/bookings/{}", uuid::Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_rejections() {
    let app = test_app();
    let (_, showtime_id) = seed(&app).await;

    for (seat, user) in [
        (0, "84438967-f68f-4fa0-b620-0f08217e76af"),
        (3, "not-a-uuid"),
        (3, "84438967f68f4fa0b6200f08217e76af"),
    ] {
        let body = json!({ "showtimeId": showtime_id, "seatNumber": seat, "userId": user });
        let (status, _) = send(&app, "POST", "/bookings", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "seat {seat}, user {user}");
    }

    let body = json!({
        "showtimeId": showtime_id + 1,
        "seatNumber": 3,
        "userId": "84438967-f68f-4fa0-b620-0f08217e76af"
    });
    let (status, _) = send(&app, "POST", "/bookings", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app();
    let (status, body) = send(&app, "POST", "/bookings", Some(json!({ "seatNumber": 1 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_metrics_endpoint_reports_rejections() {
    let app = test_app();
    send(&app, "DELETE", "/showtimes/424242", None).await;

    let (status, body) = send(&app, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().expect("text exposition");
    assert!(text.contains("marquee_rejections_total{kind=\"unknown_reference\"}"));
}
