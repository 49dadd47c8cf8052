mod common;

use axum::http::StatusCode;
use common::{booking_body, TestApp};
use serde_json::json;
use wayfare_core::repository::BookingRepository;
use wayfare_core::Role;

#[tokio::test]
async fn test_capacity_is_enforced_per_date() {
    let app = TestApp::new();
    let (admin, _) = app.user("organiser", Role::Admin).await;
    let (_, token) = app.user("traveller", Role::User).await;
    let trip = app.trip(&admin, json!({})).await;

    let mut first = booking_body(8, "2025-10-04");
    first["tripId"] = json!(trip.id);
    let (status, _) = app.post("/api/bookings", Some(&token), first).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut over = booking_body(3, "2025-10-04");
    over["tripId"] = json!(trip.id);
    let (status, body) = app.post("/api/bookings", Some(&token), over).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["msg"], "Only 2 spots left on this date");
    assert_eq!(app.store.list_all().await.unwrap().len(), 1);

    // Another date has its own counter
    let mut other_date = booking_body(3, "2025-11-08");
    other_date["tripId"] = json!(trip.id);
    let (status, _) = app.post("/api/bookings", Some(&token), other_date).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut fits = booking_body(2, "2025-10-04");
    fits["tripId"] = json!(trip.id);
    let (status, body) = app.post("/api/bookings", Some(&token), fits).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["totalAmount"], 500.0);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["paymentStatus"], "pending");
    assert_eq!(body["data"]["tripTitle"], "Sahara Dunes Camp");

    let date = chrono::NaiveDate::from_ymd_opt(2025, 10, 4).unwrap();
    assert_eq!(app.store.booked_slots(trip.id, date).await.unwrap(), 10);
}

#[tokio::test]
async fn test_booking_request_validation() {
    let app = TestApp::new();
    let (admin, _) = app.user("organiser", Role::Admin).await;
    let (_, token) = app.user("traveller", Role::User).await;
    let trip = app.trip(&admin, json!({})).await;

    let (status, _) = app.post("/api/bookings", None, booking_body(1, "2025-10-04")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/api/bookings", Some(&token), booking_body(1, "2025-10-04")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut zero = booking_body(0, "2025-10-04");
    zero["tripId"] = json!(trip.id);
    let (status, _) = app.post("/api/bookings", Some(&token), zero).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut no_email = booking_body(1, "2025-10-04");
    no_email["tripId"] = json!(trip.id);
    no_email["customerEmail"] = json!("  ");
    let (status, _) = app.post("/api/bookings", Some(&token), no_email).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut unknown_trip = booking_body(1, "2025-10-04");
    unknown_trip["tripId"] = json!(uuid::Uuid::new_v4());
    let (status, body) = app.post("/api/bookings", Some(&token), unknown_trip).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "Trip not found");
}

#[tokio::test]
async fn test_guest_books_and_cancels_by_email() {
    let app = TestApp::new();
    let (admin, _) = app.user("organiser", Role::Admin).await;
    let (_, stranger) = app.user("stranger", Role::User).await;
    let trip = app.trip(&admin, json!({ "maxGroupSize": 4 })).await;

    let uri = format!("/api/trips/{}/book", trip.id);
    let (status, body) = app.post(&uri, None, booking_body(4, "2025-10-04")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["userId"].is_null());
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();
    let cancel = format!("/api/bookings/{}/cancel", booking_id);

    let (status, _) = app.post(&cancel, Some(&stranger), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.post(&cancel, None, json!({ "email": "someone@else.com" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.post(&cancel, None, json!({ "email": "INES@example.com" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Booking cancelled successfully");
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, body) = app.post(&cancel, None, json!({ "email": "ines@example.com" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Booking already cancelled");

    // The four slots came back exactly once
    let (status, _) = app.post(&uri, None, booking_body(4, "2025-10-04")).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.post(&uri, None, booking_body(1, "2025-10-04")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_book_route_rejects_mismatched_trip_id() {
    let app = TestApp::new();
    let (admin, _) = app.user("organiser", Role::Admin).await;
    let trip = app.trip(&admin, json!({})).await;

    let mut body = booking_body(1, "2025-10-04");
    body["tripId"] = json!(uuid::Uuid::new_v4());
    let (status, _) = app.post(&format!("/api/trips/{}/book", trip.id), None, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/trips/not-a-uuid/book", None, booking_body(1, "2025-10-04"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_owner_cancels_without_body_and_lists_own_bookings() {
    let app = TestApp::new();
    let (admin, _) = app.user("organiser", Role::Admin).await;
    let (_, token) = app.user("traveller", Role::User).await;
    let (_, other) = app.user("other", Role::User).await;
    let trip = app.trip(&admin, json!({})).await;

    let (_, body) = app
        .post(&format!("/api/trips/{}/book", trip.id), Some(&token), booking_body(2, "2025-10-04"))
        .await;
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app.get("/api/bookings/my", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/bookings/my", Some(&other)).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = app
        .request(
            axum::http::Method::POST,
            &format!("/api/bookings/{}/cancel", booking_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");
}

#[tokio::test]
async fn test_admin_manages_statuses() {
    let app = TestApp::new();
    let (admin, admin_token) = app.user("organiser", Role::Admin).await;
    let (_, token) = app.user("traveller", Role::User).await;
    let trip = app.trip(&admin, json!({ "maxGroupSize": 5 })).await;

    let (_, body) = app
        .post(&format!("/api/trips/{}/book", trip.id), Some(&token), booking_body(5, "2025-10-04"))
        .await;
    let booking_id = body["data"]["id"].as_str().unwrap().to_string();
    let status_uri = format!("/api/bookings/{}/status", booking_id);

    let (status, _) = app.put(&status_uri, Some(&token), json!({ "status": "confirmed" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.put(&status_uri, Some(&admin_token), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.put(&status_uri, Some(&admin_token), json!({ "status": "refunded" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(&status_uri, Some(&admin_token), json!({ "status": "confirmed", "paymentStatus": "paid" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "confirmed");
    assert_eq!(body["data"]["paymentStatus"], "paid");

    let (status, _) = app.put(&status_uri, Some(&admin_token), json!({ "status": "completed" })).await;
    assert_eq!(status, StatusCode::OK);
    let date = chrono::NaiveDate::from_ymd_opt(2025, 10, 4).unwrap();
    assert_eq!(app.store.booked_slots(trip.id, date).await.unwrap(), 0);

    let (status, body) = app.get("/api/bookings", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (status, body) = app.get("/api/trips/bookings/all", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (status, _) = app.get("/api/bookings", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_oversized_group_is_refused_without_touching_the_counter() {
    let app = TestApp::new();
    let (admin, _) = app.user("organiser", Role::Admin).await;
    let trip = app.trip(&admin, json!({})).await;
    let uri = format!("/api/trips/{}/book", trip.id);
    let date = chrono::NaiveDate::from_ymd_opt(2025, 10, 4).unwrap();

    let (status, _) = app.post(&uri, None, booking_body(1, "2025-10-04")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.post(&uri, None, booking_body(i32::MAX, "2025-10-04")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["msg"], "Only 9 spots left on this date");
    assert_eq!(app.store.booked_slots(trip.id, date).await.unwrap(), 1);

    let (status, _) = app.post(&uri, None, booking_body(11, "2025-11-08")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.post(&uri, None, booking_body(9, "2025-10-04")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(app.store.booked_slots(trip.id, date).await.unwrap(), 10);
    assert_eq!(app.store.list_all().await.unwrap().len(), 2);
}
