mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use wayfare_assistant::OFF_TOPIC_REPLY;

fn trip_data() -> serde_json::Value {
    json!([
        { "title": "Djerba Beaches", "destination": "Djerba", "price": 180, "featured": true, "startDates": ["2099-06-01"] },
        { "title": "Sahara Trek", "destination": "Douz", "price": 420, "featured": false, "difficulty": "hard" },
        { "title": "Medina Walk", "destination": "Tunis", "price": 60, "featured": true }
    ])
}

#[tokio::test]
async fn test_off_topic_messages_get_the_fixed_reply() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/trips/chatbot", None, json!({ "message": "Who won the football match?", "tripData": trip_data() }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["response"], OFF_TOPIC_REPLY);
}

#[tokio::test]
async fn test_featured_question_lists_only_featured_trips() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/api/trips/chatbot", None, json!({ "message": "Show me your featured trips", "tripData": trip_data() }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let response = body["response"].as_str().unwrap();
    assert!(response.contains("Djerba Beaches"));
    assert!(response.contains("Medina Walk"));
    assert!(!response.contains("Sahara Trek"));
}

#[tokio::test]
async fn test_price_question_uses_client_snapshot() {
    let app = TestApp::new();

    let (_, body) = app
        .post("/api/trips/chatbot", None, json!({ "message": "What does the cheapest trip cost?", "tripData": trip_data() }))
        .await;
    let response = body["response"].as_str().unwrap();
    assert!(response.contains("Medina Walk"));
    assert!(response.contains("420"));
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app.post("/api/trips/chatbot", None, json!({ "tripData": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Message is required");

    let (status, _) = app.post("/api/trips/chatbot", None, json!({ "message": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
