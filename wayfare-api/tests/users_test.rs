mod common;

use axum::http::StatusCode;
use common::{TestApp, PASSWORD};
use serde_json::json;
use wayfare_core::Role;

#[tokio::test]
async fn test_admin_dashboard_counts_everything() {
    let app = TestApp::new();
    let (admin, token) = app.user("director", Role::Admin).await;
    app.user("guest1", Role::User).await;
    app.trip(&admin, json!({ "featured": true })).await;
    app.trip(&admin, json!({ "title": "Tozeur Oasis" })).await;

    let (status, body) = app.get("/api/users/dashboard", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"]["stats"];
    assert_eq!(stats["totalUsers"], 2);
    assert_eq!(stats["totalTrips"], 2);
    assert_eq!(stats["activeTrips"], 2);
    assert_eq!(stats["featuredTrips"], 1);
    assert_eq!(body["data"]["recentUsers"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["recentTrips"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_user_dashboard_shows_own_trips_only() {
    let app = TestApp::new();
    let (admin, _) = app.user("director", Role::Admin).await;
    let (user, token) = app.user("guide", Role::User).await;
    app.trip(&admin, json!({})).await;
    app.trip(&user, json!({ "title": "Chenini Hike", "featured": true })).await;

    let (status, body) = app.get("/api/users/dashboard", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stats"]["totalTrips"], 1);
    assert_eq!(body["data"]["stats"]["featuredTrips"], 1);
    assert!(body["data"]["stats"].get("totalUsers").is_none());
    assert_eq!(body["data"]["myTrips"][0]["title"], "Chenini Hike");
}

#[tokio::test]
async fn test_profile_update_checks_current_password() {
    let app = TestApp::new();
    let (_, token) = app.user("yasmine", Role::User).await;

    let (status, body) = app
        .put("/api/users/profile", Some(&token), json!({ "currentPassword": "wrong", "newPassword": "next-pass" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Current password is incorrect");

    let (status, _) = app
        .put("/api/users/profile", Some(&token), json!({ "newPassword": "next-pass" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(
            "/api/users/profile",
            Some(&token),
            json!({ "userName": "yasmine-b", "currentPassword": PASSWORD, "newPassword": "next-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userName"], "yasmine-b");

    let (status, _) = app
        .post("/api/auth/login", None, json!({ "email": "yasmine@example.com", "password": "next-pass" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_profile_email_must_stay_unique() {
    let app = TestApp::new();
    app.user("taken", Role::User).await;
    let (_, token) = app.user("mover", Role::User).await;

    let (status, _) = app
        .put("/api/users/profile", Some(&token), json!({ "email": "TAKEN@example.com" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_changes_and_user_access() {
    let app = TestApp::new();
    let (_, admin_token) = app.user("director", Role::Admin).await;
    let (user, token) = app.user("member", Role::User).await;
    let (other, _) = app.user("neighbour", Role::User).await;

    let (status, _) = app.get("/api/users", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = app.get("/api/users", Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (status, _) = app.get(&format!("/api/users/{}", user.id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/users/{}", other.id), Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let role_uri = format!("/api/users/{}/role", user.id);
    let (status, _) = app.put(&role_uri, Some(&token), json!({ "role": "admin" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.put(&role_uri, Some(&admin_token), json!({ "role": "superuser" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = app.put(&role_uri, Some(&admin_token), json!({ "role": "admin" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "admin");

    let (status, _) = app.delete(&format!("/api/users/{}", other.id), Some(&admin_token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/api/users/{}", other.id), Some(&admin_token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
