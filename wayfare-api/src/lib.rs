use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod bookings;
pub mod chatbot;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod password;
pub mod response;
pub mod state;
pub mod trips;
pub mod users;

pub use state::{AppState, AuthConfig};

pub fn app(state: AppState) -> Router {
    let cors = match state.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        Err(_) => {
            tracing::warn!("Invalid frontend_url {:?}; cross-origin requests will be refused", state.frontend_url);
            CorsLayer::new()
        }
    };

    let api = Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::routes())
        .nest("/users", users::routes())
        .nest("/trips", trips::routes())
        .nest("/bookings", bookings::routes())
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::rate_limit_middleware));

    Router::new()
        .route("/", get(welcome))
        .nest("/api", api)
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "msg": "Server is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn welcome() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "msg": "Welcome to the Wayfare API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth",
            "users": "/api/users",
            "trips": "/api/trips",
            "bookings": "/api/bookings",
        },
    }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "success": false, "msg": "Route not found" })))
}
