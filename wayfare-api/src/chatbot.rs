use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use tracing::debug;
use wayfare_assistant::ChatRequest;

use crate::error::AppError;
use crate::extract::ValidJson;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    success: bool,
    response: String,
}

pub async fn chat(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    request.validate()?;

    let reply = state
        .assistant
        .respond(&request.message, &request.trip_data, Utc::now().date_naive());
    debug!(topic = reply.topic.unwrap_or("none"), trips = request.trip_data.len(), "Chat reply");

    Ok(Json(ChatResponse { success: true, response: reply.text }))
}
