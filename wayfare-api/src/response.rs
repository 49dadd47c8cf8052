use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success envelope: `{ success: true, msg?, data? }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, msg: None, data: Some(data), status: StatusCode::OK }
    }

    pub fn with_msg(msg: &str, data: T) -> Self {
        Self { success: true, msg: Some(msg.to_string()), data: Some(data), status: StatusCode::OK }
    }

    pub fn created(mut self) -> Self {
        self.status = StatusCode::CREATED;
        self
    }
}

impl ApiResponse<()> {
    pub fn message(msg: &str) -> Self {
        Self { success: true, msg: Some(msg.to_string()), data: None, status: StatusCode::OK }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(&self)).into_response()
    }
}
