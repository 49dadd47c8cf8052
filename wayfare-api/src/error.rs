use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use wayfare_assistant::ChatError;
use wayfare_booking::BookingError;
use wayfare_catalog::QueryError;
use wayfare_core::CoreError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    RateLimited,
    /// A failure with a caller-facing message; `error` carries the cause.
    InternalServerError { msg: String, error: String },
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn internal(msg: &str, error: impl std::fmt::Display) -> Self {
        AppError::InternalServerError { msg: msg.to_string(), error: error.to_string() }
    }

    fn status_and_body(self) -> (StatusCode, String, Option<String>) {
        match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg, None),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests from this IP, please try again later.".to_string(),
                None,
            ),
            AppError::InternalServerError { msg, error } => {
                tracing::error!("Internal Server Error: {}: {}", msg, error);
                (StatusCode::INTERNAL_SERVER_ERROR, msg, Some(error))
            }
            AppError::Anyhow(err) => match classify(err) {
                Ok(mapped) => mapped.status_and_body(),
                Err(err) => {
                    tracing::error!("Internal Server Error: {:#}", err);
                    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string(), Some(err.to_string()))
                }
            },
        }
    }
}

/// Gives domain errors that travelled through `?` their proper status.
fn classify(err: anyhow::Error) -> Result<AppError, anyhow::Error> {
    let err = match err.downcast::<CoreError>() {
        Ok(core) => {
            return match core {
                CoreError::NotFound { entity, .. } => Ok(AppError::NotFoundError(format!("{} not found", entity))),
                CoreError::AlreadyExists { entity: "User" } => {
                    Ok(AppError::ValidationError("User with this email already exists".to_string()))
                }
                CoreError::AlreadyExists { entity } => Ok(AppError::ConflictError(format!("{} already exists", entity))),
                CoreError::CapacityExceeded { remaining } => Ok(AppError::ConflictError(
                    CoreError::CapacityExceeded { remaining }.to_string(),
                )),
                CoreError::ValidationError(msg) => Ok(AppError::ValidationError(msg)),
                CoreError::StorageError(msg) => Err(anyhow::Error::new(CoreError::StorageError(msg))),
            }
        }
        Err(err) => err,
    };

    let err = match err.downcast::<BookingError>() {
        Ok(BookingError::CapacityExceeded { remaining }) => {
            return Ok(AppError::ConflictError(
                BookingError::CapacityExceeded { remaining }.to_string(),
            ))
        }
        Ok(other) => return Ok(AppError::ValidationError(other.to_string())),
        Err(err) => err,
    };

    let err = match err.downcast::<QueryError>() {
        Ok(query) => return Ok(AppError::ValidationError(query.to_string())),
        Err(err) => err,
    };

    match err.downcast::<ChatError>() {
        Ok(chat) => Ok(AppError::ValidationError(chat.to_string())),
        Err(err) => Err(err),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg, error) = self.status_and_body();

        let body = match error {
            Some(error) => json!({ "success": false, "msg": msg, "error": error }),
            None => json!({ "success": false, "msg": msg }),
        };

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
