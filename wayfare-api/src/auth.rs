use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use chrono::{Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use wayfare_core::{NewUser, Role, User};
use wayfare_shared::models::events::PasswordResetRequestedEvent;
use wayfare_shared::{publish, Masked};
use wayfare_store::OutgoingMail;

use crate::error::AppError;
use crate::extract::ValidJson;
use crate::middleware::{issue_token, AuthUser, MaybeAuthUser};
use crate::password::{hash_password, verify_password};
use crate::response::ApiResponse;
use crate::state::AppState;

const RESET_TOKEN_BYTES: usize = 32;
const RESET_TOKEN_TTL_MINUTES: i64 = 60;
const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(profile))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password/{token}", post(reset_password))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RegisterRequest {
    user_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role: Option<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ForgotPasswordRequest {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResetPasswordRequest {
    password: Option<String>,
}

/// Public part of an account, as returned next to a fresh token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self { id: user.id, user_name: user.user_name.clone(), email: user.email.clone(), role: user.role }
    }
}

#[derive(Debug, Serialize)]
pub struct Session {
    pub user: UserSummary,
    pub token: String,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trimmed value, or `None` when absent or blank.
fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

async fn register(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> Result<ApiResponse<Session>, AppError> {
    let (Some(user_name), Some(email), Some(password)) =
        (present(body.user_name), present(body.email), body.password.filter(|p| !p.is_empty()))
    else {
        return Err(AppError::ValidationError("Please provide all required fields".to_string()));
    };
    let email = normalize_email(&email);

    // Only an admin can hand out the admin role
    let role = match (body.role, caller) {
        (Some(role), Some(claims)) if claims.is_admin() => role,
        (Some(Role::Admin), _) => {
            warn!(email = %Masked(&email), "Ignoring self-assigned admin role at registration");
            Role::User
        }
        _ => Role::User,
    };

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::ValidationError("User with this email already exists".to_string()));
    }

    let password_hash = hash_password(password).await?;
    let user = state
        .users
        .create_user(NewUser { user_name, email, password_hash, role })
        .await?;
    let token = issue_token(&user, &state.auth)?;

    info!(user_id = %user.id, email = %Masked(&user.email), role = %user.role, "User registered");
    Ok(ApiResponse::with_msg("User registered successfully", Session { user: UserSummary::from(&user), token }).created())
}

async fn login(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> Result<ApiResponse<Session>, AppError> {
    let (Some(email), Some(password)) = (present(body.email), body.password.filter(|p| !p.is_empty())) else {
        return Err(AppError::ValidationError("Please provide email and password".to_string()));
    };

    let Some(user) = state.users.find_by_email(&normalize_email(&email)).await? else {
        return Err(AppError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
    };
    if !verify_password(password, user.password_hash.clone()).await? {
        return Err(AppError::AuthenticationError(INVALID_CREDENTIALS.to_string()));
    }

    let token = issue_token(&user, &state.auth)?;
    info!(user_id = %user.id, "User logged in");
    Ok(ApiResponse::with_msg("Login successful", Session { user: UserSummary::from(&user), token }))
}

async fn profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<ApiResponse<User>, AppError> {
    let user = state
        .users
        .get_user(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

    Ok(ApiResponse::ok(user))
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

async fn forgot_password(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<ForgotPasswordRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let Some(email) = present(body.email) else {
        return Err(AppError::ValidationError("Please provide email address".to_string()));
    };

    let user = state
        .users
        .find_by_email(&normalize_email(&email))
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found with this email".to_string()))?;

    let token = generate_reset_token();
    let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
    state.users.set_reset_token(user.id, &token, expires_at).await?;

    let reset_url = format!("{}/reset-password/{}", state.frontend_url.trim_end_matches('/'), token);
    let sent = state.mailer.send(OutgoingMail::password_reset(&user.email, &reset_url)).await;

    publish(&PasswordResetRequestedEvent { user_id: user.id, expires_at, email_sent: sent.is_ok() });

    // The token stays stored; the user can simply ask again
    sent.map_err(|e| AppError::internal("Error sending reset email", e))?;

    Ok(ApiResponse::message("Password reset email sent successfully"))
}

async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ValidJson(body): ValidJson<ResetPasswordRequest>,
) -> Result<ApiResponse<()>, AppError> {
    let Some(password) = body.password.filter(|p| !p.is_empty()) else {
        return Err(AppError::ValidationError("Please provide new password".to_string()));
    };

    let password_hash = hash_password(password).await?;
    let user = state
        .users
        .consume_reset_token(&token, Utc::now(), &password_hash)
        .await?
        .ok_or_else(|| AppError::ValidationError("Invalid or expired reset token".to_string()))?;

    info!(user_id = %user.id, "Password reset");
    Ok(ApiResponse::message("Password reset successfully"))
}
