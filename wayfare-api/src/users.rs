use axum::{
    extract::{Path, State},
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use wayfare_core::{Role, SortKey, TripFilter, User, UserPatch};

use crate::auth::normalize_email;
use crate::error::AppError;
use crate::extract::{parse_id, ValidJson};
use crate::middleware::{AdminUser, AuthUser, Claims};
use crate::password::{hash_password, verify_password};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::trips::{views, TripView};

const RECENT_LIMIT: u32 = 5;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/dashboard", get(dashboard))
        .route("/profile", put(update_profile))
        .route("/{id}", get(get_user).delete(delete_user))
        .route("/{id}/role", put(update_role))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProfileUpdate {
    user_name: Option<String>,
    email: Option<String>,
    current_password: Option<String>,
    new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoleUpdate {
    role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminStats {
    total_users: u64,
    total_trips: u64,
    active_trips: u64,
    featured_trips: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OwnStats {
    total_trips: u64,
    active_trips: u64,
    featured_trips: u64,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Dashboard {
    #[serde(rename_all = "camelCase")]
    Admin {
        stats: AdminStats,
        recent_users: Vec<User>,
        recent_trips: Vec<TripView>,
    },
    #[serde(rename_all = "camelCase")]
    Own { stats: OwnStats, my_trips: Vec<TripView> },
}

fn self_or_admin(claims: &Claims, id: Uuid) -> bool {
    claims.sub == id || claims.is_admin()
}

async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<ApiResponse<Vec<User>>, AppError> {
    Ok(ApiResponse::ok(state.users.list_users(None).await?))
}

async fn get_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<User>, AppError> {
    let id = parse_id(&id, "user")?;
    if !self_or_admin(&claims, id) {
        return Err(AppError::AuthorizationError("You are not authorized to view this user".to_string()));
    }

    let user = state
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;
    Ok(ApiResponse::ok(user))
}

async fn update_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidJson(body): ValidJson<ProfileUpdate>,
) -> Result<ApiResponse<User>, AppError> {
    let user = state
        .users
        .get_user(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

    let mut patch = UserPatch {
        user_name: body.user_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        email: body.email.map(|e| normalize_email(&e)).filter(|e| !e.is_empty()),
        password_hash: None,
    };

    match (body.current_password, body.new_password.filter(|p| !p.is_empty())) {
        (Some(current), Some(new_password)) => {
            if !verify_password(current, user.password_hash.clone()).await? {
                return Err(AppError::ValidationError("Current password is incorrect".to_string()));
            }
            patch.password_hash = Some(hash_password(new_password).await?);
        }
        (None, Some(_)) => {
            return Err(AppError::ValidationError(
                "Current password is required to set a new password".to_string(),
            ));
        }
        _ => {}
    }

    let updated = state
        .users
        .update_user(user.id, patch)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

    info!(user_id = %updated.id, "Profile updated");
    Ok(ApiResponse::with_msg("User updated successfully", updated))
}

async fn delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let id = parse_id(&id, "user")?;
    if !self_or_admin(&claims, id) {
        return Err(AppError::AuthorizationError("You are not authorized to delete this user".to_string()));
    }

    if !state.users.delete_user(id).await? {
        return Err(AppError::NotFoundError("User not found".to_string()));
    }

    info!(user_id = %id, by = %claims.sub, "User deleted");
    Ok(ApiResponse::message("User deleted successfully"))
}

async fn update_role(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<RoleUpdate>,
) -> Result<ApiResponse<User>, AppError> {
    let id = parse_id(&id, "user")?;
    let role: Role = body.role.parse().map_err(AppError::ValidationError)?;

    let user = state
        .users
        .update_role(id, role)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

    info!(user_id = %id, role = %role, by = %claims.sub, "User role updated");
    Ok(ApiResponse::with_msg("User role updated successfully", user))
}

async fn dashboard(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<ApiResponse<Dashboard>, AppError> {
    let everything = TripFilter::default();

    let data = if claims.is_admin() {
        let stats = AdminStats {
            total_users: state.users.count_users().await?,
            total_trips: state.trips.count_trips(&everything).await?,
            active_trips: state.trips.count_trips(&TripFilter { active: Some(true), ..Default::default() }).await?,
            featured_trips: state.trips.count_trips(&TripFilter { featured: Some(true), ..Default::default() }).await?,
        };
        Dashboard::Admin {
            stats,
            recent_users: state.users.list_users(Some(RECENT_LIMIT)).await?,
            recent_trips: views(
                state
                    .trips
                    .find_trips(&everything, &SortKey::default_order(), Some(RECENT_LIMIT))
                    .await?,
            ),
        }
    } else {
        let own = TripFilter { created_by: Some(claims.sub), ..Default::default() };
        let trips = state.trips.find_trips(&own, &SortKey::default_order(), None).await?;
        let stats = OwnStats {
            total_trips: trips.len() as u64,
            active_trips: trips.iter().filter(|t| t.active).count() as u64,
            featured_trips: trips.iter().filter(|t| t.featured).count() as u64,
        };
        Dashboard::Own { stats, my_trips: views(trips) }
    };

    Ok(ApiResponse::ok(data))
}
