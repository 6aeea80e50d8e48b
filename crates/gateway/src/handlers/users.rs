//! User management handlers
//!
//! Reserved for superusers, except that any user may fetch their own
//! record. Passwords and sessions are handled by the external auth
//! system; users here carry identity and role only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use pressroom_common::{
    auth::AuthContext,
    db::models::User,
    errors::{AppError, Result},
    workflow::{permissions, Role},
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

fn parse_role(s: &str) -> Result<Role> {
    Role::parse(s).ok_or_else(|| AppError::Validation {
        message: format!("Unknown role '{}'", s),
        field: Some("role".to_string()),
    })
}

/// Create a user (superuser only)
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    if !permissions::can_manage_users(auth.role) {
        return Err(AppError::PermissionDenied {
            message: "Only superusers may manage users".to_string(),
        });
    }

    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let role = parse_role(&request.role)?;
    let user = state
        .repo
        .create_user(request.name, request.email, role)
        .await?;

    tracing::info!(user_id = %user.id, role = %role, "User created");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Fetch a user record (self or superuser)
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>> {
    if user_id != auth.user_id && !permissions::can_manage_users(auth.role) {
        return Err(AppError::PermissionDenied {
            message: "You may only view your own user record".to_string(),
        });
    }

    let user = state
        .repo
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound {
            id: user_id.to_string(),
        })?;

    Ok(Json(user.into()))
}

/// Change a user's role (superuser only)
pub async fn update_user_role(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>> {
    if !permissions::can_manage_users(auth.role) {
        return Err(AppError::PermissionDenied {
            message: "Only superusers may manage users".to_string(),
        });
    }

    let role = parse_role(&request.role)?;
    let user = state.repo.update_user_role(user_id, role).await?;

    tracing::info!(user_id = %user.id, role = %role, "User role updated");

    Ok(Json(user.into()))
}
