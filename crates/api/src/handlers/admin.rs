//! Handlers for the `/admin` resource (user management).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use axum::extract::{Path, State};
use axum::Json;
use fgvistos_core::error::CoreError;
use fgvistos_core::roles::Role;
use fgvistos_core::types::DbId;
use fgvistos_db::models::user::UserResponse;
use fgvistos_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    /// `client`, `staff` (or `employee`) or `admin`, any case.
    pub role: String,
}

/// GET /api/v1/admin/users
///
/// List all users with resolved role names.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;

    // Pre-fetch all roles to avoid N+1 queries.
    let roles = RoleRepo::list(&state.pool).await?;

    let responses = users
        .iter()
        .map(|u| {
            let role_name = roles
                .iter()
                .find(|r| r.id == u.role_id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| "unknown".to_string());
            UserResponse::from_user(u, role_name)
        })
        .collect();

    Ok(Json(DataResponse::ok(responses)))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// Change a user's role. The user's refresh sessions are revoked so the new
/// role is picked up at the next login.
pub async fn update_user_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let role = Role::parse(&input.role).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown role '{}'. Must be one of: client, staff, admin",
            input.role
        )))
    })?;

    if id == admin.user_id && role != Role::Admin {
        return Err(AppError::Core(CoreError::Conflict(
            "Admins cannot remove their own admin role".into(),
        )));
    }

    let user = UserRepo::update_role(&state.pool, id, role.id())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    SessionRepo::revoke_all_for_user(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, admin_id = admin.user_id, role = %role, "Changed user role");

    Ok(Json(DataResponse::ok(UserResponse::from_user(
        &user,
        role.as_str().to_string(),
    ))))
}
