//! Role-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement with 403. Role names are parsed case-insensitively;
//! unrecognised roles are always rejected.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fgvistos_core::access;
use fgvistos_core::roles::Role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        access::require_admin(&user.role)?;
        Ok(RequireAdmin(user))
    }
}

/// Requires `staff` or `admin` (the `employee` alias counts as staff).
pub struct RequireStaff(pub AuthUser, pub Role);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let role = access::require_staff(&user.role)?;
        Ok(RequireStaff(user, role))
    }
}

/// Requires any authenticated caller whose role is recognised.
///
/// Unlike a bare [`AuthUser`], a token with an unknown role is turned away
/// here instead of at the first ownership check.
pub struct RequireAuth(pub AuthUser, pub Role);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let role = access::resolve_role(&user.role)?;
        Ok(RequireAuth(user, role))
    }
}
