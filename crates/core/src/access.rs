//! Ownership gate.
//!
//! Decides whether a caller may act on a resource owned by some identity.
//! The decision table is small:
//!
//! | caller role    | owns resource | allowed |
//! |----------------|---------------|---------|
//! | staff / admin  | any           | yes     |
//! | client         | yes           | yes     |
//! | client         | no            | no      |
//! | unrecognized   | any           | no      |
//!
//! These functions never touch storage. Callers load the resource first,
//! pass its owner in, and only perform the read/write once the gate returns
//! `Ok`.

use serde::Serialize;

use crate::error::CoreError;
use crate::roles::Role;
use crate::types::DbId;

/// Operation requested on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Read,
    Write,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }
}

/// Resolve a raw role claim into a [`Role`], rejecting unknown names.
pub fn resolve_role(role: &str) -> Result<Role, CoreError> {
    Role::parse(role).ok_or_else(|| {
        CoreError::Forbidden(format!("Role '{role}' is not permitted to perform this action"))
    })
}

/// Authorize `action` by `caller_id` on a resource owned by `owner_id`.
///
/// Returns the resolved role on success so callers can branch on it
/// (e.g. staff-only fields) without parsing twice.
pub fn authorize(
    role: &str,
    caller_id: DbId,
    owner_id: DbId,
    action: Action,
) -> Result<Role, CoreError> {
    let role = resolve_role(role)?;
    if role.is_staff() || caller_id == owner_id {
        return Ok(role);
    }
    Err(CoreError::Forbidden(format!(
        "Not permitted to {} a resource owned by another account",
        action.as_str()
    )))
}

/// Authorize against a resource that may not exist.
///
/// A missing resource is reported as `NotFound` before any ownership
/// decision is made.
pub fn authorize_resource(
    role: &str,
    caller_id: DbId,
    owner_id: Option<DbId>,
    action: Action,
    entity: &'static str,
    id: DbId,
) -> Result<Role, CoreError> {
    let owner_id = owner_id.ok_or(CoreError::NotFound { entity, id })?;
    authorize(role, caller_id, owner_id, action)
}

/// Require the staff or admin role.
pub fn require_staff(role: &str) -> Result<Role, CoreError> {
    let resolved = resolve_role(role)?;
    if resolved.is_staff() {
        Ok(resolved)
    } else {
        Err(CoreError::Forbidden("Staff or Admin role required".into()))
    }
}

/// Require the admin role.
pub fn require_admin(role: &str) -> Result<Role, CoreError> {
    match resolve_role(role)? {
        Role::Admin => Ok(Role::Admin),
        _ => Err(CoreError::Forbidden("Admin role required".into())),
    }
}
