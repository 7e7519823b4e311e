//! Canonical role names and parsing.
//!
//! The stored role names must match the seed data in
//! `20260301000001_create_roles_and_users.sql`. Parsing is case-insensitive
//! so `"Admin"` and `"admin"` resolve to the same role; anything that does
//! not resolve is treated as having no privileges at all.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_CLIENT: &str = "client";

/// Legacy name for the staff role still found in older accounts.
pub const ROLE_EMPLOYEE_ALIAS: &str = "employee";

/// Seeded `roles.id` values.
pub const ROLE_ID_ADMIN: DbId = 1;
pub const ROLE_ID_STAFF: DbId = 2;
pub const ROLE_ID_CLIENT: DbId = 3;

/// Role of an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Staff,
    Admin,
}

impl Role {
    /// Parse a role name, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for unknown names. Callers must treat `None` as
    /// access denied.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            ROLE_ADMIN => Some(Self::Admin),
            ROLE_STAFF | ROLE_EMPLOYEE_ALIAS => Some(Self::Staff),
            ROLE_CLIENT => Some(Self::Client),
            _ => None,
        }
    }

    /// Canonical lowercase name, as stored in the `roles` table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Staff => ROLE_STAFF,
            Self::Client => ROLE_CLIENT,
        }
    }

    /// The seeded `roles.id` for this role.
    pub fn id(self) -> DbId {
        match self {
            Self::Admin => ROLE_ID_ADMIN,
            Self::Staff => ROLE_ID_STAFF,
            Self::Client => ROLE_ID_CLIENT,
        }
    }

    /// Staff and admins have cross-tenant access.
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Staff | Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
