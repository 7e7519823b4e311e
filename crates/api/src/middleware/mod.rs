//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller identity from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.
//! - [`rbac::RequireStaff`] -- requires `staff` or `admin`.
//! - [`rbac::RequireAuth`] -- any authenticated caller with a known role.

pub mod auth;
pub mod rbac;
