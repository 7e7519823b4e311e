//! Query-string parameter types shared by list handlers.

use fgvistos_core::types::DbId;
use serde::Deserialize;

/// `?include_inactive=true` on catalogue listings.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Filters for `GET /applicants`.
///
/// `user_id` is honoured for staff only; clients always see their own.
/// Status values are validated before they reach the repository.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicantListParams {
    pub user_id: Option<DbId>,
    pub order_id: Option<DbId>,
    pub form_status: Option<String>,
    pub process_status: Option<String>,
}
