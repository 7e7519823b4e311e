//! Applicant model: one person's visa process.

use fgvistos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `applicants` table.
///
/// `form_answers` holds the versioned answers envelope; decode it with
/// [`fgvistos_core::form::decode_stored_answers`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Applicant {
    pub id: DbId,
    /// Owning identity. Immutable after creation.
    pub user_id: DbId,
    pub order_id: DbId,
    pub is_responsible: bool,
    pub name: String,
    pub form_answers: serde_json::Value,
    pub form_status: String,
    pub process_status: String,
    pub passport_attachment_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Fields editable by the owner or staff. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateApplicant {
    pub name: Option<String>,
}

/// Filters for [`crate::repositories::ApplicantRepo::list`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicantFilter {
    pub user_id: Option<DbId>,
    pub order_id: Option<DbId>,
    pub form_status: Option<String>,
    pub process_status: Option<String>,
}
