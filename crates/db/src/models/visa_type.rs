//! Visa type model. Each visa type owns the form-questions document that
//! drives its application form.

use fgvistos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `visa_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VisaType {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub form_questions: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a visa type.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVisaType {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to an empty document when omitted.
    pub form_questions: Option<serde_json::Value>,
}
