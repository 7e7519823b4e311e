//! Plan model: a purchasable offer for one visa type.

use fgvistos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `plans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plan {
    pub id: DbId,
    pub visa_type_id: DbId,
    pub name: String,
    pub description: Option<String>,
    /// Price per applicant slot, in cents.
    pub price_cents: i64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a plan.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlan {
    pub visa_type_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
}
