//! Order model: a purchase of N applicant slots under one plan.

use fgvistos_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub user_id: DbId,
    pub plan_id: DbId,
    pub applicant_count: i32,
    /// `pending` or `paid`; see [`fgvistos_core::status::PaymentStatus`].
    pub payment_status: String,
    /// Opaque gateway payload recorded with the last payment transition.
    pub payment_details: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for placing an order. One applicant row is created per name; the
/// first name becomes the responsible (paying) applicant.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub user_id: DbId,
    pub plan_id: DbId,
    pub applicant_names: Vec<String>,
}
