//! Repository for the `plans` table.

use fgvistos_core::types::DbId;
use sqlx::PgPool;

use crate::models::plan::{CreatePlan, Plan};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, visa_type_id, name, description, price_cents, is_active, created_at, updated_at";

/// Provides CRUD operations for plans.
pub struct PlanRepo;

impl PlanRepo {
    /// Insert a new plan, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreatePlan) -> Result<Plan, sqlx::Error> {
        let query = format!(
            "INSERT INTO plans (visa_type_id, name, description, price_cents)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plan>(&query)
            .bind(input.visa_type_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price_cents)
            .fetch_one(pool)
            .await
    }

    /// Find a plan by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Plan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plans WHERE id = $1");
        sqlx::query_as::<_, Plan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List plans, cheapest first. Inactive plans are skipped unless requested.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Plan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM plans
             WHERE is_active OR $1
             ORDER BY price_cents ASC, id ASC"
        );
        sqlx::query_as::<_, Plan>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    /// Resolve the form-questions document of a plan's visa type.
    ///
    /// Returns `None` when the plan does not exist.
    pub async fn find_form_questions(
        pool: &PgPool,
        plan_id: DbId,
    ) -> Result<Option<serde_json::Value>, sqlx::Error> {
        let row: Option<(serde_json::Value,)> = sqlx::query_as(
            "SELECT v.form_questions
             FROM plans p
             JOIN visa_types v ON v.id = p.visa_type_id
             WHERE p.id = $1",
        )
        .bind(plan_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(doc,)| doc))
    }
}
