//! Repository for the `visa_types` table.

use fgvistos_core::types::DbId;
use sqlx::PgPool;

use crate::models::visa_type::{CreateVisaType, VisaType};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, form_questions, created_at, updated_at";

/// Provides CRUD operations for visa types.
pub struct VisaTypeRepo;

impl VisaTypeRepo {
    /// Insert a new visa type, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateVisaType) -> Result<VisaType, sqlx::Error> {
        let query = format!(
            "INSERT INTO visa_types (name, description, form_questions)
             VALUES ($1, $2, COALESCE($3, '{{\"sections\": []}}'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VisaType>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.form_questions)
            .fetch_one(pool)
            .await
    }

    /// Find a visa type by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VisaType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM visa_types WHERE id = $1");
        sqlx::query_as::<_, VisaType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all visa types ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<VisaType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM visa_types ORDER BY name ASC");
        sqlx::query_as::<_, VisaType>(&query).fetch_all(pool).await
    }

    /// Replace the form-questions document.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_form_questions(
        pool: &PgPool,
        id: DbId,
        form_questions: &serde_json::Value,
    ) -> Result<Option<VisaType>, sqlx::Error> {
        let query = format!(
            "UPDATE visa_types SET form_questions = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VisaType>(&query)
            .bind(id)
            .bind(form_questions)
            .fetch_optional(pool)
            .await
    }
}
