//! Repository for the `applicants` table.

use fgvistos_core::types::DbId;
use sqlx::PgPool;

use crate::models::applicant::{Applicant, ApplicantFilter, UpdateApplicant};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, order_id, is_responsible, name, form_answers, \
                        form_status, process_status, passport_attachment_id, \
                        created_at, updated_at";

/// Provides CRUD operations for applicants.
///
/// There is no method that changes `user_id`; the column is also guarded
/// by a trigger.
pub struct ApplicantRepo;

impl ApplicantRepo {
    /// Find an applicant by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Applicant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM applicants WHERE id = $1");
        sqlx::query_as::<_, Applicant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List applicants matching every filter that is set.
    pub async fn list(
        pool: &PgPool,
        filter: &ApplicantFilter,
    ) -> Result<Vec<Applicant>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM applicants
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::BIGINT IS NULL OR order_id = $2)
               AND ($3::TEXT IS NULL OR form_status = $3)
               AND ($4::TEXT IS NULL OR process_status = $4)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Applicant>(&query)
            .bind(filter.user_id)
            .bind(filter.order_id)
            .bind(&filter.form_status)
            .bind(&filter.process_status)
            .fetch_all(pool)
            .await
    }

    /// Update editable fields. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateApplicant,
    ) -> Result<Option<Applicant>, sqlx::Error> {
        let query = format!(
            "UPDATE applicants SET name = COALESCE($2, name) WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Applicant>(&query)
            .bind(id)
            .bind(&input.name)
            .fetch_optional(pool)
            .await
    }

    /// Replace the stored answers envelope and set the form status.
    pub async fn save_answers(
        pool: &PgPool,
        id: DbId,
        form_answers: &serde_json::Value,
        form_status: &str,
    ) -> Result<Option<Applicant>, sqlx::Error> {
        let query = format!(
            "UPDATE applicants SET form_answers = $2, form_status = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Applicant>(&query)
            .bind(id)
            .bind(form_answers)
            .bind(form_status)
            .fetch_optional(pool)
            .await
    }

    /// Set the form and/or process status. `None` leaves a column untouched.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        form_status: Option<&str>,
        process_status: Option<&str>,
    ) -> Result<Option<Applicant>, sqlx::Error> {
        let query = format!(
            "UPDATE applicants SET
                form_status = COALESCE($2, form_status),
                process_status = COALESCE($3, process_status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Applicant>(&query)
            .bind(id)
            .bind(form_status)
            .bind(process_status)
            .fetch_optional(pool)
            .await
    }

    /// Designate (or clear, with `None`) the applicant's passport attachment.
    pub async fn set_passport(
        pool: &PgPool,
        id: DbId,
        attachment_id: Option<DbId>,
    ) -> Result<Option<Applicant>, sqlx::Error> {
        let query = format!(
            "UPDATE applicants SET passport_attachment_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Applicant>(&query)
            .bind(id)
            .bind(attachment_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an applicant and its attachment rows in one transaction.
    ///
    /// Returns the storage keys of the removed attachments so the caller can
    /// delete the objects, or `None` if the applicant does not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let cleared = sqlx::query("UPDATE applicants SET passport_attachment_id = NULL WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if cleared.rows_affected() == 0 {
            return Ok(None);
        }

        let keys: Vec<(String,)> =
            sqlx::query_as("DELETE FROM attachments WHERE applicant_id = $1 RETURNING storage_key")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM applicants WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(keys.into_iter().map(|(k,)| k).collect()))
    }

    /// Resolve the form-questions document for an applicant through its
    /// order, plan and visa type.
    ///
    /// Returns `None` when the applicant does not exist.
    pub async fn find_form_questions(
        pool: &PgPool,
        applicant_id: DbId,
    ) -> Result<Option<serde_json::Value>, sqlx::Error> {
        let row: Option<(serde_json::Value,)> = sqlx::query_as(
            "SELECT v.form_questions
             FROM applicants a
             JOIN orders o ON o.id = a.order_id
             JOIN plans p ON p.id = o.plan_id
             JOIN visa_types v ON v.id = p.visa_type_id
             WHERE a.id = $1",
        )
        .bind(applicant_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|(doc,)| doc))
    }
}
