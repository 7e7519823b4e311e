//! Repository for the `attachments` table.

use fgvistos_core::types::DbId;
use fgvistos_core::upload::DocumentType;
use sqlx::PgPool;

use crate::models::attachment::{Attachment, CreateAttachment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, applicant_id, document_type, file_name, content_type, \
                        size_bytes, storage_key, uploaded_by, created_at";

/// Provides CRUD operations for attachments.
pub struct AttachmentRepo;

impl AttachmentRepo {
    /// Record an uploaded attachment.
    ///
    /// A `passport` attachment also becomes the applicant's designated
    /// passport, in the same transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAttachment,
    ) -> Result<Attachment, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO attachments
                (applicant_id, document_type, file_name, content_type, size_bytes,
                 storage_key, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let attachment = sqlx::query_as::<_, Attachment>(&query)
            .bind(input.applicant_id)
            .bind(&input.document_type)
            .bind(&input.file_name)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .bind(&input.storage_key)
            .bind(input.uploaded_by)
            .fetch_one(&mut *tx)
            .await?;

        if attachment.document_type == DocumentType::Passport.as_str() {
            sqlx::query("UPDATE applicants SET passport_attachment_id = $2 WHERE id = $1")
                .bind(attachment.applicant_id)
                .bind(attachment.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(attachment)
    }

    /// Find an attachment by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Attachment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attachments WHERE id = $1");
        sqlx::query_as::<_, Attachment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an applicant's attachments, oldest first.
    pub async fn list_by_applicant(
        pool: &PgPool,
        applicant_id: DbId,
    ) -> Result<Vec<Attachment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attachments WHERE applicant_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Attachment>(&query)
            .bind(applicant_id)
            .fetch_all(pool)
            .await
    }

    /// Delete an attachment row, clearing any passport designation pointing
    /// at it. Returns the deleted row so the caller can remove the object.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Attachment>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE applicants SET passport_attachment_id = NULL WHERE passport_attachment_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let query = format!("DELETE FROM attachments WHERE id = $1 RETURNING {COLUMNS}");
        let deleted = sqlx::query_as::<_, Attachment>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(deleted)
    }
}
