//! Attachment model: a stored document belonging to one applicant.

use fgvistos_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `attachments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attachment {
    pub id: DbId,
    pub applicant_id: DbId,
    /// `passport` or `other`.
    pub document_type: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub uploaded_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for recording an uploaded attachment.
#[derive(Debug, Clone)]
pub struct CreateAttachment {
    pub applicant_id: DbId,
    pub document_type: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub uploaded_by: Option<DbId>,
}
