//! Handlers for applicant document uploads.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use fgvistos_core::access::Action;
use fgvistos_core::error::CoreError;
use fgvistos_core::types::DbId;
use fgvistos_core::upload::{sanitize_file_name, storage_key, validate_upload, DocumentType};
use fgvistos_db::models::attachment::{Attachment, CreateAttachment};
use fgvistos_db::repositories::{ApplicantRepo, AttachmentRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::applicant::{load_authorized, ApplicantResponse};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage;

/// A file part read from the multipart body.
struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Request body for `PUT /attachments/{id}/passport`.
#[derive(Debug, Deserialize)]
pub struct DesignatePassportRequest {
    /// When false, clears the designation if it points at this attachment.
    #[serde(default = "default_true")]
    pub designate: bool,
}

fn default_true() -> bool {
    true
}

fn too_large(max_bytes: usize) -> AppError {
    AppError::Core(CoreError::Validation(format!(
        "File exceeds the maximum size of {} MB",
        max_bytes / (1024 * 1024)
    )))
}

async fn load_authorized_attachment(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
    action: Action,
) -> AppResult<Attachment> {
    let attachment = AttachmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Attachment",
            id,
        }))?;
    load_authorized(state, user, attachment.applicant_id, action).await?;
    Ok(attachment)
}

/// POST /api/v1/attachments
///
/// Multipart form with `applicant_id`, `document_type` (`passport` or
/// `other`, default `other`) and `file`. Access is checked as soon as
/// `applicant_id` arrives, so a foreign upload is refused before its file
/// part is read. The file is size-checked while it streams in, then stored
/// before its row is written; if the row cannot be written the stored
/// object is removed again.
pub async fn upload(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Attachment>>)> {
    let max_bytes = state.config.storage.max_upload_bytes;
    let mut applicant_id: Option<DbId> = None;
    let mut document_type = DocumentType::Other;
    let mut file: Option<UploadedFile> = None;
    let mut authorized = false;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "applicant_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let id = text.trim().parse::<DbId>().map_err(|_| {
                    AppError::Core(CoreError::Validation(format!(
                        "Invalid applicant_id '{text}'"
                    )))
                })?;
                // Gate before the file part is read when the id comes first.
                load_authorized(&state, &user, id, Action::Write).await?;
                applicant_id = Some(id);
                authorized = true;
            }
            "document_type" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                document_type = DocumentType::from_str_value(text.trim())?;
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(str::to_string);
                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                {
                    if bytes.len() + chunk.len() > max_bytes {
                        return Err(too_large(max_bytes));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let applicant_id = applicant_id.ok_or_else(|| {
        AppError::Core(CoreError::Validation("Missing required 'applicant_id' field".into()))
    })?;
    let file = file.ok_or_else(|| {
        AppError::Core(CoreError::Validation("Missing required 'file' field".into()))
    })?;

    if !authorized {
        load_authorized(&state, &user, applicant_id, Action::Write).await?;
    }

    let (ext, content_type) = validate_upload(
        &file.file_name,
        file.content_type.as_deref(),
        file.bytes.len(),
        max_bytes,
    )?;
    let key = storage_key(applicant_id, &ext);

    state
        .storage
        .put(&key, &file.bytes, content_type)
        .await
        .map_err(|e| AppError::BadGateway(format!("Failed to store upload: {e}")))?;

    let input = CreateAttachment {
        applicant_id,
        document_type: document_type.as_str().to_string(),
        file_name: sanitize_file_name(&file.file_name),
        content_type: content_type.to_string(),
        size_bytes: file.bytes.len() as i64,
        storage_key: key.clone(),
        uploaded_by: Some(user.user_id),
    };

    let attachment = match AttachmentRepo::create(&state.pool, &input).await {
        Ok(a) => a,
        Err(e) => {
            storage::delete_best_effort(state.storage.as_ref(), &[key]).await;
            return Err(e.into());
        }
    };
    tracing::info!(
        attachment_id = attachment.id,
        applicant_id,
        document_type = document_type.as_str(),
        size_bytes = attachment.size_bytes,
        "Attachment uploaded"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::created(attachment))))
}

/// PUT /api/v1/attachments/{id}/passport
///
/// Make this attachment the applicant's passport (or clear it).
pub async fn designate_passport(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<DesignatePassportRequest>,
) -> AppResult<Json<DataResponse<ApplicantResponse>>> {
    let attachment = load_authorized_attachment(&state, &user, id, Action::Write).await?;
    let applicant_id = attachment.applicant_id;

    let target = if input.designate {
        Some(attachment.id)
    } else {
        let applicant = ApplicantRepo::find_by_id(&state.pool, applicant_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Applicant",
                id: applicant_id,
            }))?;
        if applicant.passport_attachment_id == Some(attachment.id) {
            None
        } else {
            applicant.passport_attachment_id
        }
    };

    let applicant = ApplicantRepo::set_passport(&state.pool, applicant_id, target)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Applicant",
            id: applicant_id,
        }))?;
    Ok(Json(DataResponse::ok(applicant.into())))
}

/// DELETE /api/v1/attachments/{id}
///
/// Removes the row (clearing the passport designation if it pointed here)
/// and then the stored object. Returns 204.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    load_authorized_attachment(&state, &user, id, Action::Write).await?;

    let removed = AttachmentRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Attachment",
            id,
        }))?;
    storage::delete_best_effort(state.storage.as_ref(), &[removed.storage_key]).await;
    tracing::info!(attachment_id = id, applicant_id = removed.applicant_id, "Attachment deleted");

    Ok(StatusCode::NO_CONTENT)
}
