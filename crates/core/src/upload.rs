//! Attachment upload validation and storage key naming.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default maximum upload size (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted file extensions (lowercase, without the dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "jpeg", "jpg", "png"];

/// Accepted content types.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png"];

/// Maximum length of a stored file name.
const MAX_FILE_NAME_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Document type
// ---------------------------------------------------------------------------

/// Kind of document an attachment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    Other,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passport => "passport",
            Self::Other => "other",
        }
    }

    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            "passport" => Ok(Self::Passport),
            "other" => Ok(Self::Other),
            other => Err(CoreError::Validation(format!(
                "Invalid document type '{other}'. Must be one of: passport, other"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Lowercased extension of `file_name`, if any.
pub fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Content type implied by an allowed extension.
pub fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "pdf" => Some("application/pdf"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Validate an incoming file and return its normalized extension and
/// content type.
///
/// The declared content type, when present, must be allowed and must agree
/// with the extension.
pub fn validate_upload(
    file_name: &str,
    declared_content_type: Option<&str>,
    size_bytes: usize,
    max_bytes: usize,
) -> Result<(String, &'static str), CoreError> {
    if size_bytes == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }
    if size_bytes > max_bytes {
        return Err(CoreError::Validation(format!(
            "File exceeds the maximum size of {} MB",
            max_bytes / (1024 * 1024)
        )));
    }

    let ext = file_extension(file_name)
        .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Unsupported file type. Allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

    let content_type = content_type_for_extension(&ext)
        .ok_or_else(|| CoreError::Validation(format!("Unsupported file extension '{ext}'")))?;

    if let Some(declared) = declared_content_type {
        let declared = declared.split(';').next().unwrap_or_default().trim();
        // Browsers sometimes send a generic type for drag-and-drop uploads.
        if declared != "application/octet-stream" {
            if !ALLOWED_CONTENT_TYPES.contains(&declared) {
                return Err(CoreError::Validation(format!(
                    "Unsupported content type '{declared}'"
                )));
            }
            if declared != content_type {
                return Err(CoreError::Validation(format!(
                    "Content type '{declared}' does not match file extension '.{ext}'"
                )));
            }
        }
    }

    Ok((ext, content_type))
}

/// Strip path components and unsafe characters from a client file name.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return "file".to_string();
    }
    trimmed.chars().take(MAX_FILE_NAME_LENGTH).collect()
}

/// Object storage key for a new attachment.
pub fn storage_key(applicant_id: DbId, ext: &str) -> String {
    format!("applicants/{applicant_id}/{}.{ext}", uuid::Uuid::new_v4())
}
