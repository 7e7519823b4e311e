//! Shared response envelope types for API handlers.
//!
//! All successful API responses use a `{ "data": ..., "status": ... }`
//! envelope; errors use `{ "error": ..., "code": ..., "status": ... }`
//! (see [`crate::error::AppError`]).

use axum::http::StatusCode;
use serde::Serialize;

/// Standard `{ "data": T, "status": u16 }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse::ok(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
    pub status: u16,
}

impl<T: Serialize> DataResponse<T> {
    /// Envelope for a `200 OK` response.
    pub fn ok(data: T) -> Self {
        Self::with_status(StatusCode::OK, data)
    }

    /// Envelope for a `201 Created` response.
    pub fn created(data: T) -> Self {
        Self::with_status(StatusCode::CREATED, data)
    }

    pub fn with_status(status: StatusCode, data: T) -> Self {
        Self {
            data,
            status: status.as_u16(),
        }
    }
}
