//! Handlers for the `/applicants` resource.
//!
//! Every handler resolves the applicant first and then runs the ownership
//! gate: a missing applicant is 404, someone else's applicant is 403.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use fgvistos_core::access::{self, Action};
use fgvistos_core::error::CoreError;
use fgvistos_core::status::{FormStatus, ProcessStatus};
use fgvistos_core::types::{DbId, Timestamp};
use fgvistos_db::models::applicant::{Applicant, ApplicantFilter, UpdateApplicant};
use fgvistos_db::models::attachment::Attachment;
use fgvistos_db::repositories::{ApplicantRepo, AttachmentRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuth, RequireStaff};
use crate::query::ApplicantListParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Applicant as returned by the API. Answers are served by `/form`.
#[derive(Debug, Serialize)]
pub struct ApplicantResponse {
    pub id: DbId,
    pub user_id: DbId,
    pub order_id: DbId,
    pub is_responsible: bool,
    pub name: String,
    pub form_status: String,
    pub process_status: String,
    pub passport_attachment_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Applicant> for ApplicantResponse {
    fn from(a: Applicant) -> Self {
        Self {
            id: a.id,
            user_id: a.user_id,
            order_id: a.order_id,
            is_responsible: a.is_responsible,
            name: a.name,
            form_status: a.form_status,
            process_status: a.process_status,
            passport_attachment_id: a.passport_attachment_id,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Request body for `PUT /applicants/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateApplicantRequest {
    pub name: Option<String>,
}

/// Request body for `PUT /applicants/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub form_status: Option<FormStatus>,
    pub process_status: Option<ProcessStatus>,
}

// ---------------------------------------------------------------------------
// Shared lookup
// ---------------------------------------------------------------------------

/// Load an applicant and run the ownership gate for `action`.
pub(crate) async fn load_authorized(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
    action: Action,
) -> AppResult<Applicant> {
    let applicant = ApplicantRepo::find_by_id(&state.pool, id).await?;
    let owner = applicant.as_ref().map(|a| a.user_id);
    if let Err(e) =
        access::authorize_resource(&user.role, user.user_id, owner, action, "Applicant", id)
    {
        if matches!(e, CoreError::Forbidden(_)) {
            tracing::warn!(
                user_id = user.user_id,
                applicant_id = id,
                action = action.as_str(),
                "Ownership gate denied access"
            );
        }
        return Err(e.into());
    }
    applicant.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Applicant",
        id,
    }))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/applicants
///
/// Clients get their own applicants; staff get everyone's, optionally
/// filtered.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user, role): RequireAuth,
    Query(params): Query<ApplicantListParams>,
) -> AppResult<Json<DataResponse<Vec<ApplicantResponse>>>> {
    if let Some(s) = &params.form_status {
        FormStatus::from_str_value(s)?;
    }
    if let Some(s) = &params.process_status {
        ProcessStatus::from_str_value(s)?;
    }

    let filter = ApplicantFilter {
        user_id: if role.is_staff() {
            params.user_id
        } else {
            Some(user.user_id)
        },
        order_id: params.order_id,
        form_status: params.form_status,
        process_status: params.process_status,
    };

    let applicants = ApplicantRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse::ok(
        applicants.into_iter().map(ApplicantResponse::from).collect(),
    )))
}

/// GET /api/v1/applicants/{id}
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ApplicantResponse>>> {
    let applicant = load_authorized(&state, &user, id, Action::Read).await?;
    Ok(Json(DataResponse::ok(applicant.into())))
}

/// PUT /api/v1/applicants/{id}
///
/// Rename an applicant. Ownership cannot be changed through this route.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateApplicantRequest>,
) -> AppResult<Json<DataResponse<ApplicantResponse>>> {
    load_authorized(&state, &user, id, Action::Write).await?;

    let name = match input.name.as_deref().map(str::trim) {
        Some("") => {
            return Err(AppError::Core(CoreError::Validation(
                "Applicant name must not be empty".into(),
            )))
        }
        other => other.map(str::to_string),
    };

    let applicant = ApplicantRepo::update(&state.pool, id, &UpdateApplicant { name })
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Applicant",
            id,
        }))?;
    Ok(Json(DataResponse::ok(applicant.into())))
}

/// DELETE /api/v1/applicants/{id}
///
/// Staff only. Removes the applicant with its attachment rows, then deletes
/// the stored files on a best-effort basis. Returns 204.
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(user, _): RequireStaff,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let keys = ApplicantRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Applicant",
            id,
        }))?;
    tracing::info!(
        applicant_id = id,
        user_id = user.user_id,
        attachments = keys.len(),
        "Deleted applicant"
    );

    storage::delete_best_effort(state.storage.as_ref(), &keys).await;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/applicants/{id}/status
///
/// Staff only. Sets the form status (any value) and/or the process status
/// (any value unless the current one is final).
pub async fn update_status(
    State(state): State<AppState>,
    RequireStaff(user, _): RequireStaff,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<ApplicantResponse>>> {
    if input.form_status.is_none() && input.process_status.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "Provide form_status and/or process_status".into(),
        )));
    }

    let applicant = ApplicantRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Applicant",
            id,
        }))?;

    let process_status = match input.process_status {
        Some(next) => {
            let current = ProcessStatus::from_str_value(&applicant.process_status)
                .map_err(|e| AppError::InternalError(e.to_string()))?;
            Some(current.transition_to(next)?)
        }
        None => None,
    };

    let updated = ApplicantRepo::update_status(
        &state.pool,
        id,
        input.form_status.map(FormStatus::as_str),
        process_status.map(ProcessStatus::as_str),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Applicant",
        id,
    }))?;

    tracing::info!(
        applicant_id = id,
        user_id = user.user_id,
        form_status = %updated.form_status,
        process_status = %updated.process_status,
        "Updated applicant status"
    );
    Ok(Json(DataResponse::ok(updated.into())))
}

/// GET /api/v1/applicants/{id}/attachments
pub async fn list_attachments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Attachment>>>> {
    load_authorized(&state, &user, id, Action::Read).await?;
    let attachments = AttachmentRepo::list_by_applicant(&state.pool, id).await?;
    Ok(Json(DataResponse::ok(attachments)))
}
