//! Handlers for the `/visa-types` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fgvistos_core::error::CoreError;
use fgvistos_core::form::{validate_schema, FormQuestions};
use fgvistos_core::types::DbId;
use fgvistos_db::models::visa_type::{CreateVisaType, VisaType};
use fgvistos_db::repositories::VisaTypeRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /visa-types`.
#[derive(Debug, Deserialize)]
pub struct CreateVisaTypeRequest {
    pub name: String,
    pub description: Option<String>,
    pub form_questions: Option<serde_json::Value>,
}

/// GET /api/v1/visa-types
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<VisaType>>>> {
    let items = VisaTypeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::ok(items)))
}

/// GET /api/v1/visa-types/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<VisaType>>> {
    let visa_type = VisaTypeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VisaType",
            id,
        }))?;
    Ok(Json(DataResponse::ok(visa_type)))
}

/// POST /api/v1/visa-types
///
/// Admin only. A supplied form schema is validated before it is stored.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateVisaTypeRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<VisaType>>)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Visa type name must not be empty".into(),
        )));
    }
    if let Some(doc) = &input.form_questions {
        check_form_questions(doc)?;
    }

    let visa_type = VisaTypeRepo::create(
        &state.pool,
        &CreateVisaType {
            name: name.to_string(),
            description: input.description,
            form_questions: input.form_questions,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::created(visa_type))))
}

/// PUT /api/v1/visa-types/{id}/form-questions
///
/// Admin only. Replaces the whole form schema. Existing answers are kept;
/// answers for removed fields simply stop counting towards progress.
pub async fn update_form_questions(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(doc): Json<serde_json::Value>,
) -> AppResult<Json<DataResponse<VisaType>>> {
    check_form_questions(&doc)?;

    let visa_type = VisaTypeRepo::update_form_questions(&state.pool, id, &doc)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "VisaType",
            id,
        }))?;
    tracing::info!(visa_type_id = id, "Replaced form questions");

    Ok(Json(DataResponse::ok(visa_type)))
}

fn check_form_questions(doc: &serde_json::Value) -> AppResult<()> {
    let schema = FormQuestions::from_value(doc)?;
    validate_schema(&schema)?;
    Ok(())
}
