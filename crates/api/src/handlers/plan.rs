//! Handlers for the `/plans` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use fgvistos_core::error::CoreError;
use fgvistos_core::types::DbId;
use fgvistos_db::models::plan::{CreatePlan, Plan};
use fgvistos_db::repositories::PlanRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /plans`.
#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub visa_type_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
}

/// GET /api/v1/plans
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<Json<DataResponse<Vec<Plan>>>> {
    let plans = PlanRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse::ok(plans)))
}

/// GET /api/v1/plans/{id}
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Plan>>> {
    let plan = PlanRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Plan", id }))?;
    Ok(Json(DataResponse::ok(plan)))
}

/// POST /api/v1/plans
///
/// Admin only. An unknown `visa_type_id` is rejected with 400.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreatePlanRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Plan>>)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Plan name must not be empty".into(),
        )));
    }
    if input.price_cents <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Plan price must be positive".into(),
        )));
    }

    let plan = PlanRepo::create(
        &state.pool,
        &CreatePlan {
            visa_type_id: input.visa_type_id,
            name: name.to_string(),
            description: input.description,
            price_cents: input.price_cents,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::created(plan))))
}

/// GET /api/v1/plans/{id}/form-questions
///
/// The form schema of the plan's visa type.
pub async fn form_questions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let doc = PlanRepo::find_form_questions(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Plan", id }))?;
    Ok(Json(DataResponse::ok(doc)))
}
