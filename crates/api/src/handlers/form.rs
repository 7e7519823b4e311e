//! Handlers for an applicant's visa form: reading, saving and submitting
//! answers.

use axum::extract::{Path, State};
use axum::Json;
use fgvistos_core::access::Action;
use fgvistos_core::error::CoreError;
use fgvistos_core::form::{
    decode_stored_answers, encode_stored_answers, parse_answers, validate_answers_against,
    AnswerValue, FormAnswers, FormQuestions,
};
use fgvistos_core::progress::{evaluate_document, FormProgress};
use fgvistos_core::status::FormStatus;
use fgvistos_core::types::DbId;
use fgvistos_db::models::applicant::Applicant;
use fgvistos_db::repositories::ApplicantRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::applicant::load_authorized;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Questions, stored answers and computed progress for one applicant.
#[derive(Debug, Serialize)]
pub struct FormView {
    pub applicant_id: DbId,
    pub form_status: String,
    pub form_questions: serde_json::Value,
    pub answers: FormAnswers,
    pub progress: FormProgress,
}

/// Request body for `PUT /applicants/{id}/form`.
///
/// Answers are merged into the stored ones; a `null` value clears a field.
#[derive(Debug, Deserialize)]
pub struct SaveFormRequest {
    pub answers: serde_json::Value,
}

async fn load_questions(state: &AppState, applicant_id: DbId) -> AppResult<serde_json::Value> {
    ApplicantRepo::find_form_questions(&state.pool, applicant_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Applicant",
            id: applicant_id,
        }))
}

fn stored_answers(applicant: &Applicant) -> AppResult<FormAnswers> {
    decode_stored_answers(&applicant.form_answers).map_err(|e| {
        AppError::InternalError(format!(
            "Applicant {} has unreadable answers: {e}",
            applicant.id
        ))
    })
}

fn current_status(applicant: &Applicant) -> AppResult<FormStatus> {
    FormStatus::from_str_value(&applicant.form_status)
        .map_err(|e| AppError::InternalError(e.to_string()))
}

fn form_view(applicant: Applicant, questions: serde_json::Value, answers: FormAnswers) -> FormView {
    let progress = evaluate_document(&questions, &answers);
    FormView {
        applicant_id: applicant.id,
        form_status: applicant.form_status,
        form_questions: questions,
        answers,
        progress,
    }
}

/// Apply `incoming` on top of `stored`. `Null` removes the key.
fn merge_answers(mut stored: FormAnswers, incoming: FormAnswers) -> FormAnswers {
    for (field_id, value) in incoming.0 {
        match value {
            AnswerValue::Null => {
                stored.0.remove(&field_id);
            }
            value => stored.insert(field_id, value),
        }
    }
    stored
}

/// GET /api/v1/applicants/{id}/form
pub async fn get_form(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FormView>>> {
    let applicant = load_authorized(&state, &user, id, Action::Read).await?;
    let questions = load_questions(&state, id).await?;
    let answers = stored_answers(&applicant)?;
    Ok(Json(DataResponse::ok(form_view(applicant, questions, answers))))
}

/// PUT /api/v1/applicants/{id}/form
///
/// Clients may save while the form is `not_started` or `in_progress`; the
/// first non-empty save moves it to `in_progress`. Staff may save at any
/// status without changing it.
pub async fn save_form(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<SaveFormRequest>,
) -> AppResult<Json<DataResponse<FormView>>> {
    let applicant = load_authorized(&state, &user, id, Action::Write).await?;
    let questions = load_questions(&state, id).await?;

    let incoming = parse_answers(&input.answers)?;
    let schema = FormQuestions::from_value(&questions)?;
    validate_answers_against(&schema, &incoming)?;

    let merged = merge_answers(stored_answers(&applicant)?, incoming);
    let status = current_status(&applicant)?;
    let next_status = if user.is_staff() {
        status
    } else {
        status.after_client_save(merged.has_any_answer())?
    };

    let updated = ApplicantRepo::save_answers(
        &state.pool,
        id,
        &encode_stored_answers(&merged),
        next_status.as_str(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Applicant",
        id,
    }))?;

    if next_status != status {
        tracing::info!(
            applicant_id = id,
            from = %status,
            to = %next_status,
            "Form status advanced on save"
        );
    }
    Ok(Json(DataResponse::ok(form_view(updated, questions, merged))))
}

/// POST /api/v1/applicants/{id}/form/submit
///
/// Finalize the form. Every required field (including visible dependent
/// fields) must be answered.
pub async fn submit_form(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FormView>>> {
    let applicant = load_authorized(&state, &user, id, Action::Write).await?;
    let questions = load_questions(&state, id).await?;
    let answers = stored_answers(&applicant)?;

    let progress = evaluate_document(&questions, &answers);
    let next_status = current_status(&applicant)?.submit(progress.is_complete())?;

    let updated = ApplicantRepo::update_status(&state.pool, id, Some(next_status.as_str()), None)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Applicant",
            id,
        }))?;
    tracing::info!(applicant_id = id, user_id = user.user_id, "Form submitted");

    Ok(Json(DataResponse::ok(form_view(updated, questions, answers))))
}
