//! Route definitions for visa types and plans.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{plan, visa_type};
use crate::state::AppState;

/// Routes mounted at `/visa-types`.
///
/// ```text
/// GET  /                       -> list (public)
/// POST /                       -> create (admin)
/// GET  /{id}                   -> get (public)
/// PUT  /{id}/form-questions    -> update_form_questions (admin)
/// ```
pub fn visa_type_router() -> Router<AppState> {
    Router::new()
        .route("/", get(visa_type::list).post(visa_type::create))
        .route("/{id}", get(visa_type::get))
        .route("/{id}/form-questions", put(visa_type::update_form_questions))
}

/// Routes mounted at `/plans`.
///
/// ```text
/// GET  /                     -> list (public)
/// POST /                     -> create (admin)
/// GET  /{id}                 -> get (public)
/// GET  /{id}/form-questions  -> form_questions (public)
/// ```
pub fn plan_router() -> Router<AppState> {
    Router::new()
        .route("/", get(plan::list).post(plan::create))
        .route("/{id}", get(plan::get))
        .route("/{id}/form-questions", get(plan::form_questions))
}
