//! Route definitions for applicants, their forms and attachments.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{applicant, attachment, form};
use crate::state::AppState;

/// Routes mounted at `/applicants`.
///
/// ```text
/// GET    /                      -> list
/// GET    /{id}                  -> get
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete (staff)
/// GET    /{id}/form             -> form::get_form
/// PUT    /{id}/form             -> form::save_form
/// POST   /{id}/form/submit      -> form::submit_form
/// PUT    /{id}/status           -> update_status (staff)
/// GET    /{id}/attachments      -> list_attachments
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(applicant::list))
        .route(
            "/{id}",
            get(applicant::get)
                .put(applicant::update)
                .delete(applicant::delete),
        )
        .route("/{id}/form", get(form::get_form).put(form::save_form))
        .route("/{id}/form/submit", post(form::submit_form))
        .route("/{id}/status", put(applicant::update_status))
        .route("/{id}/attachments", get(applicant::list_attachments))
}

/// Routes mounted at `/attachments`.
///
/// The upload route lifts axum's default body limit; the handler enforces
/// the configured maximum while streaming the file field.
///
/// ```text
/// POST   /                 -> upload (multipart)
/// PUT    /{id}/passport    -> designate_passport
/// DELETE /{id}             -> delete
/// ```
pub fn attachment_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(attachment::upload).layer(DefaultBodyLimit::disable()),
        )
        .route("/{id}/passport", put(attachment::designate_passport))
        .route("/{id}", delete(attachment::delete))
}
