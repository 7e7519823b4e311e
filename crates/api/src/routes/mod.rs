pub mod admin;
pub mod applicant;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod order;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register, /auth/login, /auth/refresh      public
/// /auth/logout                                    authenticated
/// /me                                             authenticated
///
/// /admin/users                                    list (admin)
/// /admin/users/{id}/role                          change role (admin)
///
/// /visa-types, /visa-types/{id}                   catalogue (public read, admin write)
/// /visa-types/{id}/form-questions                 replace form schema (admin)
/// /plans, /plans/{id}                             catalogue (public read, admin write)
/// /plans/{id}/form-questions                      form schema by plan (public)
///
/// /orders                                         list, place
/// /orders/{id}                                    get
/// /orders/{id}/checkout                           create gateway checkout link
/// /orders/{id}/payment/confirm                    confirm with the gateway
/// /payments/webhook                               signed gateway callback
///
/// /applicants                                     list (own, or all for staff)
/// /applicants/{id}                                get, rename, delete (staff)
/// /applicants/{id}/form                           schema + answers + progress; save
/// /applicants/{id}/form/submit                    finalize
/// /applicants/{id}/status                         set form/process status (staff)
/// /applicants/{id}/attachments                    list documents
///
/// /attachments                                    upload (multipart)
/// /attachments/{id}/passport                      designate passport
/// /attachments/{id}                               delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(auth::me_router())
        .nest("/admin", admin::router())
        .nest("/visa-types", catalog::visa_type_router())
        .nest("/plans", catalog::plan_router())
        .nest("/orders", order::router())
        .nest("/payments", order::payment_router())
        .nest("/applicants", applicant::router())
        .nest("/attachments", applicant::attachment_router())
}
