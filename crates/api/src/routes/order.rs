//! Route definitions for orders and payment callbacks.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{order, payment};
use crate::state::AppState;

/// Routes mounted at `/orders`.
///
/// ```text
/// GET  /                       -> list
/// POST /                       -> create
/// GET  /{id}                   -> get
/// POST /{id}/checkout          -> checkout
/// POST /{id}/payment/confirm   -> confirm_payment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(order::list).post(order::create))
        .route("/{id}", get(order::get))
        .route("/{id}/checkout", post(order::checkout))
        .route("/{id}/payment/confirm", post(order::confirm_payment))
}

/// Routes mounted at `/payments`.
///
/// ```text
/// POST /webhook -> webhook (signed by the gateway, no bearer token)
/// ```
pub fn payment_router() -> Router<AppState> {
    Router::new().route("/webhook", post(payment::webhook))
}
