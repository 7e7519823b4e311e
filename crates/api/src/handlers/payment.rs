//! Handler for the payment gateway webhook.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use fgvistos_core::error::CoreError;
use fgvistos_core::payment::{
    ensure_merchant_handle, parse_order_reference, verify_signature, PaymentWebhook,
    WEBHOOK_SIGNATURE_HEADER,
};
use fgvistos_core::types::DbId;
use fgvistos_db::repositories::OrderRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub order_id: DbId,
    pub payment_status: String,
}

/// POST /api/v1/payments/webhook
///
/// Called by the gateway. The raw body must carry a valid HMAC-SHA256
/// signature; the merchant handle must match ours. Only `payment_status`
/// changes. Replays of a paid notification are acknowledged without
/// touching the stored details.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<DataResponse<WebhookAck>>> {
    let payment = &state.config.payment;

    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Missing webhook signature".into()))
        })?;
    if !verify_signature(&payment.webhook_secret, &body, signature) {
        tracing::warn!("Rejected webhook with invalid signature");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid webhook signature".into(),
        )));
    }

    let hook: PaymentWebhook = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;
    ensure_merchant_handle(&payment.merchant_handle, hook.handle.as_deref())?;
    let order_id = parse_order_reference(&hook.order_nsu)?;

    if !hook.is_paid() {
        let order = OrderRepo::find_by_id(&state.pool, order_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Order",
                id: order_id,
            }))?;
        tracing::info!(order_id, status = ?hook.status, "Ignoring non-paid webhook");
        return Ok(Json(DataResponse::ok(WebhookAck {
            order_id,
            payment_status: order.payment_status,
        })));
    }

    let details = serde_json::to_value(&hook)
        .map_err(|e| AppError::InternalError(format!("Failed to encode webhook: {e}")))?;
    let order = OrderRepo::mark_paid(&state.pool, order_id, &details)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Order",
            id: order_id,
        }))?;
    tracing::info!(order_id, transaction_nsu = ?hook.transaction_nsu, "Order marked paid by webhook");

    Ok(Json(DataResponse::ok(WebhookAck {
        order_id,
        payment_status: order.payment_status,
    })))
}
