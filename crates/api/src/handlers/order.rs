//! Handlers for the `/orders` resource: placing orders and paying for them.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fgvistos_core::access::{self, Action};
use fgvistos_core::error::CoreError;
use fgvistos_core::payment::{
    build_checkout_request, ensure_merchant_handle, order_reference, PaymentCheckRequest,
};
use fgvistos_core::status::PaymentStatus;
use fgvistos_core::types::DbId;
use fgvistos_db::models::applicant::ApplicantFilter;
use fgvistos_db::models::order::{CreateOrder, Order};
use fgvistos_db::repositories::{ApplicantRepo, OrderRepo, PlanRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::applicant::ApplicantResponse;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Upper bound on applicants bought in a single order.
const MAX_APPLICANTS_PER_ORDER: usize = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /orders`.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub plan_id: DbId,
    /// One name per applicant; the first is the responsible applicant.
    pub applicant_names: Vec<String>,
}

/// An order with its applicants.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub applicants: Vec<ApplicantResponse>,
}

/// Optional body of `POST /orders/{id}/checkout`.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutBody {
    /// Must match the configured merchant when present.
    pub handle: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResult {
    pub order_id: DbId,
    pub order_nsu: String,
    pub checkout_url: String,
}

/// Request body for `POST /orders/{id}/payment/confirm`.
#[derive(Debug, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub transaction_nsu: String,
    pub slug: String,
    pub handle: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmPaymentResult {
    pub paid: bool,
    pub order: Order,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_authorized_order(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
    action: Action,
) -> AppResult<Order> {
    let order = OrderRepo::find_by_id(&state.pool, id).await?;
    access::authorize_resource(
        &user.role,
        user.user_id,
        order.as_ref().map(|o| o.user_id),
        action,
        "Order",
        id,
    )?;
    order.ok_or(AppError::Core(CoreError::NotFound { entity: "Order", id }))
}

/// Whether the stored order is paid. An unknown stored value is a data
/// fault, not a client error.
fn is_paid(order: &Order) -> AppResult<bool> {
    PaymentStatus::from_str_value(&order.payment_status)
        .map(PaymentStatus::is_paid)
        .map_err(|e| AppError::InternalError(format!("Order {}: {e}", order.id)))
}

fn parse_names(names: &[String]) -> AppResult<Vec<String>> {
    let names: Vec<String> = names.iter().map(|n| n.trim().to_string()).collect();
    if names.is_empty() || names.len() > MAX_APPLICANTS_PER_ORDER {
        return Err(AppError::Core(CoreError::Validation(format!(
            "An order must have between 1 and {MAX_APPLICANTS_PER_ORDER} applicants"
        ))));
    }
    if names.iter().any(String::is_empty) {
        return Err(AppError::Core(CoreError::Validation(
            "Applicant names must not be empty".into(),
        )));
    }
    Ok(names)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/orders
///
/// Place an order for the caller, creating one applicant per name.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user, _): RequireAuth,
    Json(input): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<OrderDetail>>)> {
    let applicant_names = parse_names(&input.applicant_names)?;

    let plan = PlanRepo::find_by_id(&state.pool, input.plan_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Plan",
            id: input.plan_id,
        }))?;
    if !plan.is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Plan '{}' is no longer offered",
            plan.name
        ))));
    }

    let (order, applicants) = OrderRepo::create_with_applicants(
        &state.pool,
        &CreateOrder {
            user_id: user.user_id,
            plan_id: plan.id,
            applicant_names,
        },
    )
    .await?;
    tracing::info!(
        order_id = order.id,
        user_id = user.user_id,
        applicants = applicants.len(),
        "Order placed"
    );

    let detail = OrderDetail {
        order,
        applicants: applicants.into_iter().map(ApplicantResponse::from).collect(),
    };
    Ok((StatusCode::CREATED, Json(DataResponse::created(detail))))
}

/// GET /api/v1/orders
///
/// Own orders for clients, every order for staff.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user, role): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<Order>>>> {
    let orders = if role.is_staff() {
        OrderRepo::list(&state.pool).await?
    } else {
        OrderRepo::list_by_user(&state.pool, user.user_id).await?
    };
    Ok(Json(DataResponse::ok(orders)))
}

/// GET /api/v1/orders/{id}
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<OrderDetail>>> {
    let order = load_authorized_order(&state, &user, id, Action::Read).await?;
    let applicants = ApplicantRepo::list(
        &state.pool,
        &ApplicantFilter {
            order_id: Some(order.id),
            ..Default::default()
        },
    )
    .await?;

    Ok(Json(DataResponse::ok(OrderDetail {
        order,
        applicants: applicants.into_iter().map(ApplicantResponse::from).collect(),
    })))
}

/// POST /api/v1/orders/{id}/checkout
///
/// Create a hosted checkout link for an unpaid order. The merchant handle
/// always comes from configuration; a conflicting handle in the body is
/// rejected.
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<Json<DataResponse<CheckoutResult>>> {
    let input: CheckoutBody = if body.is_empty() {
        CheckoutBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid checkout body: {e}")))?
    };

    let order = load_authorized_order(&state, &user, id, Action::Write).await?;
    let payment = &state.config.payment;
    ensure_merchant_handle(&payment.merchant_handle, input.handle.as_deref())?;

    if is_paid(&order)? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Order {id} is already paid"
        ))));
    }

    let plan = PlanRepo::find_by_id(&state.pool, order.plan_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Plan",
            id: order.plan_id,
        }))?;

    let request = build_checkout_request(
        &payment.merchant_handle,
        order.id,
        &plan.name,
        plan.price_cents,
        order.applicant_count,
        payment.redirect_url.clone(),
        payment.webhook_url(),
    )?;

    let response = state
        .payments
        .create_checkout(&request)
        .await
        .map_err(|e| AppError::BadGateway(format!("Checkout creation failed: {e}")))?;
    tracing::info!(order_id = order.id, user_id = user.user_id, "Checkout link created");

    Ok(Json(DataResponse::ok(CheckoutResult {
        order_id: order.id,
        order_nsu: request.order_nsu,
        checkout_url: response.url,
    })))
}

/// POST /api/v1/orders/{id}/payment/confirm
///
/// Ask the gateway whether the order was paid and record it if so. A paid
/// order is returned as-is without calling the gateway.
pub async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ConfirmPaymentRequest>,
) -> AppResult<Json<DataResponse<ConfirmPaymentResult>>> {
    let order = load_authorized_order(&state, &user, id, Action::Write).await?;
    let payment = &state.config.payment;
    ensure_merchant_handle(&payment.merchant_handle, input.handle.as_deref())?;

    if is_paid(&order)? {
        return Ok(Json(DataResponse::ok(ConfirmPaymentResult { paid: true, order })));
    }

    let check = PaymentCheckRequest {
        handle: payment.merchant_handle.clone(),
        order_nsu: order_reference(order.id),
        transaction_nsu: input.transaction_nsu.clone(),
        slug: input.slug.clone(),
    };
    let result = state
        .payments
        .check_payment(&check)
        .await
        .map_err(|e| AppError::BadGateway(format!("Payment check failed: {e}")))?;

    if !result.is_paid() {
        tracing::info!(order_id = order.id, "Gateway reports order not yet paid");
        return Ok(Json(DataResponse::ok(ConfirmPaymentResult { paid: false, order })));
    }

    let details = serde_json::json!({
        "source": "payment_check",
        "transaction_nsu": input.transaction_nsu,
        "slug": input.slug,
        "gateway": result,
    });
    let order = OrderRepo::mark_paid(&state.pool, order.id, &details)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Order", id }))?;
    tracing::info!(order_id = order.id, "Order marked paid after payment check");

    Ok(Json(DataResponse::ok(ConfirmPaymentResult { paid: true, order })))
}
