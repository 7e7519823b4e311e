//! Payment gateway payloads, merchant-handle checks and webhook signatures.
//!
//! The HTTP calls themselves live in the API crate; this module only builds
//! and validates the JSON bodies exchanged with the gateway.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Header carrying the hex HMAC-SHA256 of the raw webhook body.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Prefix of the order reference sent to the gateway (`order_nsu`).
const ORDER_REFERENCE_PREFIX: &str = "fgv-order-";

/// Gateway states that mean the money was captured.
const PAID_STATES: &[&str] = &["paid", "approved", "captured"];

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

/// One line item of a checkout link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub quantity: i32,
    /// Unit price in cents.
    pub price: i64,
    pub description: String,
}

/// Body sent to the gateway to create a checkout link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub handle: String,
    pub order_nsu: String,
    pub items: Vec<CheckoutItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// Gateway response to a checkout request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Build the checkout body for an order of `quantity` applicant slots.
pub fn build_checkout_request(
    handle: &str,
    order_id: DbId,
    plan_name: &str,
    unit_price_cents: i64,
    quantity: i32,
    redirect_url: Option<String>,
    webhook_url: Option<String>,
) -> Result<CheckoutRequest, CoreError> {
    if quantity < 1 {
        return Err(CoreError::Validation(
            "An order must cover at least one applicant".into(),
        ));
    }
    if unit_price_cents <= 0 {
        return Err(CoreError::Validation(format!(
            "Plan '{plan_name}' has no valid price"
        )));
    }
    Ok(CheckoutRequest {
        handle: normalize_handle(handle),
        order_nsu: order_reference(order_id),
        items: vec![CheckoutItem {
            quantity,
            price: unit_price_cents,
            description: plan_name.to_string(),
        }],
        redirect_url,
        webhook_url,
    })
}

// ---------------------------------------------------------------------------
// Merchant handle
// ---------------------------------------------------------------------------

fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('$').to_ascii_lowercase()
}

/// Reject any handle that differs from the configured merchant.
///
/// Clients never choose who gets paid; a supplied handle is only accepted
/// when it names the configured merchant.
pub fn ensure_merchant_handle(configured: &str, supplied: Option<&str>) -> Result<(), CoreError> {
    match supplied {
        None => Ok(()),
        Some(s) if normalize_handle(s) == normalize_handle(configured) => Ok(()),
        Some(_) => Err(CoreError::Validation(
            "Payment handle does not match the configured merchant".into(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Order reference
// ---------------------------------------------------------------------------

/// External order reference for an order id.
pub fn order_reference(order_id: DbId) -> String {
    format!("{ORDER_REFERENCE_PREFIX}{order_id}")
}

/// Recover the order id from an external reference.
///
/// Bare numeric references are accepted for links created before the
/// prefix was introduced.
pub fn parse_order_reference(reference: &str) -> Result<DbId, CoreError> {
    let raw = reference
        .trim()
        .strip_prefix(ORDER_REFERENCE_PREFIX)
        .unwrap_or(reference.trim());
    raw.parse::<DbId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CoreError::Validation(format!("Invalid order reference '{reference}'")))
}

// ---------------------------------------------------------------------------
// Webhook & payment check
// ---------------------------------------------------------------------------

/// Callback body posted by the gateway when a payment settles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWebhook {
    pub order_nsu: String,
    #[serde(default)]
    pub transaction_nsu: Option<String>,
    #[serde(default)]
    pub invoice_slug: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub paid_amount: Option<i64>,
    #[serde(default)]
    pub capture_method: Option<String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    /// Absent on gateways that only call back for successful payments.
    #[serde(default)]
    pub status: Option<String>,
}

impl PaymentWebhook {
    pub fn is_paid(&self) -> bool {
        match &self.status {
            None => true,
            Some(s) => PAID_STATES.contains(&s.trim().to_ascii_lowercase().as_str()),
        }
    }
}

/// Body sent to the gateway to check a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCheckRequest {
    pub handle: String,
    pub order_nsu: String,
    pub transaction_nsu: String,
    pub slug: String,
}

/// Gateway answer to a payment check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCheckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub paid_amount: Option<i64>,
    #[serde(default)]
    pub capture_method: Option<String>,
}

impl PaymentCheckResponse {
    pub fn is_paid(&self) -> bool {
        self.success && self.paid
    }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length")
}

/// Hex HMAC-SHA256 of `body` under `secret`.
pub fn compute_signature(secret: &str, body: &[u8]) -> String {
    let mut mac = mac_for(secret);
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a hex signature against `body`.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let signature = signature.trim();
    let signature = signature.strip_prefix("sha256=").unwrap_or(signature);
    let Some(expected) = hex::decode(signature) else {
        return false;
    };
    let mut mac = mac_for(secret);
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

// ---------------------------------------------------------------------------
// hex helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| s.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
            .collect()
    }
}
