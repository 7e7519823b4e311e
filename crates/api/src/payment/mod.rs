//! Payment gateway client.
//!
//! [`PaymentGateway`] is the seam handlers call through; [`HttpPaymentGateway`]
//! talks to the real checkout API with `reqwest`. Nothing here retries: a
//! failed call surfaces to the caller as 502.

pub mod http;

use async_trait::async_trait;
use fgvistos_core::payment::{
    CheckoutRequest, CheckoutResponse, PaymentCheckRequest, PaymentCheckResponse,
};

pub use http::HttpPaymentGateway;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Network, DNS, timeout or body decoding failure.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway answered with a non-2xx status.
    #[error("Gateway returned HTTP {0}")]
    HttpStatus(u16),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout link.
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, GatewayError>;

    /// Ask the gateway whether a transaction was paid.
    async fn check_payment(
        &self,
        request: &PaymentCheckRequest,
    ) -> Result<PaymentCheckResponse, GatewayError>;
}
