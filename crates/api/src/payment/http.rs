use std::time::Duration;

use async_trait::async_trait;
use fgvistos_core::payment::{
    CheckoutRequest, CheckoutResponse, PaymentCheckRequest, PaymentCheckResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{GatewayError, PaymentGateway};

/// HTTP request timeout for a single gateway call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// [`PaymentGateway`] backed by the gateway's public JSON API.
///
/// `base_url` is the checkout API root; links are created at
/// `{base_url}/links` and transactions checked at `{base_url}/payment_check`.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPaymentGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn post_json<B, R>(&self, url: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self.client.post(url).json(body).send().await?;
        if !response.status().is_success() {
            return Err(GatewayError::HttpStatus(response.status().as_u16()));
        }
        Ok(response.json::<R>().await?)
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, GatewayError> {
        let url = self.endpoint("links");
        tracing::info!(order_nsu = %request.order_nsu, "Creating checkout link");
        self.post_json(&url, request).await
    }

    async fn check_payment(
        &self,
        request: &PaymentCheckRequest,
    ) -> Result<PaymentCheckResponse, GatewayError> {
        let url = self.endpoint("payment_check");
        tracing::info!(
            order_nsu = %request.order_nsu,
            transaction_nsu = %request.transaction_nsu,
            "Checking payment"
        );
        self.post_json(&url, request).await
    }
}
