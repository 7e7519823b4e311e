use std::str::FromStr;

use fgvistos_core::upload::DEFAULT_MAX_UPLOAD_BYTES;

use crate::auth::jwt::{JwtConfig, DEFAULT_ACCESS_EXPIRY_MINS, DEFAULT_REFRESH_EXPIRY_DAYS};

/// Default payment gateway base URL (checkout links API).
const DEFAULT_PAYMENT_GATEWAY_URL: &str = "https://api.infinitepay.io/invoices/public/checkout";

/// Server configuration loaded from environment variables.
///
/// All fields except the secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Attachment storage settings.
    pub storage: StorageConfig,
    /// Payment gateway settings.
    pub payment: PaymentConfig,
}

/// Where uploaded documents are written and how large they may be.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub root: String,
    pub max_upload_bytes: usize,
}

/// Payment gateway endpoint, merchant identity and webhook secret.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    pub gateway_url: String,
    /// The only merchant handle checkouts are ever created for.
    pub merchant_handle: String,
    /// Shared secret for `x-webhook-signature` verification.
    pub webhook_secret: String,
    /// Where the gateway sends the customer after paying.
    pub redirect_url: Option<String>,
    /// Externally reachable base URL of this API, used to build the webhook URL.
    pub public_base_url: Option<String>,
}

impl PaymentConfig {
    /// Absolute webhook URL handed to the gateway, if a public base URL is known.
    pub fn webhook_url(&self) -> Option<String> {
        self.public_base_url
            .as_deref()
            .map(|base| format!("{}/api/v1/payments/webhook", base.trim_end_matches('/')))
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `JWT_SECRET`              | **required**               |
    /// | `JWT_ACCESS_EXPIRY_MINS`  | `30`                       |
    /// | `JWT_REFRESH_EXPIRY_DAYS` | `14`                       |
    /// | `STORAGE_ROOT`            | `./storage`                |
    /// | `MAX_UPLOAD_BYTES`        | `10485760`                 |
    /// | `PAYMENT_GATEWAY_URL`     | InfinitePay checkout API   |
    /// | `PAYMENT_MERCHANT_HANDLE` | **required**               |
    /// | `PAYMENT_WEBHOOK_SECRET`  | **required**               |
    /// | `PAYMENT_REDIRECT_URL`    | unset                      |
    /// | `PUBLIC_BASE_URL`         | unset                      |
    ///
    /// # Panics
    ///
    /// Panics on malformed numbers or missing required variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_env("PORT", 3000);

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", 30);

        let storage = StorageConfig {
            root: std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "./storage".into()),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
        };

        let payment = PaymentConfig {
            gateway_url: std::env::var("PAYMENT_GATEWAY_URL")
                .unwrap_or_else(|_| DEFAULT_PAYMENT_GATEWAY_URL.into()),
            merchant_handle: required_env("PAYMENT_MERCHANT_HANDLE"),
            webhook_secret: required_env("PAYMENT_WEBHOOK_SECRET"),
            redirect_url: optional_env("PAYMENT_REDIRECT_URL"),
            public_base_url: optional_env("PUBLIC_BASE_URL"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig {
                secret: required_env("JWT_SECRET"),
                access_token_expiry_mins: parse_env(
                    "JWT_ACCESS_EXPIRY_MINS",
                    DEFAULT_ACCESS_EXPIRY_MINS,
                ),
                refresh_token_expiry_days: parse_env(
                    "JWT_REFRESH_EXPIRY_DAYS",
                    DEFAULT_REFRESH_EXPIRY_DAYS,
                ),
            },
            storage,
            payment,
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_env<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}

fn required_env(key: &str) -> String {
    let value = std::env::var(key).unwrap_or_else(|_| panic!("{key} must be set"));
    assert!(!value.trim().is_empty(), "{key} must not be empty");
    value
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
