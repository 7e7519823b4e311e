#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use fgvistos_api::auth::jwt::{generate_access_token, JwtConfig};
use fgvistos_api::auth::password::hash_password;
use fgvistos_api::config::{PaymentConfig, ServerConfig, StorageConfig};
use fgvistos_api::payment::{GatewayError, PaymentGateway};
use fgvistos_api::router::build_app_router;
use fgvistos_api::state::AppState;
use fgvistos_api::storage::{LocalStorage, ObjectStorage, StorageResult};
use fgvistos_core::payment::{
    CheckoutRequest, CheckoutResponse, PaymentCheckRequest, PaymentCheckResponse,
};
use fgvistos_core::roles::Role;
use fgvistos_db::models::plan::{CreatePlan, Plan};
use fgvistos_db::models::user::{CreateUser, User};
use fgvistos_db::models::visa_type::CreateVisaType;
use fgvistos_db::repositories::{PlanRepo, UserRepo, VisaTypeRepo};
use serde_json::json;

pub const TEST_PASSWORD: &str = "correct horse battery";
pub const MERCHANT_HANDLE: &str = "fgvistos";
pub const WEBHOOK_SECRET: &str = "whsec-test";

/// Build a test `ServerConfig` with a throwaway storage root.
pub fn test_config() -> ServerConfig {
    let storage_root = std::env::temp_dir().join(format!("fgvistos-test-{}", uuid::Uuid::new_v4()));
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-jwt-secret".to_string(),
            access_token_expiry_mins: 30,
            refresh_token_expiry_days: 14,
        },
        storage: StorageConfig {
            root: storage_root.to_string_lossy().to_string(),
            max_upload_bytes: 1024 * 1024,
        },
        payment: PaymentConfig {
            gateway_url: "http://gateway.invalid".to_string(),
            merchant_handle: MERCHANT_HANDLE.to_string(),
            webhook_secret: WEBHOOK_SECRET.to_string(),
            redirect_url: Some("https://fgvistos.test/obrigado".to_string()),
            public_base_url: Some("https://api.fgvistos.test".to_string()),
        },
    }
}

// ---------------------------------------------------------------------------
// Stub payment gateway
// ---------------------------------------------------------------------------

/// In-memory gateway that records requests and answers from fixed settings.
#[derive(Default)]
pub struct StubGateway {
    pub fail: bool,
    pub paid: bool,
    pub checkouts: Mutex<Vec<CheckoutRequest>>,
    pub checks: Mutex<Vec<PaymentCheckRequest>>,
}

impl StubGateway {
    pub fn paying() -> Self {
        Self {
            paid: true,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_checkout(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutResponse, GatewayError> {
        if self.fail {
            return Err(GatewayError::HttpStatus(503));
        }
        self.checkouts.lock().unwrap().push(request.clone());
        Ok(CheckoutResponse {
            url: format!("https://checkout.test/{}", request.order_nsu),
        })
    }

    async fn check_payment(
        &self,
        request: &PaymentCheckRequest,
    ) -> Result<PaymentCheckResponse, GatewayError> {
        if self.fail {
            return Err(GatewayError::HttpStatus(503));
        }
        self.checks.lock().unwrap().push(request.clone());
        Ok(PaymentCheckResponse {
            success: true,
            paid: self.paid,
            amount: Some(100),
            paid_amount: self.paid.then_some(100),
            capture_method: Some("pix".to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Recording storage
// ---------------------------------------------------------------------------

/// [`LocalStorage`] that records every key written and deleted.
///
/// With `drop_applicant_after_put` set, the applicant row is deleted right
/// after the object is written, so the attachment insert that follows fails
/// its foreign key.
pub struct RecordingStorage {
    pub inner: LocalStorage,
    pub puts: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
    drop_applicant_after_put: Option<(PgPool, i64)>,
}

impl RecordingStorage {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            inner: LocalStorage::new(root),
            puts: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            drop_applicant_after_put: None,
        }
    }

    pub fn dropping_applicant_after_put(mut self, pool: PgPool, applicant_id: i64) -> Self {
        self.drop_applicant_after_put = Some((pool, applicant_id));
        self
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> StorageResult<()> {
        self.inner.put(key, bytes, content_type).await?;
        self.puts.lock().unwrap().push(key.to_string());
        if let Some((pool, applicant_id)) = &self.drop_applicant_after_put {
            sqlx::query("DELETE FROM applicants WHERE id = $1")
                .bind(applicant_id)
                .execute(pool)
                .await
                .expect("applicant delete should succeed");
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.deletes.lock().unwrap().push(key.to_string());
        self.inner.delete(key).await
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Build the full application router with a stub gateway that never pays.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_gateway(pool, Arc::new(StubGateway::default()))
}

/// Build the full application router with the given payment gateway.
///
/// Uses the same [`build_app_router`] as `main.rs`, so the middleware stack
/// under test is the production one.
pub fn build_test_app_with_gateway(pool: PgPool, payments: Arc<dyn PaymentGateway>) -> Router {
    let config = test_config();
    let storage = Arc::new(LocalStorage::new(config.storage.root.clone()));
    build_with(pool, config, storage, payments)
}

/// Build the application router around the given object storage.
pub fn build_test_app_with_storage(pool: PgPool, storage: Arc<dyn ObjectStorage>) -> Router {
    build_with(pool, test_config(), storage, Arc::new(StubGateway::default()))
}

fn build_with(
    pool: PgPool,
    config: ServerConfig,
    storage: Arc<dyn ObjectStorage>,
    payments: Arc<dyn PaymentGateway>,
) -> Router {
    let state = AppState {
        pool,
        storage,
        payments,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and return it with a signed access
/// token for `role`.
pub async fn create_user(pool: &PgPool, email: &str, role: Role) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            role_id: role.id(),
        },
    )
    .await
    .expect("user creation should succeed");

    let token = generate_access_token(user.id, role.as_str(), &test_config().jwt)
        .expect("token signing should succeed");
    (user, token)
}

// ---------------------------------------------------------------------------
// Catalogue & orders
// ---------------------------------------------------------------------------

/// Form schema used by the seeded visa type: two required text fields and a
/// boolean that reveals one dependent field.
pub fn tourist_form() -> serde_json::Value {
    json!({
        "sections": [
            {
                "id": "personal",
                "title": "Personal data",
                "fields": [
                    { "id": "full_name", "label": "Full name", "type": "text", "required": true },
                    { "id": "passport_number", "label": "Passport number", "type": "text", "required": true }
                ]
            },
            {
                "id": "travel",
                "title": "Travel history",
                "fields": [{
                    "id": "visited_us",
                    "label": "Visited the US before?",
                    "type": "boolean",
                    "required": true,
                    "dependent_fields": [
                        { "id": "last_visit", "label": "Last visit", "type": "date", "required": true }
                    ]
                }]
            }
        ]
    })
}

/// Insert a visa type with [`tourist_form`] and an active plan for it.
pub async fn seed_plan(pool: &PgPool) -> Plan {
    let visa_type = VisaTypeRepo::create(
        pool,
        &CreateVisaType {
            name: "B1/B2 Tourist".to_string(),
            description: None,
            form_questions: Some(tourist_form()),
        },
    )
    .await
    .expect("visa type creation should succeed");

    PlanRepo::create(
        pool,
        &CreatePlan {
            visa_type_id: visa_type.id,
            name: "Tourist standard".to_string(),
            description: Some("Form review and interview prep".to_string()),
            price_cents: 49_900,
        },
    )
    .await
    .expect("plan creation should succeed")
}

/// Place an order through the API and return its `data` payload.
pub async fn place_order(app: Router, token: &str, plan_id: i64, names: &[&str]) -> serde_json::Value {
    let response = post_json_auth(
        app,
        "/api/v1/orders",
        json!({ "plan_id": plan_id, "applicant_names": names }),
        token,
    )
    .await;
    expect_data(response, StatusCode::CREATED).await
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request("POST", uri, None, body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("POST", uri, Some(token), body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("PUT", uri, Some(token), body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

/// POST a raw body with extra headers (used for signed webhooks).
pub async fn post_raw(app: Router, uri: &str, body: &[u8], headers: &[(&str, &str)]) -> Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder
        .body(Body::from(body.to_vec()))
        .expect("request should build");
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "fgvistos-test-boundary";

/// A file part for [`post_multipart_auth`].
pub struct FilePart<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// Encode text fields and an optional file as `multipart/form-data`.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart_auth(app: Router, uri: &str, body: Vec<u8>, token: &str) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .expect("request should build");
    send(app, request).await
}

/// Assert the status and return the `data` member of a success envelope.
pub async fn expect_data(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["status"], status.as_u16());
    json["data"].clone()
}

/// Assert the status and error code of an error envelope.
pub async fn expect_error(response: Response, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code, "unexpected error body: {json}");
    assert_eq!(json["status"], status.as_u16());
}
