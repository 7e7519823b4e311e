use std::sync::Arc;

use crate::config::ServerConfig;
use crate::payment::PaymentGateway;
use crate::storage::ObjectStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
/// Nothing in here is mutated by requests.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: fgvistos_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Object storage for applicant documents.
    pub storage: Arc<dyn ObjectStorage>,
    /// Payment gateway client.
    pub payments: Arc<dyn PaymentGateway>,
}
