//! bankrev-ai library interface
//!
//! Review classification (LLM inference with retries), taxonomy
//! normalization and ingestion into the review store.

pub mod api;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::http::HeaderValue;
use axum::Router;
use bankrev_common::Normalizer;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::Classifier;

/// Dashboard front-end origins allowed to call the API
pub const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:8080"];

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub classifier: Classifier,
    pub normalizer: Normalizer,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last ingest failure, reported by /health
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool, classifier: Classifier, normalizer: Normalizer) -> Self {
        Self {
            db,
            classifier,
            normalizer,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

pub fn cors_layer() -> CorsLayer {
    let origins = ALLOWED_ORIGINS.map(HeaderValue::from_static);
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::predict_routes())
        .merge(api::postprocess_routes())
        .merge(api::ingest_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}
