//! bankrev-an library - dashboard analytics over the review store
//!
//! KPI summary, key aspects, sentiment dynamics and the latest reviews,
//! served from a read-only connection.

use axum::http::HeaderValue;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod stats;

pub use crate::error::{ApiError, ApiResult};

/// Dashboard front-end origins allowed to call the API
pub const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:8080"];

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (read-only)
    pub db: SqlitePool,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            startup_time: Utc::now(),
        }
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(ALLOWED_ORIGINS.map(HeaderValue::from_static)))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/api/kpi_summary", get(api::kpi_summary))
        .route("/api/key_aspects", get(api::key_aspects))
        .route("/api/dynamics", get(api::dynamics))
        .route("/api/dynamics_stacked_bar", get(api::dynamics_stacked_bar))
        .route("/api/reviews", get(api::list_reviews))
        .route("/api/products_list", get(api::products_list))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}
