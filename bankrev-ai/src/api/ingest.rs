//! Ingestion endpoint
//!
//! POST /api/ingest
//!
//! Classifies the reviews, normalizes the labels and stores reviews and topic
//! links. Reviews that could not be classified are stored without links and
//! listed in `failed`.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use tracing::error;

use super::postprocess::default_expand_to_parent;
use crate::models::ReviewInput;
use crate::services::{ingest_batch, IngestReport};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub data: Vec<ReviewInput>,
    #[serde(default = "default_expand_to_parent")]
    pub expand_to_parent: bool,
}

pub async fn ingest(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> ApiResult<Json<IngestReport>> {
    if request.data.is_empty() {
        return Err(ApiError::BadRequest(
            "'data' must contain at least one review".to_string(),
        ));
    }

    match ingest_batch(
        &state.classifier,
        &state.normalizer,
        &state.db,
        &request.data,
        request.expand_to_parent,
    )
    .await
    {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            error!("Ingest failed: {}", e);
            *state.last_error.write().await = Some(e.to_string());
            Err(e.into())
        }
    }
}

pub fn ingest_routes() -> Router<AppState> {
    Router::new().route("/api/ingest", post(ingest))
}
