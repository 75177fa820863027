//! Prediction endpoint
//!
//! POST /api/predict
//!
//! Request:  `{"data": [{"id": 1, "text": "..."}]}`
//! Response: `{"predictions": [{"id": 1, "topics": [...], "sentiments": [...]}]}`
//!
//! Predictions come back in request order, one per review. A review the model
//! could not classify gets empty `topics` and `sentiments`.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

use crate::models::{ClassificationResult, ReviewInput};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub data: Vec<ReviewInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<ClassificationResult>,
}

pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<Json<PredictResponse>> {
    if request.data.is_empty() {
        return Err(ApiError::BadRequest(
            "'data' must contain at least one review".to_string(),
        ));
    }

    let started = Instant::now();
    let predictions = state.classifier.classify_batch(&request.data).await;

    let empty = predictions.iter().filter(|p| p.is_empty()).count();
    info!(
        reviews = predictions.len(),
        empty,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Prediction batch complete"
    );

    Ok(Json(PredictResponse { predictions }))
}

pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/api/predict", post(predict))
}
