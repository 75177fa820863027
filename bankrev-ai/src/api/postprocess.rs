//! Taxonomy normalization endpoint
//!
//! POST /api/postprocess
//!
//! Maps raw model labels onto the taxonomy without calling the model. Each
//! review is identified by `id` or `reviewId`; a review with neither rejects
//! the batch with 400.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use bankrev_common::{NormalizedReview, RawReview};

use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct PostprocessRequest {
    pub reviews: Vec<RawReview>,
    #[serde(default = "default_expand_to_parent")]
    pub expand_to_parent: bool,
}

pub(crate) fn default_expand_to_parent() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostprocessResponse {
    pub reviews: Vec<NormalizedReview>,
}

pub async fn postprocess(
    State(state): State<AppState>,
    Json(request): Json<PostprocessRequest>,
) -> ApiResult<Json<PostprocessResponse>> {
    let reviews = state
        .normalizer
        .normalize_batch(&request.reviews, request.expand_to_parent)
        .map_err(bankrev_common::Error::from)?;

    Ok(Json(PostprocessResponse { reviews }))
}

pub fn postprocess_routes() -> Router<AppState> {
    Router::new().route("/api/postprocess", post(postprocess))
}
