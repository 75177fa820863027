//! GET /api/products_list - every known topic name, sorted

use axum::extract::State;
use axum::Json;

use crate::error::ApiResult;
use crate::AppState;

pub async fn products_list(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let names: Vec<String> = sqlx::query_scalar("SELECT DISTINCT name FROM topics ORDER BY name")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(names))
}
