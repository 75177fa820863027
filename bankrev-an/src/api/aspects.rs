//! GET /api/key_aspects
//!
//! Top five topics by positive link count followed by the top five by
//! negative link count.

use axum::extract::{Query, State};
use axum::Json;
use bankrev_common::Sentiment;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};

use super::filters::{push_date_filter, push_product_filter, FilterQuery, LINKS_FROM};
use crate::error::ApiResult;
use crate::AppState;

const TOP_ASPECTS: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRow {
    pub aspect: String,
    pub sentiment: Sentiment,
    pub count: i64,
    /// Always 0; per-aspect trends are not computed
    pub trend: i64,
}

async fn top_aspects(
    state: &AppState,
    query: &FilterQuery,
    sentiment: Sentiment,
) -> Result<Vec<AspectRow>, sqlx::Error> {
    let products = query.product_list();

    let mut builder = QueryBuilder::<Sqlite>::new("SELECT t.name, COUNT(rt.id) AS link_count ");
    builder.push(LINKS_FROM);
    builder
        .push(" AND lower(rt.sentiment) = ")
        .push_bind(sentiment.as_str());
    push_product_filter(&mut builder, products.as_deref());
    push_date_filter(&mut builder, query.date_range());
    builder
        .push(" GROUP BY t.name ORDER BY link_count DESC, t.name ASC LIMIT ")
        .push_bind(TOP_ASPECTS);

    let rows: Vec<(String, i64)> = builder.build_query_as().fetch_all(&state.db).await?;

    Ok(rows
        .into_iter()
        .map(|(aspect, count)| AspectRow {
            aspect,
            sentiment,
            count,
            trend: 0,
        })
        .collect())
}

pub async fn key_aspects(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<Vec<AspectRow>>> {
    let mut aspects = top_aspects(&state, &query, Sentiment::Positive).await?;
    aspects.extend(top_aspects(&state, &query, Sentiment::Negative).await?);
    Ok(Json(aspects))
}
