//! GET /api/reviews - latest reviews with their topics
//!
//! With a product filter, a review is listed when any of its links matches;
//! its `cluster` still names all of its topics.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};

use super::filters::{push_date_filter, FilterQuery};
use crate::error::ApiResult;
use crate::AppState;

const LATEST_REVIEWS: i64 = 50;
const NO_SENTIMENT: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRow {
    pub id: i64,
    /// Product label assigned by the source site
    pub product: Option<String>,
    pub text: Option<String>,
    /// Sentiment of the first topic link, `N/A` without links
    pub sentiment: String,
    /// Topic names joined with ", "
    pub cluster: String,
    pub date: Option<NaiveDate>,
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<Vec<ReviewRow>>> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT r.id, r.source_topic, r.review_text, date(r.date) FROM reviews r WHERE 1 = 1",
    );
    if let Some(products) = query.product_list() {
        builder.push(
            " AND r.id IN (SELECT rt.review_id FROM reviews_topics rt \
             JOIN topics t ON t.id = rt.topic_id WHERE t.name IN (",
        );
        let mut separated = builder.separated(", ");
        for product in products {
            separated.push_bind(product);
        }
        separated.push_unseparated("))");
    }
    push_date_filter(&mut builder, query.date_range());
    builder
        .push(" ORDER BY r.date DESC, r.id DESC LIMIT ")
        .push_bind(LATEST_REVIEWS);

    let reviews: Vec<(i64, Option<String>, Option<String>, Option<NaiveDate>)> =
        builder.build_query_as().fetch_all(&state.db).await?;

    if reviews.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let mut links_query = QueryBuilder::<Sqlite>::new(
        "SELECT rt.review_id, t.name, rt.sentiment FROM reviews_topics rt \
         JOIN topics t ON t.id = rt.topic_id WHERE rt.review_id IN (",
    );
    let mut separated = links_query.separated(", ");
    for (id, ..) in &reviews {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY rt.id");

    let links: Vec<(i64, String, String)> =
        links_query.build_query_as().fetch_all(&state.db).await?;

    let mut by_review: HashMap<i64, Vec<(String, String)>> = HashMap::new();
    for (review_id, topic, sentiment) in links {
        by_review.entry(review_id).or_default().push((topic, sentiment));
    }

    let rows = reviews
        .into_iter()
        .map(|(id, product, text, date)| {
            let links = by_review.remove(&id).unwrap_or_default();
            let sentiment = links
                .first()
                .map(|(_, s)| s.clone())
                .unwrap_or_else(|| NO_SENTIMENT.to_string());
            let cluster = links
                .iter()
                .map(|(topic, _)| topic.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            ReviewRow {
                id,
                product,
                text,
                sentiment,
                cluster,
                date,
            }
        })
        .collect();

    Ok(Json(rows))
}
