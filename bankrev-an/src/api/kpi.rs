//! KPI summary
//!
//! GET /api/kpi_summary
//!
//! Absolute link counts and sentiment shares over the selected range, each
//! with a trend comparing the latest period (up to `end_date`) with the full
//! period before it. Without a complete range the values are zero; without
//! `end_date` the trends are zero.

use axum::extract::{Query, State};
use axum::Json;
use bankrev_common::Sentiment;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::filters::{push_date_filter, push_product_filter, FilterQuery, LINKS_FROM};
use crate::error::ApiResult;
use crate::stats::{round_percent, SentimentCounts};
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiValue {
    pub value: i64,
    pub trend: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiBlock {
    pub positive: KpiValue,
    pub neutral: KpiValue,
    pub negative: KpiValue,
}

impl KpiBlock {
    fn build(value_of: impl Fn(Sentiment) -> KpiValue) -> Self {
        Self {
            positive: value_of(Sentiment::Positive),
            neutral: value_of(Sentiment::Neutral),
            negative: value_of(Sentiment::Negative),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KpiResponse {
    #[serde(rename = "kpiAbs")]
    pub kpi_abs: KpiBlock,
    #[serde(rename = "kpiPerc")]
    pub kpi_perc: KpiBlock,
}

/// Link counts per sentiment for reviews dated within `[start, end]`
pub async fn counts_between(
    db: &SqlitePool,
    products: Option<&[String]>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<SentimentCounts, sqlx::Error> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT rt.sentiment, COUNT(rt.id) ");
    builder.push(LINKS_FROM);
    push_product_filter(&mut builder, products);
    push_date_filter(&mut builder, Some((start, end)));
    builder.push(" GROUP BY rt.sentiment");

    let rows: Vec<(String, i64)> = builder.build_query_as().fetch_all(db).await?;

    let mut counts = SentimentCounts::default();
    for (sentiment, count) in rows {
        counts.add(&sentiment, count);
    }
    Ok(counts)
}

pub fn summarize(
    total: SentimentCounts,
    last: SentimentCounts,
    previous: SentimentCounts,
) -> KpiResponse {
    KpiResponse {
        kpi_abs: KpiBlock::build(|s| KpiValue {
            value: total.get(s),
            trend: last.get(s) - previous.get(s),
        }),
        kpi_perc: KpiBlock::build(|s| KpiValue {
            value: round_percent(total.percent(s)),
            trend: round_percent(last.percent(s) - previous.percent(s)),
        }),
    }
}

/// GET /api/kpi_summary
pub async fn kpi_summary(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<KpiResponse>> {
    let products = query.product_list();
    let products = products.as_deref();

    let total = match query.date_range() {
        Some((start, end)) => counts_between(&state.db, products, start, end).await?,
        None => SentimentCounts::default(),
    };

    let (last, previous) = match query.end_date {
        Some(end) => {
            let ((last_start, last_end), (prev_start, prev_end)) =
                query.granularity().trend_intervals(end);
            (
                counts_between(&state.db, products, last_start, last_end).await?,
                counts_between(&state.db, products, prev_start, prev_end).await?,
            )
        }
        None => (SentimentCounts::default(), SentimentCounts::default()),
    };

    Ok(Json(summarize(total, last, previous)))
}
