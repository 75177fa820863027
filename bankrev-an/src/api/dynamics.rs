//! Sentiment dynamics
//!
//! GET /api/dynamics            - share of each sentiment per period, percent
//! GET /api/dynamics_stacked_bar - link count of each sentiment per period
//!
//! Both return `{categories, series}`: one category label per period that has
//! links, and one series per sentiment (positive, neutral, negative) with a
//! value per category.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::Json;
use bankrev_common::Sentiment;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::filters::{push_date_filter, push_product_filter, FilterQuery, LINKS_FROM};
use crate::error::ApiResult;
use crate::stats::{Granularity, SentimentCounts};
use crate::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series<T> {
    pub sentiment: Sentiment,
    /// Legend name
    pub name: String,
    pub values: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicsResponse<T> {
    pub categories: Vec<String>,
    pub series: Vec<Series<T>>,
}

/// Per-period sentiment counts, keyed by period start
#[derive(Debug, Default, PartialEq)]
pub struct PeriodCounts {
    granularity: Granularity,
    periods: BTreeMap<NaiveDate, SentimentCounts>,
}

impl PeriodCounts {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            granularity,
            periods: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, day: NaiveDate, sentiment: &str, count: i64) {
        let start = self.granularity.period_start(day);
        self.periods.entry(start).or_default().add(sentiment, count);
    }

    pub fn categories(&self) -> Vec<String> {
        self.periods
            .keys()
            .map(|start| self.granularity.label(*start))
            .collect()
    }

    fn to_response<T>(&self, value_of: impl Fn(&SentimentCounts, Sentiment) -> T) -> DynamicsResponse<T> {
        let series = Sentiment::ALL
            .iter()
            .map(|&sentiment| Series {
                sentiment,
                name: sentiment.series_name().to_string(),
                values: self
                    .periods
                    .values()
                    .map(|counts| value_of(counts, sentiment))
                    .collect(),
            })
            .collect();

        DynamicsResponse {
            categories: self.categories(),
            series,
        }
    }

    pub fn to_percentages(&self) -> DynamicsResponse<f64> {
        self.to_response(|counts, sentiment| counts.percent(sentiment))
    }

    pub fn to_counts(&self) -> DynamicsResponse<i64> {
        self.to_response(|counts, sentiment| counts.get(sentiment))
    }
}

/// Counts grouped by review day, then folded into periods
pub async fn load_period_counts(
    db: &SqlitePool,
    query: &FilterQuery,
) -> Result<PeriodCounts, sqlx::Error> {
    let products = query.product_list();

    let mut builder =
        QueryBuilder::<Sqlite>::new("SELECT date(r.date) AS day, rt.sentiment, COUNT(rt.id) ");
    builder.push(LINKS_FROM);
    builder.push(" AND date(r.date) IS NOT NULL");
    push_product_filter(&mut builder, products.as_deref());
    push_date_filter(&mut builder, query.date_range());
    builder.push(" GROUP BY day, rt.sentiment");

    let rows: Vec<(NaiveDate, String, i64)> = builder.build_query_as().fetch_all(db).await?;

    let mut periods = PeriodCounts::new(query.granularity());
    for (day, sentiment, count) in rows {
        periods.add(day, &sentiment, count);
    }
    Ok(periods)
}

/// GET /api/dynamics
pub async fn dynamics(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<DynamicsResponse<f64>>> {
    let periods = load_period_counts(&state.db, &query).await?;
    Ok(Json(periods.to_percentages()))
}

/// GET /api/dynamics_stacked_bar
pub async fn dynamics_stacked_bar(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> ApiResult<Json<DynamicsResponse<i64>>> {
    let periods = load_period_counts(&state.db, &query).await?;
    Ok(Json(periods.to_counts()))
}
