//! Dashboard API tests
//!
//! A temporary store is populated through bankrev-common and then served
//! through a read-only connection, the way the two services share it in
//! production.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use bankrev_an::db::connect_readonly;
use bankrev_an::{build_router, AppState};
use bankrev_common::db::{init_database, seed_topics, store_normalized, upsert_review, Review};
use bankrev_common::taxonomy::defaults::default_taxonomy;
use bankrev_common::{NormalizedReview, TopicSentiment};

fn review(id: i64, date: &str, source_topic: &str) -> Review {
    Review {
        date: Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()),
        source_topic: Some(source_topic.to_string()),
        ..Review::new(id, format!("Отзыв {id}"))
    }
}

fn labels(id: i64, pairs: &[(&str, &str)]) -> NormalizedReview {
    NormalizedReview {
        id,
        pairs: pairs
            .iter()
            .map(|(topic, sentiment)| TopicSentiment::new(*topic, *sentiment))
            .collect(),
    }
}

/// Five reviews over February and March 2024; review 5 has no topics
async fn setup() -> (Router, SqlitePool, TempDir) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bankrev.db");
    let writer = init_database(&path).await.unwrap();
    seed_topics(&writer, &default_taxonomy()).await.unwrap();

    for r in [
        review(1, "2024-02-10", "Вклады"),
        review(2, "2024-02-20", "Вклады"),
        review(3, "2024-03-05", "Кредиты"),
        review(4, "2024-03-14", "Кредиты"),
        review(5, "2024-03-14", "Карты"),
    ] {
        upsert_review(&writer, &r).await.unwrap();
    }
    store_normalized(
        &writer,
        &[
            labels(1, &[("Вклады", "positive")]),
            labels(2, &[("Вклады", "positive"), ("Кредиты", "negative")]),
            labels(3, &[("Кредиты", "negative")]),
            labels(4, &[("Кредиты", "positive"), ("Вклады", "neutral")]),
        ],
    )
    .await
    .unwrap();

    let reader = connect_readonly(&path).await.unwrap();
    (build_router(AppState::new(reader)), writer, dir)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_kpi_summary_with_monthly_trend() {
    let (app, _writer, _dir) = setup().await;

    let (status, body) = get(
        app,
        "/api/kpi_summary?start_date=2024-01-01&end_date=2024-03-14&granularity=month",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // March 1-14: 1 / 1 / 1; February: 2 / 0 / 1
    assert_eq!(
        body["kpiAbs"],
        json!({
            "positive": {"value": 3, "trend": -1},
            "neutral": {"value": 1, "trend": 1},
            "negative": {"value": 2, "trend": 0}
        })
    );
    assert_eq!(
        body["kpiPerc"],
        json!({
            "positive": {"value": 50, "trend": -33},
            "neutral": {"value": 17, "trend": 33},
            "negative": {"value": 33, "trend": 0}
        })
    );
}

#[tokio::test]
async fn test_kpi_summary_product_filter() {
    let (app, _writer, _dir) = setup().await;

    let (_, body) = get(
        app,
        "/api/kpi_summary?products=%D0%9A%D1%80%D0%B5%D0%B4%D0%B8%D1%82%D1%8B&start_date=2024-01-01&end_date=2024-12-31",
    )
    .await;

    assert_eq!(body["kpiAbs"]["positive"]["value"], 1);
    assert_eq!(body["kpiAbs"]["negative"]["value"], 2);
    assert_eq!(body["kpiAbs"]["neutral"]["value"], 0);
}

#[tokio::test]
async fn test_kpi_summary_without_range_is_zero() {
    let (app, _writer, _dir) = setup().await;

    let (status, body) = get(app, "/api/kpi_summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kpiAbs"]["positive"], json!({"value": 0, "trend": 0}));
    assert_eq!(body["kpiPerc"]["negative"], json!({"value": 0, "trend": 0}));
}

#[tokio::test]
async fn test_kpi_summary_rejects_malformed_date() {
    let (app, _writer, _dir) = setup().await;

    let (status, _) = get(app, "/api/kpi_summary?end_date=14.03.2024").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_key_aspects() {
    let (app, _writer, _dir) = setup().await;

    let (status, body) = get(app, "/api/key_aspects").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"aspect": "Вклады", "sentiment": "positive", "count": 2, "trend": 0},
            {"aspect": "Кредиты", "sentiment": "positive", "count": 1, "trend": 0},
            {"aspect": "Кредиты", "sentiment": "negative", "count": 2, "trend": 0}
        ])
    );
}

#[tokio::test]
async fn test_key_aspects_date_range() {
    let (app, _writer, _dir) = setup().await;

    let (_, body) = get(app, "/api/key_aspects?start_date=2024-03-01&end_date=2024-03-31").await;

    assert_eq!(
        body,
        json!([
            {"aspect": "Кредиты", "sentiment": "positive", "count": 1, "trend": 0},
            {"aspect": "Кредиты", "sentiment": "negative", "count": 1, "trend": 0}
        ])
    );
}

#[tokio::test]
async fn test_dynamics_stacked_bar_monthly() {
    let (app, _writer, _dir) = setup().await;

    let (status, body) = get(app, "/api/dynamics_stacked_bar").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"], json!(["Фев 2024", "Мар 2024"]));
    assert_eq!(
        body["series"],
        json!([
            {"sentiment": "positive", "name": "Позитивные", "values": [2, 1]},
            {"sentiment": "neutral", "name": "Нейтральные", "values": [0, 1]},
            {"sentiment": "negative", "name": "Негативные", "values": [1, 1]}
        ])
    );
}

#[tokio::test]
async fn test_dynamics_weekly_percentages() {
    let (app, _writer, _dir) = setup().await;

    let (status, body) = get(app, "/api/dynamics?granularity=week").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["categories"],
        json!(["W6 2024", "W8 2024", "W10 2024", "W11 2024"])
    );

    let series = body["series"].as_array().unwrap();
    assert_eq!(series.len(), 3);
    for period in 0..4 {
        let total: f64 = series
            .iter()
            .map(|s| s["values"][period].as_f64().unwrap())
            .sum();
        assert!((total - 100.0).abs() < 1e-9, "period {period} sums to {total}");
    }
    // W6: a single positive link
    assert_eq!(series[0]["values"][0], 100.0);
}

#[tokio::test]
async fn test_reviews_latest_first() {
    let (app, _writer, _dir) = setup().await;

    let (status, body) = get(app, "/api/reviews").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![5, 4, 3, 2, 1]);

    assert_eq!(
        body[0],
        json!({
            "id": 5, "product": "Карты", "text": "Отзыв 5",
            "sentiment": "N/A", "cluster": "", "date": "2024-03-14"
        })
    );
    assert_eq!(body[1]["sentiment"], "positive");
    assert_eq!(body[1]["cluster"], "Кредиты, Вклады");
}

#[tokio::test]
async fn test_reviews_filtered_by_product_and_date() {
    let (app, _writer, _dir) = setup().await;

    let (_, body) = get(
        app.clone(),
        "/api/reviews?products=%D0%9A%D1%80%D0%B5%D0%B4%D0%B8%D1%82%D1%8B",
    )
    .await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![4, 3, 2]);
    // Cluster lists every topic of the review, not only the filtered one
    assert_eq!(body[2]["cluster"], "Вклады, Кредиты");

    let (_, body) = get(app, "/api/reviews?start_date=2024-02-01&end_date=2024-02-29").await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 1]);
}

#[tokio::test]
async fn test_products_list_is_sorted() {
    let (app, _writer, _dir) = setup().await;

    let (status, body) = get(app, "/api/products_list").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<String> = serde_json::from_value(body).unwrap();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert!(names.contains(&"Вклады".to_string()));
    assert!(names.contains(&"Кредит наличными".to_string()));
}

#[tokio::test]
async fn test_health() {
    let (app, _writer, _dir) = setup().await;

    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "bankrev-an");
}
