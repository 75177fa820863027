//! Review and review-topic link persistence

use chrono::NaiveDate;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use super::models::Review;
use crate::normalizer::{NormalizedReview, TopicSentiment};
use crate::Result;

/// Insert or replace a full review row
pub async fn upsert_review(pool: &SqlitePool, review: &Review) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reviews (
            id, site_specific_id, source, date, review_text,
            rating, source_topic, source_subtopic
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            site_specific_id = excluded.site_specific_id,
            source = excluded.source,
            date = excluded.date,
            review_text = excluded.review_text,
            rating = excluded.rating,
            source_topic = excluded.source_topic,
            source_subtopic = excluded.source_subtopic
        "#,
    )
    .bind(review.id)
    .bind(review.site_specific_id)
    .bind(&review.source)
    .bind(review.date)
    .bind(&review.review_text)
    .bind(review.rating)
    .bind(&review.source_topic)
    .bind(&review.source_subtopic)
    .execute(pool)
    .await?;

    Ok(())
}

/// Text of a review submitted through the API with the links that replace
/// its current ones (empty when classification failed)
#[derive(Debug, Clone, Copy)]
pub struct IngestedReview<'a> {
    pub id: i64,
    pub text: &'a str,
    pub pairs: &'a [TopicSentiment],
}

/// New rows get `source` and `date`; existing rows only get their text updated
async fn write_review_text(
    tx: &mut Transaction<'_, Sqlite>,
    review: &IngestedReview<'_>,
    source: &str,
    date: NaiveDate,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reviews (id, source, date, review_text)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET review_text = excluded.review_text
        "#,
    )
    .bind(review.id)
    .bind(source)
    .bind(date)
    .bind(review.text)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Look up a topic id by name, inserting the topic if it is new
async fn ensure_topic(tx: &mut Transaction<'_, Sqlite>, name: &str) -> Result<i64> {
    sqlx::query("INSERT INTO topics (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
        .bind(name)
        .execute(&mut **tx)
        .await?;

    let id: i64 = sqlx::query_scalar("SELECT id FROM topics WHERE name = ?")
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;

    Ok(id)
}

async fn replace_links(
    tx: &mut Transaction<'_, Sqlite>,
    review_id: i64,
    pairs: &[TopicSentiment],
) -> Result<u64> {
    sqlx::query("DELETE FROM reviews_topics WHERE review_id = ?")
        .bind(review_id)
        .execute(&mut **tx)
        .await?;

    for pair in pairs {
        let topic_id = ensure_topic(tx, &pair.topic).await?;
        sqlx::query("INSERT INTO reviews_topics (review_id, topic_id, sentiment) VALUES (?, ?, ?)")
            .bind(review_id)
            .bind(topic_id)
            .bind(&pair.sentiment)
            .execute(&mut **tx)
            .await?;
    }

    debug!(review_id, links = pairs.len(), "Stored review topics");
    Ok(pairs.len() as u64)
}

/// Replace the topic links of each review with its normalized pairs
///
/// Runs in a single transaction; returns the number of link rows written.
/// The referenced reviews must already exist.
pub async fn store_normalized(pool: &SqlitePool, reviews: &[NormalizedReview]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut written = 0u64;

    for review in reviews {
        written += replace_links(&mut tx, review.id, &review.pairs).await?;
    }

    tx.commit().await?;
    Ok(written)
}

/// Store review texts and replace their links, all in one transaction
///
/// Every review's links are replaced, so a review re-submitted with no pairs
/// loses the links of its previous text. Returns the number of link rows
/// written; on error nothing is stored.
pub async fn store_ingested(
    pool: &SqlitePool,
    reviews: &[IngestedReview<'_>],
    source: &str,
    date: NaiveDate,
) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut written = 0u64;

    for review in reviews {
        write_review_text(&mut tx, review, source, date).await?;
        written += replace_links(&mut tx, review.id, review.pairs).await?;
    }

    tx.commit().await?;
    Ok(written)
}
