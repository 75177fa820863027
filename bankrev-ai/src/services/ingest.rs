//! Classify, normalize and persist a batch of reviews

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use bankrev_common::db::{store_ingested, IngestedReview};
use bankrev_common::{Error, NormalizedReview, Normalizer, Result, TopicSentiment};

use super::classifier::Classifier;
use crate::models::ReviewInput;

/// `source` column value for reviews submitted through the API
pub const API_SOURCE: &str = "api";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    /// Normalized labels of the reviews that were classified
    pub reviews: Vec<NormalizedReview>,
    /// Ids whose classification failed; their text is stored without links
    pub failed: Vec<i64>,
}

/// Classify `reviews`, normalize the results and store texts and links
///
/// Reviews whose classification failed keep their text but lose any links
/// left from an earlier ingest, so stored links always describe the stored
/// text.
pub async fn ingest_batch(
    classifier: &Classifier,
    normalizer: &Normalizer,
    db: &SqlitePool,
    reviews: &[ReviewInput],
    expand_to_parent: bool,
) -> Result<IngestReport> {
    let labels = classifier.classify_labels(reviews).await;

    let mut normalized = Vec::new();
    let mut failed = Vec::new();
    let mut link_sets: Vec<Vec<TopicSentiment>> = Vec::with_capacity(labels.len());
    for (index, label) in labels.iter().enumerate() {
        if label.succeeded() {
            let review = normalizer
                .normalize_review(index, &label.to_raw_review(), expand_to_parent)
                .map_err(|e| Error::Internal(e.to_string()))?;
            link_sets.push(review.pairs.clone());
            normalized.push(review);
        } else {
            failed.push(label.id);
            link_sets.push(Vec::new());
        }
    }

    let submissions: Vec<IngestedReview<'_>> = reviews
        .iter()
        .zip(&link_sets)
        .map(|(review, pairs)| IngestedReview {
            id: review.id,
            text: &review.text,
            pairs,
        })
        .collect();

    let today = Utc::now().date_naive();
    let links = store_ingested(db, &submissions, API_SOURCE, today).await?;

    info!(
        reviews = reviews.len(),
        classified = normalized.len(),
        failed = failed.len(),
        links,
        "Ingested review batch"
    );

    Ok(IngestReport {
        reviews: normalized,
        failed,
    })
}
