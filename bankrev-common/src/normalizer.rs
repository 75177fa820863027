//! Taxonomy normalizer
//!
//! Rewrites raw model output `(topic, sentiment)` pairs onto the canonical
//! taxonomy:
//!
//! 1. alias substitution (exact match, single step)
//! 2. taxonomy resolution: top-level name, or subtopic -> parents (+ the
//!    subtopic itself when `expand_to_parent` is set), or nothing
//! 3. per-review deduplication on topic: the first pair that reaches a topic
//!    decides its sentiment, later pairs for the same topic are discarded
//!
//! Pair order is significant and preserved. Unresolvable topics are dropped
//! silently; a review without an identifier rejects the whole batch.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::taxonomy::{AliasMap, Taxonomy};

/// Normalization errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// Neither `id` nor `reviewId` present on the review at `index`
    #[error("Review #{index} has no 'id' or 'reviewId' field")]
    MissingIdentifier { index: usize },
}

/// One topic/sentiment pair
///
/// Sentiment is carried through untouched, whatever label vocabulary the
/// producer used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSentiment {
    pub topic: String,
    pub sentiment: String,
}

impl TopicSentiment {
    pub fn new(topic: impl Into<String>, sentiment: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            sentiment: sentiment.into(),
        }
    }
}

/// Raw review as produced by the classifier or an offline labelling job
///
/// Both `id` and `reviewId` are accepted as the identifier; `id` wins when
/// both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReview {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, rename = "reviewId", skip_serializing_if = "Option::is_none")]
    pub review_id: Option<i64>,
    #[serde(default)]
    pub topic_sentiment_pairs: Vec<TopicSentiment>,
}

impl RawReview {
    pub fn new(id: i64, pairs: Vec<TopicSentiment>) -> Self {
        Self {
            id: Some(id),
            review_id: None,
            topic_sentiment_pairs: pairs,
        }
    }

    pub fn identifier(&self) -> Option<i64> {
        self.id.or(self.review_id)
    }
}

/// Review with canonical, per-topic unique pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedReview {
    pub id: i64,
    #[serde(rename = "topic_sentiment_pairs")]
    pub pairs: Vec<TopicSentiment>,
}

/// Maps raw topic strings onto the injected taxonomy and alias table
#[derive(Debug, Clone)]
pub struct Normalizer {
    taxonomy: Arc<Taxonomy>,
    aliases: Arc<AliasMap>,
}

impl Normalizer {
    pub fn new(taxonomy: Arc<Taxonomy>, aliases: Arc<AliasMap>) -> Self {
        Self { taxonomy, aliases }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Canonical names a single raw topic string resolves to
    pub fn resolve_topic(&self, raw_topic: &str, expand_to_parent: bool) -> Vec<String> {
        let topic = self.aliases.resolve(raw_topic);
        self.taxonomy.resolve(topic.trim(), expand_to_parent)
    }

    /// Normalize the pairs of one review, keeping input order
    pub fn normalize_pairs(
        &self,
        pairs: &[TopicSentiment],
        expand_to_parent: bool,
    ) -> Vec<TopicSentiment> {
        let mut emitted: HashSet<String> = HashSet::new();
        let mut normalized = Vec::new();

        for pair in pairs {
            let resolved = self.resolve_topic(&pair.topic, expand_to_parent);
            if resolved.is_empty() {
                debug!(topic = %pair.topic, "Dropping topic outside taxonomy");
                continue;
            }

            for topic in resolved {
                if emitted.contains(&topic) {
                    continue;
                }
                emitted.insert(topic.clone());
                normalized.push(TopicSentiment {
                    topic,
                    sentiment: pair.sentiment.clone(),
                });
            }
        }

        normalized
    }

    /// Normalize one review; `index` is only used for error reporting
    pub fn normalize_review(
        &self,
        index: usize,
        review: &RawReview,
        expand_to_parent: bool,
    ) -> Result<NormalizedReview, NormalizeError> {
        let id = review
            .identifier()
            .ok_or(NormalizeError::MissingIdentifier { index })?;

        Ok(NormalizedReview {
            id,
            pairs: self.normalize_pairs(&review.topic_sentiment_pairs, expand_to_parent),
        })
    }

    /// Normalize a batch, preserving review order
    ///
    /// Fails on the first review without an identifier; no partial output.
    pub fn normalize_batch(
        &self,
        reviews: &[RawReview],
        expand_to_parent: bool,
    ) -> Result<Vec<NormalizedReview>, NormalizeError> {
        reviews
            .iter()
            .enumerate()
            .map(|(index, review)| self.normalize_review(index, review, expand_to_parent))
            .collect()
    }
}
