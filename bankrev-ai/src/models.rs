//! Request/response types of the classification pipeline

use bankrev_common::{RawReview, Sentiment, TopicSentiment};
use serde::{Deserialize, Serialize};

/// Review submitted for classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewInput {
    pub id: i64,
    pub text: String,
}

impl ReviewInput {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// One validated `{topic, sentiment}` element of the model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTopicSentimentPair {
    pub topic: String,
    pub sentiment: Sentiment,
}

impl RawTopicSentimentPair {
    pub fn new(topic: impl Into<String>, sentiment: Sentiment) -> Self {
        Self {
            topic: topic.into(),
            sentiment,
        }
    }
}

/// Outcome of classifying one review, before it is shaped for the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewLabels {
    pub id: i64,
    /// `None` when every attempt failed
    pub pairs: Option<Vec<RawTopicSentimentPair>>,
    /// Attempts made, successful one included
    pub attempts: u32,
}

impl ReviewLabels {
    pub fn succeeded(&self) -> bool {
        self.pairs.is_some()
    }

    /// Normalizer input; a failed review becomes a review with no pairs
    pub fn to_raw_review(&self) -> RawReview {
        let pairs = self
            .pairs
            .iter()
            .flatten()
            .map(|p| TopicSentiment::new(p.topic.clone(), p.sentiment.as_str()))
            .collect();
        RawReview::new(self.id, pairs)
    }
}

/// Prediction API result: parallel topic/sentiment sequences
///
/// Both sequences are empty when the review could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub id: i64,
    pub topics: Vec<String>,
    pub sentiments: Vec<String>,
}

impl ClassificationResult {
    pub fn empty(id: i64) -> Self {
        Self {
            id,
            topics: Vec::new(),
            sentiments: Vec::new(),
        }
    }

    /// Topics verbatim, sentiments as localized display labels
    pub fn from_pairs(id: i64, pairs: &[RawTopicSentimentPair]) -> Self {
        let (topics, sentiments): (Vec<String>, Vec<String>) = pairs
            .iter()
            .map(|p| (p.topic.clone(), p.sentiment.display_label().to_string()))
            .unzip();
        Self {
            id,
            topics,
            sentiments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl From<&ReviewLabels> for ClassificationResult {
    fn from(labels: &ReviewLabels) -> Self {
        match &labels.pairs {
            Some(pairs) => ClassificationResult::from_pairs(labels.id, pairs),
            None => ClassificationResult::empty(labels.id),
        }
    }
}
