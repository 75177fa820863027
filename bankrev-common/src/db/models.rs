//! Row types for the store

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `reviews` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub site_specific_id: Option<i64>,
    /// Site the review was collected from
    pub source: Option<String>,
    pub date: Option<NaiveDate>,
    pub review_text: Option<String>,
    pub rating: Option<f64>,
    /// Product/topic labels assigned by the source site itself
    pub source_topic: Option<String>,
    pub source_subtopic: Option<String>,
}

impl Review {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            site_specific_id: None,
            source: None,
            date: None,
            review_text: Some(text.into()),
            rating: None,
            source_topic: None,
            source_subtopic: None,
        }
    }
}

/// `topics` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Topic {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// `reviews_topics` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewTopicLink {
    pub id: i64,
    pub review_id: i64,
    pub topic_id: i64,
    pub sentiment: String,
}
