//! # bankrev Common Library
//!
//! Shared code for the bankrev services:
//! - Error type and configuration loading
//! - Sentiment labels
//! - Topic taxonomy, alias table and the taxonomy normalizer
//! - SQLite store schema and review-topic link persistence

pub mod config;
pub mod db;
pub mod error;
pub mod normalizer;
pub mod sentiment;
pub mod taxonomy;

pub use error::{Error, Result};
pub use normalizer::{NormalizeError, NormalizedReview, Normalizer, RawReview, TopicSentiment};
pub use sentiment::Sentiment;
pub use taxonomy::{AliasMap, Taxonomy};
