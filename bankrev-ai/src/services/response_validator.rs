//! Structural validation of decoded model output
//!
//! Accepted shape: a JSON array whose elements are objects with exactly the
//! keys `topic` (string) and `sentiment` (`positive`, `negative` or
//! `neutral`). Anything else rejects the whole attempt.
//!
//! This is stricter than a keys-only check: a non-string `topic` (number,
//! null, list) fails the attempt instead of being passed through, because
//! results carry topics as strings.

use bankrev_common::Sentiment;
use serde_json::Value;
use thiserror::Error;

use crate::models::RawTopicSentimentPair;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("expected a JSON array, got {0}")]
    NotAnArray(&'static str),

    #[error("element {index} is {found}, expected an object")]
    NotAnObject { index: usize, found: &'static str },

    #[error("element {index} must have exactly the keys 'topic' and 'sentiment', found {keys:?}")]
    WrongKeys { index: usize, keys: Vec<String> },

    #[error("element {index}: topic is {found}, expected a string")]
    TopicNotString { index: usize, found: &'static str },

    #[error("element {index}: unknown sentiment {value}")]
    UnknownSentiment { index: usize, value: String },
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Validate decoded output and convert it to typed pairs, preserving order
pub fn validate_pairs(value: &Value) -> Result<Vec<RawTopicSentimentPair>, ValidationError> {
    let elements = value
        .as_array()
        .ok_or_else(|| ValidationError::NotAnArray(json_type_name(value)))?;

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| validate_element(index, element))
        .collect()
}

fn validate_element(index: usize, element: &Value) -> Result<RawTopicSentimentPair, ValidationError> {
    let object = element.as_object().ok_or(ValidationError::NotAnObject {
        index,
        found: json_type_name(element),
    })?;

    let (Some(topic), Some(sentiment)) = (object.get("topic"), object.get("sentiment")) else {
        return Err(wrong_keys(index, object));
    };
    if object.len() != 2 {
        return Err(wrong_keys(index, object));
    }

    let topic = topic.as_str().ok_or(ValidationError::TopicNotString {
        index,
        found: json_type_name(topic),
    })?;

    let sentiment = sentiment
        .as_str()
        .and_then(|s| s.parse::<Sentiment>().ok())
        .ok_or_else(|| ValidationError::UnknownSentiment {
            index,
            value: sentiment.to_string(),
        })?;

    Ok(RawTopicSentimentPair::new(topic, sentiment))
}

fn wrong_keys(index: usize, object: &serde_json::Map<String, Value>) -> ValidationError {
    ValidationError::WrongKeys {
        index,
        keys: object.keys().cloned().collect(),
    }
}
