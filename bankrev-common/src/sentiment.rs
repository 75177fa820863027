//! Sentiment polarity attached to a (review, topic) pair

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three polarity labels the model is trained to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// All variants in dashboard display order
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    /// Wire/storage value ("positive", "negative", "neutral")
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Localized label returned by the prediction API
    pub fn display_label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "положительно",
            Sentiment::Negative => "отрицательно",
            Sentiment::Neutral => "нейтрально",
        }
    }

    /// Plural series name used by the dashboard charts
    pub fn series_name(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Позитивные",
            Sentiment::Negative => "Негативные",
            Sentiment::Neutral => "Нейтральные",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    /// Exact, case-sensitive match on the wire value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(format!("unknown sentiment: {}", other)),
        }
    }
}
