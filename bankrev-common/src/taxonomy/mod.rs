//! Two-level product topic taxonomy and the alias table
//!
//! Both tables are read-only after construction and are shared between
//! handlers behind an `Arc`. They come either from the built-in data in
//! [`defaults`] or from a TOML file:
//!
//! ```toml
//! [[topic]]
//! name = "Кредиты"
//! subtopics = ["Кредит наличными", "Дачный кредит"]
//!
//! [aliases]
//! "Кредитование" = "Кредиты"
//! ```

pub mod defaults;

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Taxonomy loading/validation errors
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("Topic name must not be empty (top-level topic #{0})")]
    EmptyTopicName(usize),

    #[error("Subtopic name must not be empty (under '{0}')")]
    EmptySubtopicName(String),

    #[error("Duplicate top-level topic: {0}")]
    DuplicateTopic(String),

    #[error("Alias '{alias}' points to '{target}', which is not a taxonomy topic")]
    UnknownAliasTarget { alias: String, target: String },

    #[error("Failed to read taxonomy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse taxonomy file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level topic with its subtopics, as written in configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TopicNode {
    pub name: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

impl TopicNode {
    pub fn new(name: impl Into<String>, subtopics: &[&str]) -> Self {
        Self {
            name: name.into(),
            subtopics: subtopics.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Fixed two-level topic tree
///
/// Top-level order is preserved; it decides the order in which parents of a
/// shared subtopic are reported.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    topics: Vec<TopicNode>,
    top_level: HashSet<String>,
    /// subtopic name -> parent top-level names, in taxonomy order
    parents: HashMap<String, Vec<String>>,
}

impl Taxonomy {
    pub fn new(topics: Vec<TopicNode>) -> Result<Self, TaxonomyError> {
        let mut top_level = HashSet::new();
        let mut parents: HashMap<String, Vec<String>> = HashMap::new();

        for (index, node) in topics.iter().enumerate() {
            if node.name.trim().is_empty() {
                return Err(TaxonomyError::EmptyTopicName(index));
            }
            if !top_level.insert(node.name.clone()) {
                return Err(TaxonomyError::DuplicateTopic(node.name.clone()));
            }
            for subtopic in &node.subtopics {
                if subtopic.trim().is_empty() {
                    return Err(TaxonomyError::EmptySubtopicName(node.name.clone()));
                }
                let entry = parents.entry(subtopic.clone()).or_default();
                if !entry.contains(&node.name) {
                    entry.push(node.name.clone());
                }
            }
        }

        Ok(Self {
            topics,
            top_level,
            parents,
        })
    }

    /// Top-level topics in taxonomy order
    pub fn topics(&self) -> &[TopicNode] {
        &self.topics
    }

    pub fn is_top_level(&self, name: &str) -> bool {
        self.top_level.contains(name)
    }

    /// True for any top-level or subtopic name
    pub fn contains(&self, name: &str) -> bool {
        self.top_level.contains(name) || self.parents.contains_key(name)
    }

    /// Parent topics of a subtopic (empty if `name` is not a subtopic)
    pub fn parents_of(&self, name: &str) -> &[String] {
        self.parents.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve a topic string to canonical taxonomy names
    ///
    /// - top-level match: `[name]`
    /// - subtopic match: all parents, then the subtopic itself if `include_subtopic`
    /// - no match: empty
    pub fn resolve(&self, name: &str, include_subtopic: bool) -> Vec<String> {
        if self.top_level.contains(name) {
            return vec![name.to_string()];
        }

        match self.parents.get(name) {
            Some(parents) => {
                let mut resolved = parents.clone();
                if include_subtopic {
                    resolved.push(name.to_string());
                }
                resolved
            }
            None => Vec::new(),
        }
    }

    /// Every distinct name (top-level first, then its subtopics), in taxonomy order
    pub fn all_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for node in &self.topics {
            if seen.insert(node.name.as_str()) {
                names.push(node.name.as_str());
            }
            for subtopic in &node.subtopics {
                if seen.insert(subtopic.as_str()) {
                    names.push(subtopic.as_str());
                }
            }
        }
        names
    }
}

/// Deprecated/alias topic string -> canonical topic string
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    map: HashMap<String, String>,
}

impl AliasMap {
    pub fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    /// Single substitution; aliases are never chained
    pub fn resolve<'a>(&'a self, topic: &'a str) -> &'a str {
        self.map.get(topic).map(String::as_str).unwrap_or(topic)
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.map.get(alias).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Reject aliases whose target is not a taxonomy name
    pub fn validate_against(&self, taxonomy: &Taxonomy) -> Result<(), TaxonomyError> {
        // Sorted so the reported error is deterministic
        let mut entries: Vec<_> = self.map.iter().collect();
        entries.sort();
        for (alias, target) in entries {
            if !taxonomy.contains(target) {
                return Err(TaxonomyError::UnknownAliasTarget {
                    alias: alias.clone(),
                    target: target.clone(),
                });
            }
        }
        Ok(())
    }
}

/// On-disk taxonomy file layout
#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    #[serde(default, rename = "topic")]
    topics: Vec<TopicNode>,
    #[serde(default)]
    aliases: HashMap<String, String>,
}

/// Parse taxonomy + aliases from TOML text and validate them together
pub fn parse_taxonomy(content: &str) -> Result<(Taxonomy, AliasMap), TaxonomyError> {
    let file: TaxonomyFile = toml::from_str(content)?;
    let taxonomy = Taxonomy::new(file.topics)?;
    let aliases = AliasMap::new(file.aliases);
    aliases.validate_against(&taxonomy)?;
    Ok((taxonomy, aliases))
}

/// Load taxonomy from a TOML file, or the built-in tables when `path` is `None`
pub fn load_taxonomy(path: Option<&Path>) -> Result<(Taxonomy, AliasMap), TaxonomyError> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            let (taxonomy, aliases) = parse_taxonomy(&content)?;
            info!(
                path = %path.display(),
                topics = taxonomy.topics().len(),
                aliases = aliases.len(),
                "Loaded taxonomy from file"
            );
            Ok((taxonomy, aliases))
        }
        None => {
            let taxonomy = defaults::default_taxonomy();
            let aliases = defaults::default_aliases();
            info!(
                topics = taxonomy.topics().len(),
                aliases = aliases.len(),
                "Using built-in taxonomy"
            );
            Ok((taxonomy, aliases))
        }
    }
}
