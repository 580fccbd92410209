//! Utterance corpus file
//!
//! Maps an utterance category to an ordered list of phrases. A phrase is
//! either a bare string or `{text, continuation}` when it must be tagged
//! explicitly as implying earlier conversation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One corpus phrase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorpusEntry {
    Text(String),
    Tagged {
        text: String,
        #[serde(default)]
        continuation: Option<bool>,
    },
}

impl CorpusEntry {
    pub fn text(&self) -> &str {
        match self {
            CorpusEntry::Text(text) => text,
            CorpusEntry::Tagged { text, .. } => text,
        }
    }

    /// Explicit continuation tag, if the file carries one
    pub fn continuation(&self) -> Option<bool> {
        match self {
            CorpusEntry::Text(_) => None,
            CorpusEntry::Tagged { continuation, .. } => *continuation,
        }
    }
}

/// Corpus configuration loaded from corpus.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<CorpusEntry>>,
}

impl CorpusConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CorpusConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CorpusConfigError::FileNotFound(path.as_ref().display().to_string(), e.to_string())
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, CorpusConfigError> {
        serde_yaml::from_str(content).map_err(|e| CorpusConfigError::ParseError(e.to_string()))
    }

    pub fn category(&self, name: &str) -> &[CorpusEntry] {
        self.categories.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    pub fn total_entries(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

/// Errors when loading the corpus
#[derive(Debug)]
pub enum CorpusConfigError {
    FileNotFound(String, String),
    ParseError(String),
}

impl std::fmt::Display for CorpusConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileNotFound(path, err) => write!(f, "Corpus not found at {}: {}", path, err),
            Self::ParseError(err) => write!(f, "Failed to parse corpus: {}", err),
        }
    }
}

impl std::error::Error for CorpusConfigError {}
