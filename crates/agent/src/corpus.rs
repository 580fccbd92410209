//! Corpus index
//!
//! Read-only view of the utterance corpus. Lookups return candidates in file
//! order so index-based draws stay reproducible; an empty category falls back
//! to the built-in phrases and the fallback is logged as a decision.

use once_cell::sync::Lazy;
use railsynth_config::CorpusConfig;
use railsynth_core::{DecisionSource, Error, Result};
use regex::Regex;
use std::collections::BTreeMap;

use crate::phrases;

/// `{name}` placeholders in corpus templates
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[a-z_]+\}").expect("placeholder pattern is valid"));

/// Openers that imply earlier conversation
const CONTINUATION_PREFIXES: &[&str] = &[
    "Ah ", "Allora ", "Ok ", "Comunque ", "Sì ", "Si ", "No ", "E ", "Scusa ", "Grazie ",
    "Perfetto ", "Bene ",
];

const CONTINUATION_MARKERS: &[&str] = &["capito", "capisco"];

/// Whether a phrase only makes sense as a follow-up
pub fn is_continuation(text: &str) -> bool {
    let text = text.trim();
    if CONTINUATION_PREFIXES.iter().any(|p| text.starts_with(p)) {
        return true;
    }
    let lower = text.to_lowercase();
    CONTINUATION_MARKERS.iter().any(|m| lower.contains(m))
}

/// Placeholders used by a template, e.g. `["{destination}"]`
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER.find_iter(template).map(|m| m.as_str()).collect()
}

/// Substitute `{key}` placeholders; anything left unresolved is an error
pub fn render(template: &str, vars: &[(&str, &str)]) -> Result<String> {
    let mut text = template.to_string();
    for (key, value) in vars {
        text = text.replace(&format!("{{{}}}", key), value);
    }
    match PLACEHOLDER.find(&text) {
        Some(found) => Err(Error::UnresolvedPlaceholder(format!(
            "{} in '{}'",
            found.as_str(),
            text
        ))),
        None => Ok(text),
    }
}

/// Corpus phrase with its continuation tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusPhrase {
    pub text: String,
    pub continuation: bool,
}

/// Restriction applied to a category lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusFilter<'a> {
    /// Exclude continuation phrases
    pub fresh_topic: bool,
    /// Keep only phrases containing this placeholder
    pub requires: Option<&'a str>,
    /// Phrases using placeholders outside this set cannot be rendered and are
    /// dropped before any other filtering
    pub supported: Option<&'a [&'a str]>,
}

impl<'a> CorpusFilter<'a> {
    pub const ANY: CorpusFilter<'static> = CorpusFilter {
        fresh_topic: false,
        requires: None,
        supported: None,
    };

    pub fn fresh(fresh_topic: bool) -> Self {
        Self {
            fresh_topic,
            ..Default::default()
        }
    }

    pub fn requiring(mut self, placeholder: &'a str) -> Self {
        self.requires = Some(placeholder);
        self
    }

    pub fn supporting(mut self, placeholders: &'a [&'a str]) -> Self {
        self.supported = Some(placeholders);
        self
    }

    fn renderable(&self, text: &str) -> bool {
        match self.supported {
            Some(supported) => placeholders(text).iter().all(|p| supported.contains(p)),
            None => true,
        }
    }

    fn matches(&self, phrase: &CorpusPhrase) -> bool {
        if self.fresh_topic && phrase.continuation {
            return false;
        }
        match self.requires {
            Some(placeholder) => phrase.text.contains(placeholder),
            None => true,
        }
    }
}

/// Category-indexed corpus
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    categories: BTreeMap<String, Vec<CorpusPhrase>>,
}

impl CorpusIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CorpusConfig) -> Self {
        let categories = config
            .categories
            .iter()
            .map(|(name, entries)| {
                let phrases = entries
                    .iter()
                    .map(|entry| CorpusPhrase {
                        text: entry.text().to_string(),
                        continuation: entry
                            .continuation()
                            .unwrap_or_else(|| is_continuation(entry.text())),
                    })
                    .collect();
                (name.clone(), phrases)
            })
            .collect();
        Self { categories }
    }

    /// Add or replace a category with untagged phrases
    pub fn with_category(mut self, name: &str, phrases: &[&str]) -> Self {
        let phrases = phrases
            .iter()
            .map(|text| CorpusPhrase {
                text: text.to_string(),
                continuation: is_continuation(text),
            })
            .collect();
        self.categories.insert(name.to_string(), phrases);
        self
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ordered candidates of a category under `filter`.
    ///
    /// When the filter removes every renderable phrase, the renderable list
    /// is returned unfiltered. Unknown and empty categories yield nothing.
    pub fn get(&self, category: &str, filter: CorpusFilter<'_>) -> Vec<&str> {
        let renderable: Vec<&CorpusPhrase> = self
            .categories
            .get(category)
            .map(|phrases| phrases.iter().filter(|p| filter.renderable(&p.text)).collect())
            .unwrap_or_default();

        let filtered: Vec<&str> = renderable
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.text.as_str())
            .collect();

        if filtered.is_empty() {
            renderable.iter().map(|p| p.text.as_str()).collect()
        } else {
            filtered
        }
    }

    /// Draw one phrase, falling back to the built-in list for the category
    pub fn phrase(
        &self,
        decisions: &mut DecisionSource,
        category: &str,
        filter: CorpusFilter<'_>,
    ) -> Result<String> {
        self.phrase_where(decisions, category, filter, |_| true)
    }

    /// Like [`phrase`](Self::phrase) with a hard predicate on candidates.
    ///
    /// Phrases rejected by `keep` are never drawn, even when that leaves only
    /// the built-in list.
    pub fn phrase_where<F>(
        &self,
        decisions: &mut DecisionSource,
        category: &str,
        filter: CorpusFilter<'_>,
        keep: F,
    ) -> Result<String>
    where
        F: Fn(&str) -> bool,
    {
        let candidates: Vec<&str> = self
            .get(category, filter)
            .into_iter()
            .filter(|text| keep(*text))
            .collect();
        if !candidates.is_empty() {
            return Ok(decisions.choose(category, &candidates).to_string());
        }

        let builtin = phrases::fallback(category)
            .ok_or_else(|| Error::MissingFallback(category.to_string()))?;
        let builtin: Vec<&str> = builtin
            .iter()
            .copied()
            .filter(|text| filter.renderable(text) && keep(*text))
            .collect();
        let preferred: Vec<&str> = builtin
            .iter()
            .copied()
            .filter(|text| {
                filter.matches(&CorpusPhrase {
                    text: text.to_string(),
                    continuation: is_continuation(text),
                })
            })
            .collect();
        let pool = if preferred.is_empty() { builtin } else { preferred };
        if pool.is_empty() {
            return Err(Error::MissingFallback(category.to_string()));
        }

        let (text, _) = decisions.next_choice(&format!("builtin:{}", category), &pool);
        let text = text.to_string();
        decisions.record_fallback(category, &text);
        tracing::debug!(category, phrase = %text, "Corpus category empty, using built-in phrase");
        Ok(text)
    }
}
