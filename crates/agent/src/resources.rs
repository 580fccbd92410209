//! Shared read-only resources and the per-sample environment

use chrono::NaiveDate;
use railsynth_config::{DomainData, GenerationConfig, QaConfig, StationsConfig};
use railsynth_core::{DecisionSource, Result};
use railsynth_tools::{tool_definitions, MockBackend};
use serde_json::Value as JsonValue;

use crate::corpus::{render, CorpusFilter, CorpusIndex};

/// Data loaded once per run and shared by every sample
#[derive(Debug, Clone)]
pub struct Resources {
    pub stations: StationsConfig,
    pub corpus: CorpusIndex,
    pub qa: QaConfig,
    pub backend: MockBackend,
    /// First simulated day
    pub calendar_start: NaiveDate,
    /// Last simulated day, inclusive
    pub calendar_end: NaiveDate,
    /// `tools` array written into every record
    pub tools: JsonValue,
}

impl Resources {
    pub fn new(data: DomainData, calendar_start: NaiveDate, calendar_end: NaiveDate) -> Self {
        Self {
            corpus: CorpusIndex::from_config(&data.corpus),
            stations: data.stations,
            qa: data.qa,
            backend: MockBackend::default(),
            calendar_start,
            calendar_end,
            tools: tool_definitions(),
        }
    }

    /// Built-in catalog, empty corpus, default calendar
    pub fn builtin() -> Self {
        let generation = GenerationConfig::default();
        Self::new(
            DomainData::default(),
            generation.calendar_start,
            generation.calendar_end,
        )
    }

    pub fn with_corpus(mut self, corpus: CorpusIndex) -> Self {
        self.corpus = corpus;
        self
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::builtin()
    }
}

/// What a component sees while building: the sample's decision stream and
/// the shared resources
pub struct Env<'a> {
    pub decisions: &'a mut DecisionSource,
    pub resources: &'a Resources,
}

impl<'a> Env<'a> {
    pub fn new(decisions: &'a mut DecisionSource, resources: &'a Resources) -> Self {
        Self {
            decisions,
            resources,
        }
    }

    /// Draw a raw phrase of `category`
    pub fn phrase(&mut self, category: &str, filter: CorpusFilter<'_>) -> Result<String> {
        self.resources.corpus.phrase(self.decisions, category, filter)
    }

    /// Draw a phrase and fill its placeholders
    pub fn say(&mut self, category: &str, vars: &[(&str, &str)]) -> Result<String> {
        let keys: Vec<String> = vars.iter().map(|(key, _)| format!("{{{}}}", key)).collect();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        let template = self
            .resources
            .corpus
            .phrase(self.decisions, category, CorpusFilter::ANY.supporting(&keys))?;
        render(&template, vars)
    }
}
