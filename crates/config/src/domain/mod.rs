//! Domain resources
//!
//! Read-only data loaded once per run and shared by every sample:
//! - stations.yaml - station catalog
//! - corpus.yaml - utterance phrases by category
//! - qa_pairs.yaml - question/answer pairs
//!
//! Each file is optional; a missing file falls back to the built-in data
//! (an empty corpus means every phrase comes from built-in fallbacks). A file
//! that exists but does not parse is an error.

mod corpus;
mod qa;
mod stations;

pub use corpus::{CorpusConfig, CorpusConfigError, CorpusEntry};
pub use qa::{QaConfig, QaConfigError, QaPair};
pub use stations::{city_of, StationEntry, StationsConfig, StationsConfigError};

use std::path::Path;

use crate::settings::ResourcePaths;
use crate::ConfigError;

/// All domain resources of one run
#[derive(Debug, Clone, Default)]
pub struct DomainData {
    pub stations: StationsConfig,
    pub corpus: CorpusConfig,
    pub qa: QaConfig,
}

impl DomainData {
    /// Load every resource named in `paths`
    pub fn load(paths: &ResourcePaths) -> Result<Self, ConfigError> {
        let mut data = DomainData::default();

        let stations_path = Path::new(&paths.stations);
        if stations_path.exists() {
            data.stations = StationsConfig::load(stations_path)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            tracing::info!(
                stations = data.stations.all().len(),
                major = data.stations.major().len(),
                "Loaded station catalog"
            );
        } else {
            tracing::debug!("No stations config found at {:?}, using built-in catalog", stations_path);
        }

        let corpus_path = Path::new(&paths.corpus);
        if corpus_path.exists() {
            data.corpus = CorpusConfig::load(corpus_path)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            tracing::info!(
                categories = data.corpus.categories.len(),
                entries = data.corpus.total_entries(),
                "Loaded corpus"
            );
        } else {
            tracing::warn!(
                "No corpus found at {:?}, all phrases will use built-in fallbacks",
                corpus_path
            );
        }

        let qa_path = Path::new(&paths.qa_pairs);
        if qa_path.exists() {
            data.qa = QaConfig::load(qa_path).map_err(|e| ConfigError::ParseError(e.to_string()))?;
            tracing::info!(pairs = data.qa.pairs.len(), "Loaded Q&A pairs");
        } else {
            tracing::debug!("No Q&A pairs found at {:?}, using built-in pairs", qa_path);
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_files_use_builtins() {
        let paths = ResourcePaths {
            stations: "does/not/exist/stations.yaml".into(),
            corpus: "does/not/exist/corpus.yaml".into(),
            qa_pairs: "does/not/exist/qa.yaml".into(),
        };
        let data = DomainData::load(&paths).unwrap();
        assert!(!data.stations.all().is_empty());
        assert_eq!(data.corpus.total_entries(), 0);
        assert!(!data.qa.pairs.is_empty());
    }

    #[test]
    fn test_loads_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.yaml");
        let mut file = std::fs::File::create(&corpus_path).unwrap();
        writeln!(file, "categories:\n  greetings:\n    - \"Ciao!\"").unwrap();

        let paths = ResourcePaths {
            stations: dir.path().join("none.yaml").display().to_string(),
            corpus: corpus_path.display().to_string(),
            qa_pairs: dir.path().join("none.yaml").display().to_string(),
        };
        let data = DomainData::load(&paths).unwrap();
        assert_eq!(data.corpus.category("greetings")[0].text(), "Ciao!");
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let stations_path = dir.path().join("stations.yaml");
        std::fs::write(&stations_path, "stations: {").unwrap();

        let paths = ResourcePaths {
            stations: stations_path.display().to_string(),
            ..ResourcePaths::default()
        };
        assert!(matches!(DomainData::load(&paths), Err(ConfigError::ParseError(_))));
    }
}
