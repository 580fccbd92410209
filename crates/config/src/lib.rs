//! Configuration management for railsynth
//!
//! Supports loading configuration from:
//! - YAML files (config/default, config/{env})
//! - Environment variables (RAILSYNTH__ prefix)
//!
//! # Domain Resources
//!
//! Station catalog, utterance corpus and Q&A pairs live in config/data/ and
//! are loaded through [`DomainData`].

pub mod constants;
pub mod domain;
pub mod settings;

pub use domain::{
    city_of, CorpusConfig, CorpusConfigError, CorpusEntry, DomainData, QaConfig, QaConfigError,
    QaPair, StationEntry, StationsConfig, StationsConfigError,
};
pub use settings::{
    load_settings, GenerationConfig, HydrationConfig, HydrationMode, ObservabilityConfig,
    ResourcePaths, RuntimeEnvironment, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
