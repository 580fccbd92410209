//! Main settings module

use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{generation, paths, placeholders};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Production,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Skeleton generation
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Domain resource files
    #[serde(default)]
    pub resources: ResourcePaths,

    /// Hydration pass
    #[serde(default)]
    pub hydration: HydrationConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_generation()?;
        self.validate_hydration()?;
        Ok(())
    }

    fn validate_generation(&self) -> Result<(), ConfigError> {
        let generation = &self.generation;

        if generation.count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generation.count".to_string(),
                message: "Must produce at least one sample per scenario".to_string(),
            });
        }

        if generation.calendar_start > generation.calendar_end {
            return Err(ConfigError::InvalidValue {
                field: "generation.calendar_start".to_string(),
                message: format!(
                    "Calendar starts after it ends ({} > {})",
                    generation.calendar_start, generation.calendar_end
                ),
            });
        }

        if generation.output_dir.trim().is_empty() {
            return Err(ConfigError::MissingField("generation.output_dir".to_string()));
        }

        Ok(())
    }

    fn validate_hydration(&self) -> Result<(), ConfigError> {
        if self.hydration.template_path.trim().is_empty() {
            return Err(ConfigError::MissingField("hydration.template_path".to_string()));
        }
        Ok(())
    }
}

/// Skeleton generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Run seed; every sample seed is derived from it
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Samples per scenario
    #[serde(default = "default_count")]
    pub count: u32,

    /// Scenario names to run (empty = all registered scenarios)
    #[serde(default)]
    pub scenarios: Vec<String>,

    /// Generate samples on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// First simulated day
    #[serde(default = "default_calendar_start")]
    pub calendar_start: NaiveDate,

    /// Last simulated day (inclusive)
    #[serde(default = "default_calendar_end")]
    pub calendar_end: NaiveDate,
}

fn default_seed() -> u64 {
    generation::DEFAULT_SEED
}

fn default_count() -> u32 {
    generation::DEFAULT_COUNT
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> String {
    generation::DEFAULT_OUTPUT_DIR.to_string()
}

fn default_calendar_start() -> NaiveDate {
    parse_calendar_day(generation::CALENDAR_START)
}

fn default_calendar_end() -> NaiveDate {
    parse_calendar_day(generation::CALENDAR_END)
}

fn parse_calendar_day(day: &str) -> NaiveDate {
    NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap_or(NaiveDate::MIN)
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            count: default_count(),
            scenarios: Vec::new(),
            parallel: true,
            output_dir: default_output_dir(),
            calendar_start: default_calendar_start(),
            calendar_end: default_calendar_end(),
        }
    }
}

/// Locations of the domain resource files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePaths {
    #[serde(default = "default_stations_path")]
    pub stations: String,

    #[serde(default = "default_corpus_path")]
    pub corpus: String,

    #[serde(default = "default_qa_path")]
    pub qa_pairs: String,
}

fn default_stations_path() -> String {
    paths::STATIONS.to_string()
}

fn default_corpus_path() -> String {
    paths::CORPUS.to_string()
}

fn default_qa_path() -> String {
    paths::QA_PAIRS.to_string()
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            stations: default_stations_path(),
            corpus: default_corpus_path(),
            qa_pairs: default_qa_path(),
        }
    }
}

/// How skeletons are expanded into trainable samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HydrationMode {
    /// One sample per skeleton, context from the first slice
    #[default]
    Whole,
    /// One sample per context slice
    Sliced,
}

impl std::str::FromStr for HydrationMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "whole" => Ok(HydrationMode::Whole),
            "sliced" => Ok(HydrationMode::Sliced),
            other => Err(ConfigError::InvalidValue {
                field: "hydration.mode".to_string(),
                message: format!("Unknown mode '{}', expected 'whole' or 'sliced'", other),
            }),
        }
    }
}

/// Hydration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrationConfig {
    #[serde(default)]
    pub mode: HydrationMode,

    /// Drop `_meta` from hydrated output
    #[serde(default)]
    pub remove_meta: bool,

    /// System prompt template containing the dynamic context placeholder
    #[serde(default = "default_template_path")]
    pub template_path: String,

    /// Optional JSON file replacing the inline tool schemas
    #[serde(default)]
    pub tools_path: Option<String>,

    /// Placeholder substituted with the rendered context blocks
    #[serde(default = "default_context_placeholder")]
    pub context_placeholder: String,
}

fn default_template_path() -> String {
    paths::SYSTEM_PROMPT_TEMPLATE.to_string()
}

fn default_context_placeholder() -> String {
    placeholders::DYN_CONTEXT.to_string()
}

impl Default for HydrationConfig {
    fn default() -> Self {
        Self {
            mode: HydrationMode::default(),
            remove_meta: false,
            template_path: default_template_path(),
            tools_path: None,
            context_placeholder: default_context_placeholder(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Load settings from files and environment
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name("config/default").required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        if env_name.is_empty() || env_name.contains(['/', '\\', '.']) {
            return Err(ConfigError::Environment(format!(
                "invalid environment name '{}'",
                env_name
            )));
        }
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("RAILSYNTH")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
