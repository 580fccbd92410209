//! Station catalog
//!
//! Stations are referenced by their canonical full name in tool arguments
//! and context blocks; users may refer to them by city.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Cities whose name spans more than one word
const MULTI_WORD_CITIES: &[&str] = &[
    "Reggio Calabria",
    "Reggio Emilia",
    "La Spezia",
    "Lamezia Terme",
    "Villa San Giovanni",
    "Ascoli Piceno",
    "Castellammare di Stabia",
];

/// One station of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationEntry {
    /// Canonical full name, e.g. "Milano Centrale"
    pub name: String,
    /// City name users say; derived from the name when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Major stations host kiosks
    #[serde(default)]
    pub major: bool,
}

impl StationEntry {
    pub fn new(name: &str, city: &str, major: bool) -> Self {
        Self {
            name: name.to_string(),
            city: Some(city.to_string()),
            major,
        }
    }

    /// City this station belongs to
    pub fn city(&self) -> &str {
        match &self.city {
            Some(city) => city,
            None => city_of(&self.name),
        }
    }
}

impl fmt::Display for StationEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// City part of a canonical station name
pub fn city_of(name: &str) -> &str {
    if let Some(city) = MULTI_WORD_CITIES
        .iter()
        .find(|city| name == **city || name.starts_with(&format!("{} ", city)))
    {
        return &name[..city.len()];
    }
    name.split_whitespace().next().unwrap_or(name)
}

/// Station catalog loaded from stations.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsConfig {
    pub stations: Vec<StationEntry>,
}

impl Default for StationsConfig {
    fn default() -> Self {
        let stations = [
            ("Roma Termini", "Roma", true),
            ("Milano Centrale", "Milano", true),
            ("Napoli Centrale", "Napoli", true),
            ("Firenze Santa Maria Novella", "Firenze", true),
            ("Torino Porta Nuova", "Torino", true),
            ("Venezia Santa Lucia", "Venezia", true),
            ("Bologna Centrale", "Bologna", true),
            ("Verona Porta Nuova", "Verona", true),
            ("Genova Piazza Principe", "Genova", true),
            ("Bari Centrale", "Bari", true),
            ("Roma Tiburtina", "Roma", false),
            ("Milano Porta Garibaldi", "Milano", false),
            ("Salerno", "Salerno", false),
            ("Padova", "Padova", false),
            ("Pisa Centrale", "Pisa", false),
            ("Reggio Calabria Centrale", "Reggio Calabria", false),
            ("Trieste Centrale", "Trieste", false),
            ("Brescia", "Brescia", false),
            ("Ancona", "Ancona", false),
            ("La Spezia Centrale", "La Spezia", false),
        ];
        Self {
            stations: stations
                .iter()
                .map(|(name, city, major)| StationEntry::new(name, city, *major))
                .collect(),
        }
    }
}

impl StationsConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StationsConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            StationsConfigError::FileNotFound(path.as_ref().display().to_string(), e.to_string())
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, StationsConfigError> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| StationsConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// At least two stations, at least one major, unique names
    pub fn validate(&self) -> Result<(), StationsConfigError> {
        if self.stations.len() < 2 {
            return Err(StationsConfigError::Invalid(
                "catalog needs at least two stations".to_string(),
            ));
        }
        if !self.stations.iter().any(|s| s.major) {
            return Err(StationsConfigError::Invalid(
                "catalog needs at least one major station".to_string(),
            ));
        }
        for (i, station) in self.stations.iter().enumerate() {
            if self.stations[..i].iter().any(|s| s.name == station.name) {
                return Err(StationsConfigError::Invalid(format!(
                    "duplicate station '{}'",
                    station.name
                )));
            }
        }
        Ok(())
    }

    pub fn all(&self) -> &[StationEntry] {
        &self.stations
    }

    /// Stations that host kiosks
    pub fn major(&self) -> Vec<&StationEntry> {
        self.stations.iter().filter(|s| s.major).collect()
    }

    pub fn get(&self, name: &str) -> Option<&StationEntry> {
        self.stations.iter().find(|s| s.name == name)
    }

    /// Resolve what a user said to a canonical station.
    ///
    /// Full names match exactly; a bare city resolves to the first catalog
    /// station of that city, so catalog order defines the main station.
    pub fn resolve(&self, mention: &str) -> Option<&StationEntry> {
        let mention = mention.trim();
        self.stations
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(mention))
            .or_else(|| {
                self.stations
                    .iter()
                    .find(|s| s.city().eq_ignore_ascii_case(mention))
            })
    }
}

/// Errors when loading the station catalog
#[derive(Debug)]
pub enum StationsConfigError {
    FileNotFound(String, String),
    ParseError(String),
    Invalid(String),
}

impl std::fmt::Display for StationsConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileNotFound(path, err) => {
                write!(f, "Stations config not found at {}: {}", path, err)
            }
            Self::ParseError(err) => write!(f, "Failed to parse stations config: {}", err),
            Self::Invalid(err) => write!(f, "Invalid stations config: {}", err),
        }
    }
}

impl std::error::Error for StationsConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_heuristic() {
        assert_eq!(city_of("Milano Centrale"), "Milano");
        assert_eq!(city_of("Reggio Calabria Centrale"), "Reggio Calabria");
        assert_eq!(city_of("La Spezia Centrale"), "La Spezia");
        assert_eq!(city_of("Salerno"), "Salerno");
    }

    #[test]
    fn test_resolve_city_to_main_station() {
        let stations = StationsConfig::default();
        assert_eq!(stations.resolve("Milano").unwrap().name, "Milano Centrale");
        assert_eq!(stations.resolve("roma").unwrap().name, "Roma Termini");
        assert_eq!(
            stations.resolve("Roma Tiburtina").unwrap().name,
            "Roma Tiburtina"
        );
        assert!(stations.resolve("Parigi").is_none());
    }

    #[test]
    fn test_stations_deserialization() {
        let yaml = r#"
stations:
  - name: "Torino Porta Susa"
    major: true
  - name: "Reggio Emilia AV Mediopadana"
  - name: "Lecce"
    city: "Lecce"
"#;
        let config = StationsConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.all().len(), 3);
        assert_eq!(config.major().len(), 1);
        assert_eq!(config.all()[0].city(), "Torino");
        assert_eq!(config.all()[1].city(), "Reggio Emilia");
    }

    #[test]
    fn test_catalog_without_major_rejected() {
        let yaml = r#"
stations:
  - name: "Lecce"
  - name: "Brindisi"
"#;
        assert!(matches!(
            StationsConfig::from_yaml_str(yaml),
            Err(StationsConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let stations = StationsConfig::default();
        assert!(stations.validate().is_ok());
        assert!(stations.major().len() >= 2);
    }
}
