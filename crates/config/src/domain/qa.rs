//! Question/answer pairs for content-only exchanges

use serde::{Deserialize, Serialize};
use std::path::Path;

/// One customer question with the assistant's answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

impl QaPair {
    pub fn new(question: &str, answer: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }
}

/// Q&A configuration loaded from qa_pairs.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaConfig {
    pub pairs: Vec<QaPair>,
}

impl Default for QaConfig {
    fn default() -> Self {
        let pairs = [
            (
                "Come funziona CartaFRECCIA? Quanti punti accumulo?",
                "😊 Con CartaFRECCIA accumuli 1 punto ogni euro speso sui treni Frecce! 🙂 Con 1000 punti hai un biglietto omaggio.",
            ),
            (
                "Se il treno è in ritardo, ho diritto al rimborso?",
                "😊 Sì! Per ritardi oltre 60 minuti hai diritto a un indennizzo. 🙂 25% del prezzo tra 60 e 119 minuti, 50% oltre i 120 minuti.",
            ),
            (
                "Posso cedere il mio biglietto a un'altra persona?",
                "😔 No, i biglietti nominativi non sono cedibili. 🙂 Puoi però cambiare il nome dell'intestatario una sola volta prima della partenza.",
            ),
            (
                "Posso portare il mio gatto sul Frecciarossa?",
                "😊 Certo! Gatti e cani piccoli viaggiano gratis nel trasportino. 🙂 Per cani più grandi serve un biglietto a metà prezzo della seconda classe.",
            ),
            (
                "Quanti bagagli posso portare a bordo gratuitamente?",
                "😊 Un bagaglio a mano più uno di dimensioni standard. 🙂 Trolley, zaino e borsetta vanno benissimo!",
            ),
            (
                "C'è il WiFi gratuito sui treni Freccia?",
                "😊 Sì! Tutti i Frecciarossa e Frecciargento hanno WiFi gratuito. 🙂 Ogni posto ha anche una presa elettrica.",
            ),
            (
                "Ci sono sconti per bambini sui treni Freccia?",
                "😊 Sì, c'è l'offerta Bimbi Gratis! 🙂 Fino a 14 anni viaggiano gratis con almeno un adulto pagante.",
            ),
            (
                "Cosa sono le Sale Blu e come funzionano?",
                "😊 Le Sale Blu assistono i viaggiatori con disabilità e mobilità ridotta. 🙂 Il servizio è gratuito, prenota almeno 12 ore prima.",
            ),
        ];
        Self {
            pairs: pairs.iter().map(|(q, a)| QaPair::new(q, a)).collect(),
        }
    }
}

impl QaConfig {
    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, QaConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            QaConfigError::FileNotFound(path.as_ref().display().to_string(), e.to_string())
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, QaConfigError> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| QaConfigError::ParseError(e.to_string()))?;
        if config.pairs.is_empty() {
            return Err(QaConfigError::ParseError("no Q&A pairs defined".to_string()));
        }
        Ok(config)
    }
}

/// Errors when loading Q&A pairs
#[derive(Debug)]
pub enum QaConfigError {
    FileNotFound(String, String),
    ParseError(String),
}

impl std::fmt::Display for QaConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileNotFound(path, err) => write!(f, "Q&A pairs not found at {}: {}", path, err),
            Self::ParseError(err) => write!(f, "Failed to parse Q&A pairs: {}", err),
        }
    }
}

impl std::error::Error for QaConfigError {}
