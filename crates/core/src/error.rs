//! Construction-time errors
//!
//! Every variant here is a defect in scenario construction. Simulated backend
//! failures are conversation content and never surface as an `Error`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Illegal action '{action}' in state '{state}'")]
    IllegalAction { state: String, action: String },

    #[error("Missing required argument '{argument}' for tool '{tool}'")]
    MissingArgument { tool: String, argument: String },

    #[error("No corpus entries and no built-in fallback for category '{0}'")]
    MissingFallback(String),

    #[error("Unresolved placeholder in rendered text: {0}")]
    UnresolvedPlaceholder(String),

    #[error("Malformed skeleton: {0}")]
    Structure(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
