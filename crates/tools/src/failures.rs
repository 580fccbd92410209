//! Simulated backend failures
//!
//! A failure is ordinary conversation content: the tool message carries the
//! error payload and the interface state stays where it was.

use serde_json::{json, Value as JsonValue};

/// Failure payloads the mock backend can return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendFailure {
    InternalError,
    Timeout { seconds: u32 },
    NoTrainsAfter { time: String },
    NoDirectConnection { hub: String },
    ServiceUnavailable { until: String },
    RateLimited { wait_seconds: u32 },
    PaymentGatewayTimeout,
}

impl BackendFailure {
    pub fn code(&self) -> &'static str {
        match self {
            BackendFailure::InternalError => "internal_error",
            BackendFailure::Timeout { .. } => "timeout",
            BackendFailure::NoTrainsAfter { .. } => "no_trains",
            BackendFailure::NoDirectConnection { .. } => "no_direct_connection",
            BackendFailure::ServiceUnavailable { .. } => "service_unavailable",
            BackendFailure::RateLimited { .. } => "rate_limited",
            BackendFailure::PaymentGatewayTimeout => "payment_gateway_timeout",
        }
    }

    pub fn message(&self) -> String {
        match self {
            BackendFailure::InternalError => "An internal error occurred".to_string(),
            BackendFailure::Timeout { seconds } => {
                format!("Request timeout after {}s - server overloaded", seconds)
            }
            BackendFailure::NoTrainsAfter { time } => format!("No trains available after {}", time),
            BackendFailure::NoDirectConnection { hub } => {
                format!("No direct trains. Suggested hub: {}", hub)
            }
            BackendFailure::ServiceUnavailable { until } => {
                format!("Scheduled maintenance until {}", until)
            }
            BackendFailure::RateLimited { wait_seconds } => {
                format!("Too many requests. Please wait {} seconds", wait_seconds)
            }
            BackendFailure::PaymentGatewayTimeout => {
                "Payment gateway did not respond in time. No charge was made.".to_string()
            }
        }
    }

    /// Tool message payload
    pub fn response(&self) -> JsonValue {
        match self {
            BackendFailure::NoTrainsAfter { .. } => json!({
                "trains": [],
                "message": self.message(),
            }),
            _ => json!({
                "error": self.code(),
                "message": self.message(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_trains_is_an_empty_result() {
        let failure = BackendFailure::NoTrainsAfter {
            time: "22:00".into(),
        };
        let response = failure.response();
        assert!(response["trains"].as_array().unwrap().is_empty());
        assert_eq!(response["message"], "No trains available after 22:00");
    }

    #[test]
    fn test_error_payloads_carry_code() {
        let failure = BackendFailure::NoDirectConnection {
            hub: "Bologna Centrale".into(),
        };
        assert_eq!(failure.response()["error"], "no_direct_connection");
        assert_eq!(
            BackendFailure::PaymentGatewayTimeout.response()["error"],
            "payment_gateway_timeout"
        );
    }
}
