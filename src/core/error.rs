use thiserror::Error;

use crate::config::config::ConfigError;
use crate::core::record::PasswordId;

/// Failure of a single fetch or reconciliation pass. Every variant is fatal to the invocation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Transport failure or non-success status from Passwordstate.
    #[error("API request failed: {message}")]
    Api {
        status: Option<u16>,
        message: String,
    },
    /// The request succeeded but the service returned no usable record.
    #[error("No data received from API for password ID {0}")]
    NoData(PasswordId),
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl ReconcileError {
    pub fn transport(err: reqwest::Error) -> Self {
        // reqwest keeps the actual cause (refused, timed out, ...) in the source chain.
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ReconcileError::Api {
            status: err.status().map(|s| s.as_u16()),
            message,
        }
    }

    pub fn status(status: reqwest::StatusCode, body: &str) -> Self {
        let body = body.trim();
        let message = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {}", truncate(body, 512))
        };
        ReconcileError::Api {
            status: Some(status.as_u16()),
            message,
        }
    }

    pub fn malformed(context: &str, err: serde_json::Error) -> Self {
        ReconcileError::Api {
            status: None,
            message: format!("{context}: {err}"),
        }
    }
}

impl From<ConfigError> for ReconcileError {
    fn from(err: ConfigError) -> Self {
        ReconcileError::Configuration(err.to_string())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_carries_code_and_body() {
        let err = ReconcileError::status(reqwest::StatusCode::FORBIDDEN, "Invalid API key\n");
        assert_eq!(err.to_string(), "API request failed: HTTP 403 Forbidden: Invalid API key");
        assert!(matches!(err, ReconcileError::Api { status: Some(403), .. }));
    }

    #[test]
    fn empty_body_is_omitted() {
        let err = ReconcileError::status(reqwest::StatusCode::BAD_GATEWAY, "  ");
        assert_eq!(err.to_string(), "API request failed: HTTP 502 Bad Gateway");
    }

    #[test]
    fn no_data_is_distinct_from_api_failure() {
        let msg = ReconcileError::NoData(42).to_string();
        assert!(msg.contains("No data received"));
        assert!(!msg.contains("API request failed"));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(2000);
        let err = ReconcileError::status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert!(err.to_string().len() < 600);
    }
}
