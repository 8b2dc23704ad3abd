use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection of a single field's raw input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{label} is required")]
    Required { label: &'static str },
    #[error("{label} must be a number (got '{raw}')")]
    NotANumber { label: &'static str, raw: String },
    #[error("{label} must be between {min} and {max} (got {value})")]
    OutOfRange {
        label: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{label} must be one of {allowed} (got {value})")]
    NotAChoice {
        label: &'static str,
        allowed: String,
        value: f64,
    },
}

/// Body of a failed prediction call. The service may omit `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiErrorBody {
    /// Extracts a non-empty `error` string from a raw response body.
    pub fn message_from_body(body: &str) -> Option<String> {
        serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}

/// A 2xx body that does not describe a prediction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseShapeError {
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
    #[error("prediction class must be 0 or 1 (got {0})")]
    InvalidClass(f64),
    #[error("probability `{name}` is not a finite number")]
    InvalidProbability { name: &'static str },
}
