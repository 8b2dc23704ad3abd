use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::ApiErrorBody,
    protocol::{PredictionResponse, PredictionResult, ValidatedInput},
};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

pub mod config;
pub mod form;

pub use config::{load_settings, ClientSettings, SettingsError};
pub use form::{FormController, FormState, SubmissionTicket, SubmitAttempt, SubmitOutcome, UiState};

pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to get prediction";
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "Received an unexpected response from the prediction service";

#[derive(Debug, Clone, Error)]
pub enum PredictionError {
    #[error("prediction service unreachable: {0}")]
    Transport(String),
    #[error("prediction service returned status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("prediction service reported failure")]
    Rejected { message: Option<String> },
    #[error("malformed prediction response: {0}")]
    MalformedResponse(String),
}

impl PredictionError {
    /// Text for the error banner. Service-provided `error` strings win over
    /// the generic fallbacks.
    pub fn user_message(&self) -> String {
        match self {
            PredictionError::Status {
                message: Some(message),
                ..
            }
            | PredictionError::Rejected {
                message: Some(message),
            } => message.clone(),
            PredictionError::Transport(_)
            | PredictionError::Status { message: None, .. }
            | PredictionError::Rejected { message: None } => FALLBACK_ERROR_MESSAGE.to_string(),
            PredictionError::MalformedResponse(_) => MALFORMED_RESPONSE_MESSAGE.to_string(),
        }
    }
}

#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, input: &ValidatedInput) -> Result<PredictionResult, PredictionError>;
}

pub struct HttpPredictionClient {
    http: Client,
    endpoint: Url,
}

impl HttpPredictionClient {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        Self::with_endpoint(settings.predict_endpoint()?, settings.timeout())
    }

    pub fn with_endpoint(endpoint: Url, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build prediction http client")?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict(&self, input: &ValidatedInput) -> Result<PredictionResult, PredictionError> {
        info!(endpoint = %self.endpoint, fields = input.len(), "requesting prediction");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(input)
            .send()
            .await
            .map_err(|err| {
                warn!("prediction request failed: {err}");
                PredictionError::Transport(err.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            warn!(status = status.as_u16(), "failed to read prediction response: {err}");
            PredictionError::Transport(err.to_string())
        })?;

        if !status.is_success() {
            let message = ApiErrorBody::message_from_body(&body);
            warn!(
                status = status.as_u16(),
                message = message.as_deref().unwrap_or("<none>"),
                "prediction service returned error status"
            );
            return Err(PredictionError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: PredictionResponse = serde_json::from_str(&body).map_err(|err| {
            warn!("prediction response is not valid json: {err}");
            PredictionError::MalformedResponse(err.to_string())
        })?;

        if parsed.success == Some(false) {
            let message = parsed
                .error
                .map(|message| message.trim().to_string())
                .filter(|message| !message.is_empty());
            warn!("prediction service reported success=false");
            return Err(PredictionError::Rejected { message });
        }

        let result = parsed.into_result().map_err(|err| {
            warn!("prediction response has unexpected shape: {err}");
            PredictionError::MalformedResponse(err.to_string())
        })?;

        info!(
            class = u8::from(result.predicted_class),
            positive = result.probability.positive,
            "prediction received"
        );
        Ok(result)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
