//! Events sent from the prediction worker back to the UI thread.

use client_core::{PredictionError, SubmissionTicket};
use shared::protocol::PredictionResult;

pub enum UiEvent {
    PredictionFinished {
        ticket: SubmissionTicket,
        outcome: Result<PredictionResult, PredictionError>,
    },
    BackendUnavailable(String),
}
