//! Form controller: raw field input, validation, and the four-state
//! submission lifecycle.

use std::collections::BTreeMap;

use shared::{
    domain::FieldKey,
    error::ValidationError,
    protocol::{PredictionResult, ValidatedInput},
};
use tracing::{debug, info, warn};

use crate::{PredictionError, PredictionService};

/// Raw text of every field, keyed by field. Always holds all thirteen keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    values: BTreeMap<FieldKey, String>,
}

impl FormState {
    pub fn empty() -> Self {
        Self {
            values: FieldKey::ALL
                .into_iter()
                .map(|key| (key, String::new()))
                .collect(),
        }
    }

    pub fn value(&self, key: FieldKey) -> &str {
        self.values.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn set(&mut self, key: FieldKey, raw: impl Into<String>) {
        self.values.insert(key, raw.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(String::is_empty)
    }

    pub fn validate(&self) -> Result<ValidatedInput, BTreeMap<FieldKey, ValidationError>> {
        ValidatedInput::validate(&self.values)
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum UiState {
    #[default]
    Idle,
    Loading,
    Error(String),
    Result(PredictionResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionTicket(pub u64);

#[derive(Debug)]
pub enum SubmitAttempt {
    /// A request is already in flight; nothing changed.
    Busy,
    /// Validation failed; field errors were recorded and no request is due.
    Rejected { invalid_fields: usize },
    /// State moved to `Loading`; the caller owes exactly one request.
    Dispatched {
        ticket: SubmissionTicket,
        input: ValidatedInput,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Busy,
    Rejected,
    Completed,
}

#[derive(Debug, Default)]
pub struct FormController {
    form: FormState,
    field_errors: BTreeMap<FieldKey, ValidationError>,
    state: UiState,
    in_flight: Option<SubmissionTicket>,
    next_ticket: u64,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn value(&self, key: FieldKey) -> &str {
        self.form.value(key)
    }

    /// Stores raw input. A pending error on the edited field is cleared.
    pub fn set_value(&mut self, key: FieldKey, raw: impl Into<String>) {
        self.form.set(key, raw);
        self.field_errors.remove(&key);
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn field_error(&self, key: FieldKey) -> Option<&ValidationError> {
        self.field_errors.get(&key)
    }

    pub fn field_errors(&self) -> &BTreeMap<FieldKey, ValidationError> {
        &self.field_errors
    }

    pub fn is_loading(&self) -> bool {
        self.state == UiState::Loading
    }

    pub fn in_flight(&self) -> Option<SubmissionTicket> {
        self.in_flight
    }

    pub fn begin_submit(&mut self) -> SubmitAttempt {
        if self.in_flight.is_some() {
            debug!("submit ignored while a prediction is in flight");
            return SubmitAttempt::Busy;
        }

        match self.form.validate() {
            Ok(input) => {
                self.field_errors.clear();
                self.next_ticket += 1;
                let ticket = SubmissionTicket(self.next_ticket);
                self.in_flight = Some(ticket);
                self.state = UiState::Loading;
                info!(ticket = ticket.0, "prediction submission dispatched");
                SubmitAttempt::Dispatched { ticket, input }
            }
            Err(errors) => {
                let invalid_fields = errors.len();
                debug!(invalid_fields, "submission rejected by validation");
                self.field_errors = errors;
                SubmitAttempt::Rejected { invalid_fields }
            }
        }
    }

    /// Applies the outcome of a dispatched request. Returns `false` when the
    /// ticket is no longer in flight (reset or superseded) and the outcome
    /// was dropped.
    pub fn finish(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<PredictionResult, PredictionError>,
    ) -> bool {
        if self.in_flight != Some(ticket) {
            debug!(ticket = ticket.0, "discarding stale prediction outcome");
            return false;
        }
        self.in_flight = None;

        self.state = match outcome {
            Ok(result) => UiState::Result(result),
            Err(err) => {
                warn!(ticket = ticket.0, "prediction failed: {err}");
                UiState::Error(err.user_message())
            }
        };
        true
    }

    /// Ends a dispatched submission that never reached the service.
    pub fn abandon(&mut self, ticket: SubmissionTicket, message: impl Into<String>) -> bool {
        if self.in_flight != Some(ticket) {
            return false;
        }
        self.in_flight = None;
        self.state = UiState::Error(message.into());
        true
    }

    pub fn reset(&mut self) {
        if let Some(ticket) = self.in_flight.take() {
            debug!(ticket = ticket.0, "reset while loading; outcome will be discarded");
        }
        self.form = FormState::empty();
        self.field_errors.clear();
        self.state = UiState::Idle;
    }

    /// Validates, performs the request and applies its outcome in one step.
    pub async fn submit<S>(&mut self, service: &S) -> SubmitOutcome
    where
        S: PredictionService + ?Sized,
    {
        match self.begin_submit() {
            SubmitAttempt::Busy => SubmitOutcome::Busy,
            SubmitAttempt::Rejected { .. } => SubmitOutcome::Rejected,
            SubmitAttempt::Dispatched { ticket, input } => {
                let outcome = service.predict(&input).await;
                self.finish(ticket, outcome);
                SubmitOutcome::Completed
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
