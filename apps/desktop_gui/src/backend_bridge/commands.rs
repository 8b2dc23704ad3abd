//! Backend commands queued from UI to backend worker.

use client_core::SubmissionTicket;
use shared::protocol::ValidatedInput;

pub enum BackendCommand {
    Predict {
        ticket: SubmissionTicket,
        input: ValidatedInput,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Predict { .. } => "predict",
        }
    }
}
