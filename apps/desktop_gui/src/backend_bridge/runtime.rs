//! Prediction worker: owns the tokio runtime and the http client, answers
//! each command with exactly one UI event.

use std::thread;

use client_core::{ClientSettings, HttpPredictionClient, PredictionService};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub fn launch(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || run_worker(settings, cmd_rx, ui_tx));
}

fn run_worker(settings: ClientSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!("failed to build backend runtime: {err}");
            let _ = ui_tx.send(UiEvent::BackendUnavailable(format!(
                "Prediction worker failed to start: {err}"
            )));
            return;
        }
    };

    let client = match HttpPredictionClient::new(&settings) {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(api_base_url = %settings.api_base_url, "invalid prediction client settings: {err:#}");
            let _ = ui_tx.send(UiEvent::BackendUnavailable(format!(
                "Prediction service is not configured correctly: {err:#}"
            )));
            return;
        }
    };
    tracing::info!(endpoint = %client.endpoint(), "prediction worker ready");

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            BackendCommand::Predict { ticket, input } => {
                let outcome = runtime.block_on(client.predict(&input));
                if ui_tx
                    .send(UiEvent::PredictionFinished { ticket, outcome })
                    .is_err()
                {
                    break;
                }
            }
        }
    }

    tracing::debug!("prediction worker stopped");
}
