use std::time::Duration;

use chrono::{DateTime, Local};
use client_core::{FormController, SubmitAttempt, UiState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{events::UiEvent, orchestration::dispatch_backend_command},
    ui::{form, outcome},
};

const DISCLAIMER: &str = "This tool is for informational purposes only. Always consult with healthcare professionals for medical advice.";

pub struct PredictorApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,

    controller: FormController,
    api_base_url: String,

    status: String,
    backend_error: Option<String>,
    last_result_at: Option<DateTime<Local>>,
}

impl PredictorApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            controller: FormController::new(),
            api_base_url: api_base_url.into(),
            status: "Ready".to_string(),
            backend_error: None,
            last_result_at: None,
        }
    }

    pub fn submit(&mut self) {
        match self.controller.begin_submit() {
            SubmitAttempt::Busy => {}
            SubmitAttempt::Rejected { invalid_fields } => {
                self.status = format!("{invalid_fields} field(s) need attention");
            }
            SubmitAttempt::Dispatched { ticket, input } => {
                self.status = "Processing".to_string();
                if let Err(message) =
                    dispatch_backend_command(&self.cmd_tx, BackendCommand::Predict { ticket, input })
                {
                    self.controller.abandon(ticket, message);
                    self.status = message.to_string();
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.controller.reset();
        self.last_result_at = None;
        self.status = "Form cleared".to_string();
    }

    pub fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::PredictionFinished { ticket, outcome } => {
                    let succeeded = outcome.is_ok();
                    if !self.controller.finish(ticket, outcome) {
                        continue;
                    }
                    if succeeded {
                        let now = Local::now();
                        self.status = format!("Prediction received at {}", now.format("%H:%M:%S"));
                        self.last_result_at = Some(now);
                    } else {
                        self.status = "Prediction failed".to_string();
                        self.last_result_at = None;
                    }
                }
                UiEvent::BackendUnavailable(message) => {
                    self.status = message.clone();
                    self.backend_error = Some(message);
                }
            }
        }
    }

    fn show(&mut self, ctx: &egui::Context) {
        let mut submit_clicked = false;
        let mut reset_clicked = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(8.0);
                self.show_header(ui);
                ui.add_space(8.0);

                if let Some(message) = &self.backend_error {
                    outcome::show_error_banner(ui, "Prediction worker unavailable", message);
                    ui.add_space(8.0);
                }

                form::show_fields(ui, &mut self.controller);
                ui.add_space(16.0);

                ui.horizontal(|ui| {
                    let loading = self.controller.is_loading();
                    let submit_label = if loading { "Processing" } else { "Predict Risk" };
                    if loading {
                        ui.add(egui::Spinner::new());
                    }
                    let submit = egui::Button::new(egui::RichText::new(submit_label).strong())
                        .min_size(egui::vec2(180.0, 34.0));
                    if ui.add_enabled(!loading, submit).clicked() {
                        submit_clicked = true;
                    }
                    let reset =
                        egui::Button::new("Reset Form").min_size(egui::vec2(180.0, 34.0));
                    if ui.add(reset).clicked() {
                        reset_clicked = true;
                    }
                });

                if outcome::has_outcome(self.controller.state()) {
                    ui.add_space(8.0);
                    ui.separator();
                    ui.add_space(8.0);
                    outcome::show_outcome(ui, self.controller.state(), self.last_result_at);
                }

                ui.add_space(16.0);
                ui.separator();
                ui.small(egui::RichText::new(DISCLAIMER).weak());
                ui.horizontal_wrapped(|ui| {
                    ui.small("Status:");
                    ui.small(egui::RichText::new(&self.status).weak());
                });
            });
        });

        if submit_clicked {
            self.submit();
        }
        if reset_clicked {
            self.reset();
        }
    }

    fn show_header(&self, ui: &mut egui::Ui) {
        let predicted_class = match self.controller.state() {
            UiState::Result(result) => Some(result.predicted_class),
            _ => None,
        };
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.heading("Heart Disease Risk Predictor");
                ui.weak("Enter patient medical data to assess heart disease risk");
                ui.small(egui::RichText::new(&self.api_base_url).weak());
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new("♥")
                        .size(30.0)
                        .color(outcome::class_accent(predicted_class)),
                );
            });
        });
    }
}

impl eframe::App for PredictorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.show(ctx);

        if self.controller.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(50));
        } else {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}
