//! Error banner and result card shown under the form.

use chrono::{DateTime, Local};
use client_core::UiState;
use eframe::egui;
use shared::protocol::{PredictedClass, PredictionResult};

const HIGH_RISK_ACCENT: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
const LOW_RISK_ACCENT: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);
const ERROR_FILL: egui::Color32 = egui::Color32::from_rgb(254, 226, 226);
const ERROR_TEXT: egui::Color32 = egui::Color32::from_rgb(153, 27, 27);
const NEUTRAL_ACCENT: egui::Color32 = egui::Color32::from_rgb(156, 163, 175);

pub fn class_accent(class: Option<PredictedClass>) -> egui::Color32 {
    match class {
        Some(PredictedClass::Present) => HIGH_RISK_ACCENT,
        Some(PredictedClass::Absent) => LOW_RISK_ACCENT,
        None => NEUTRAL_ACCENT,
    }
}

pub fn has_outcome(state: &UiState) -> bool {
    matches!(state, UiState::Error(_) | UiState::Result(_))
}

pub fn show_outcome(ui: &mut egui::Ui, state: &UiState, received_at: Option<DateTime<Local>>) {
    match state {
        UiState::Idle | UiState::Loading => {}
        UiState::Error(message) => show_error_banner(ui, "Error", message),
        UiState::Result(result) => show_result_card(ui, result, received_at),
    }
}

pub fn show_error_banner(ui: &mut egui::Ui, title: &str, message: &str) {
    egui::Frame::new()
        .fill(ERROR_FILL)
        .stroke(egui::Stroke::new(1.0, HIGH_RISK_ACCENT))
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::same(12))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(egui::RichText::new(title).strong().color(ERROR_TEXT));
            ui.label(egui::RichText::new(message).color(ERROR_TEXT));
        });
}

fn show_result_card(
    ui: &mut egui::Ui,
    result: &PredictionResult,
    received_at: Option<DateTime<Local>>,
) {
    let accent = class_accent(Some(result.predicted_class));
    egui::Frame::new()
        .fill(accent.gamma_multiply(0.12))
        .stroke(egui::Stroke::new(1.0, accent))
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::same(14))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                egui::RichText::new(result.predicted_class.headline())
                    .size(18.0)
                    .strong(),
            );
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label("Risk Level:");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(result.risk_percentage_label())
                            .strong()
                            .color(accent),
                    );
                });
            });
            ui.add(
                egui::ProgressBar::new(result.bar_fraction())
                    .fill(accent)
                    .desired_width(ui.available_width()),
            );
            if let Some(received_at) = received_at {
                ui.add_space(4.0);
                ui.small(
                    egui::RichText::new(format!(
                        "Received {}",
                        received_at.format("%Y-%m-%d %H:%M:%S")
                    ))
                    .weak(),
                );
            }
        });
}
