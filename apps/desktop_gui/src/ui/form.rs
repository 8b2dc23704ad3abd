//! Field widgets. Numeric fields get a text box, enumerated fields a
//! combo box limited to their declared codes.

use client_core::FormController;
use eframe::egui;
use shared::domain::{FieldKind, FieldSpec, FIELD_SPECS};

const FIELD_WIDTH: f32 = 300.0;
pub const FIELD_ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);

pub fn show_fields(ui: &mut egui::Ui, controller: &mut FormController) {
    egui::Grid::new("prediction_fields")
        .num_columns(2)
        .spacing([24.0, 14.0])
        .show(ui, |ui| {
            for (index, spec) in FIELD_SPECS.iter().enumerate() {
                ui.vertical(|ui| show_field(ui, controller, spec));
                if index % 2 == 1 {
                    ui.end_row();
                }
            }
        });
}

fn show_field(ui: &mut egui::Ui, controller: &mut FormController, spec: &FieldSpec) {
    ui.label(egui::RichText::new(spec.label).strong())
        .on_hover_text(spec.help);

    let current = controller.value(spec.key).to_string();
    match spec.kind {
        FieldKind::Numeric { .. } => {
            let mut buf = current;
            let response = ui.add(
                egui::TextEdit::singleline(&mut buf)
                    .hint_text(spec.placeholder())
                    .desired_width(FIELD_WIDTH),
            );
            if response.changed() {
                controller.set_value(spec.key, buf);
            }
            response.on_hover_text(spec.help);
        }
        FieldKind::Enumerated { choices } => {
            let selected_text = spec
                .choice_label(&current)
                .map(str::to_string)
                .unwrap_or_else(|| spec.placeholder());
            let mut selected = current.clone();
            egui::ComboBox::from_id_salt(spec.key.as_str())
                .width(FIELD_WIDTH)
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for choice in choices {
                        ui.selectable_value(&mut selected, choice.code_str(), choice.label);
                    }
                });
            if selected != current {
                controller.set_value(spec.key, selected);
            }
        }
    }

    if let Some(err) = controller.field_error(spec.key) {
        ui.colored_label(FIELD_ERROR_COLOR, err.to_string());
    }
}
