//! egui status and group controls

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use heatsite_core::{GroupId, LabelSink, Rgb};

use crate::highlight::SiteHighlighter;
use crate::labels::LabelBoard;
use crate::types::{ControlPanel, HighlightRequest, LoadStatus};

/// Plugin for the egui overlay
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, ui_system);
    }
}

/// Map a CSS label color onto egui, falling back to gray
pub fn label_color32(color: &str) -> egui::Color32 {
    match Rgb::parse(color) {
        Ok(rgb) => {
            let [r, g, b] = rgb.to_u8();
            egui::Color32::from_rgb(r, g, b)
        }
        Err(_) => egui::Color32::GRAY,
    }
}

fn ui_system(
    mut contexts: EguiContexts,
    panel: Res<ControlPanel>,
    status: Res<LoadStatus>,
    highlighter: Res<SiteHighlighter>,
    labels: Res<LabelBoard>,
    mut requests: MessageWriter<HighlightRequest>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    if !panel.show_buttons {
        // DOM owns the controls; keep a small status corner
        egui::Window::new("Status")
            .anchor(egui::Align2::RIGHT_BOTTOM, [-8.0, -8.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| render_status(ui, &status, &highlighter));
        return;
    }

    let frame = egui::Frame::side_top_panel(&ctx.style()).fill(egui::Color32::from_gray(235));
    egui::SidePanel::left("controls_panel")
        .exact_width(250.0)
        .resizable(false)
        .frame(frame)
        .show(ctx, |ui| {
            ui.visuals_mut().override_text_color = Some(egui::Color32::from_gray(30));
            ui.heading("Heatsite");
            ui.separator();

            for group in GroupId::ALL {
                let label_id = group.label_id();
                let enabled = highlighter.is_available(group) && labels.has_label(label_id);
                let color = labels
                    .color(label_id)
                    .map(label_color32)
                    .unwrap_or(egui::Color32::GRAY);
                let text = egui::RichText::new(group.title()).size(16.0).color(color);
                let response = ui.add_enabled(enabled, egui::Button::new(text).frame(false));
                if response.clicked() {
                    requests.write(HighlightRequest(group));
                }
            }

            ui.separator();
            render_status(ui, &status, &highlighter);
        });
}

fn render_status(ui: &mut egui::Ui, status: &LoadStatus, highlighter: &SiteHighlighter) {
    ui.label(status.summary());
    if let Some(active) = highlighter.active() {
        ui.label(format!("Focused: {}", active.title()));
    }

    if let LoadStatus::Ready { problems } = status {
        if !problems.is_empty() {
            ui.collapsing("Problems", |ui| {
                for problem in problems {
                    ui.label(
                        egui::RichText::new(problem)
                            .small()
                            .color(egui::Color32::from_rgb(200, 80, 40)),
                    );
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_color32() {
        assert_eq!(label_color32("#11ff11"), egui::Color32::from_rgb(0x11, 0xff, 0x11));
        assert_eq!(label_color32("black"), egui::Color32::from_rgb(0, 0, 0));
        assert_eq!(label_color32("not-a-color"), egui::Color32::GRAY);
    }
}
