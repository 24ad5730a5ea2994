//! Configuration form
//!
//! Every control reads one field of the current configuration and writes
//! back through a queued [`AppAction::UpdateConfig`].

use straw_core::{
    ConfigUpdate, Configuration, EndType, MAX_LENGTH_MM, MIN_LENGTH_MM, MIN_ORDER_QUANTITY,
    StrawColor, StrawType, WrapperType, format_thousands, offered_diameters,
};

use crate::panels::Panel;
use crate::state::{AppAction, SharedAppState};

/// Straw and order configuration panel
#[derive(Default)]
pub struct ConfiguratorPanel;

impl ConfiguratorPanel {
    pub fn new() -> Self {
        Self
    }
}

impl Panel for ConfiguratorPanel {
    fn name(&self) -> &str {
        "Configure"
    }

    fn ui(&mut self, ui: &mut egui::Ui, app_state: &SharedAppState) {
        let (config, capture, review_busy) = {
            let state = app_state.lock();
            (
                state.config().clone(),
                CaptureAvailability {
                    has_renderer: state.has_renderer(),
                    available: state.snapshots_available(),
                },
                state.is_config_locked(),
            )
        };

        let mut actions = Vec::new();

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Design Your Straw");
            ui.add_space(8.0);

            // Frozen while an order is captured or under review
            ui.add_enabled_ui(!review_busy, |ui| {
                section(ui, "Color", |ui| color_controls(ui, &config, &mut actions));
                section(ui, "Straw Type", |ui| {
                    straw_type_controls(ui, &config, &mut actions)
                });
                section(ui, "End Type", |ui| end_type_controls(ui, &config, &mut actions));
                section(ui, "Dimensions", |ui| {
                    dimension_controls(ui, &config, &mut actions)
                });
                section(ui, "Wrapping", |ui| wrapper_controls(ui, &config, &mut actions));
                section(ui, "Order Volume", |ui| {
                    volume_controls(ui, &config, &mut actions)
                });
                section(ui, "Notes", |ui| {
                    let mut comments = config.comments.clone();
                    let response = ui.add(
                        egui::TextEdit::multiline(&mut comments)
                            .hint_text("Printing, packaging or delivery requests")
                            .desired_rows(3)
                            .desired_width(f32::INFINITY),
                    );
                    if response.changed() {
                        actions.push(AppAction::UpdateConfig(ConfigUpdate::Comments(comments)));
                    }
                });
            });

            ui.add_space(8.0);
            submit_controls(ui, &config, capture, review_busy, &mut actions);
        });

        if !actions.is_empty() {
            let mut state = app_state.lock();
            for action in actions {
                state.queue_action(action);
            }
        }
    }
}

fn section(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.label(egui::RichText::new(title).strong());
    add_contents(ui);
    ui.add_space(6.0);
    ui.separator();
}

fn color_controls(ui: &mut egui::Ui, config: &Configuration, actions: &mut Vec<AppAction>) {
    ui.horizontal_wrapped(|ui| {
        for color in StrawColor::PRESETS {
            let fill = egui::Color32::from_rgb(color.r(), color.g(), color.b());
            let (rect, response) =
                ui.allocate_exact_size(egui::vec2(22.0, 22.0), egui::Sense::click());
            let painter = ui.painter();
            painter.rect_filled(rect, 4.0, fill);
            let stroke = if config.color == color {
                egui::Stroke::new(2.0, ui.visuals().selection.stroke.color)
            } else {
                egui::Stroke::new(1.0, egui::Color32::GRAY)
            };
            painter.rect_stroke(rect, 4.0, stroke);

            if response.on_hover_text(color.to_hex()).clicked() {
                actions.push(AppAction::UpdateConfig(ConfigUpdate::Color(color)));
            }
        }

        let mut rgb = config.color.0;
        if egui::color_picker::color_edit_button_srgb(ui, &mut rgb).changed() {
            actions.push(AppAction::UpdateConfig(ConfigUpdate::Color(StrawColor(rgb))));
        }
        ui.monospace(config.color.to_hex());
    });
}

fn straw_type_controls(ui: &mut egui::Ui, config: &Configuration, actions: &mut Vec<AppAction>) {
    let forced = config.end_type.forces_straight();
    ui.horizontal_wrapped(|ui| {
        for &straw_type in StrawType::all() {
            let enabled = !(forced && straw_type.is_bent());
            let response = ui.add_enabled(
                enabled,
                egui::SelectableLabel::new(config.straw_type == straw_type, straw_type.display_name()),
            );
            if response.clicked() {
                actions.push(AppAction::UpdateConfig(ConfigUpdate::StrawType(straw_type)));
            }
        }
    });
    if forced {
        ui.small(format!(
            "{} ends are only available on straight straws",
            config.end_type.display_name()
        ));
    }
}

fn end_type_controls(ui: &mut egui::Ui, config: &Configuration, actions: &mut Vec<AppAction>) {
    ui.horizontal_wrapped(|ui| {
        for &end_type in EndType::all() {
            if ui
                .selectable_label(config.end_type == end_type, end_type.display_name())
                .clicked()
            {
                actions.push(AppAction::UpdateConfig(ConfigUpdate::EndType(end_type)));
            }
        }
    });
}

fn dimension_controls(ui: &mut egui::Ui, config: &Configuration, actions: &mut Vec<AppAction>) {
    egui::Grid::new("dimensions")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Length");
            let mut length = config.length_mm;
            if ui
                .add(
                    egui::DragValue::new(&mut length)
                        .speed(1.0)
                        .range(0.0..=2000.0)
                        .suffix(" mm"),
                )
                .changed()
            {
                actions.push(AppAction::UpdateConfig(ConfigUpdate::Length(length)));
            }
            ui.end_row();

            ui.label("Diameter");
            egui::ComboBox::from_id_salt("diameter")
                .selected_text(format!("{} mm", config.diameter_mm))
                .show_ui(ui, |ui| {
                    for diameter in offered_diameters() {
                        if ui
                            .selectable_label(
                                config.diameter_mm == diameter,
                                format!("{} mm", diameter),
                            )
                            .clicked()
                        {
                            actions.push(AppAction::UpdateConfig(ConfigUpdate::Diameter(diameter)));
                        }
                    }
                });
            ui.end_row();
        });

    if config.validation().invalid_length {
        ui.colored_label(
            ui.visuals().error_fg_color,
            format!(
                "Length must be between {} and {} mm",
                MIN_LENGTH_MM, MAX_LENGTH_MM
            ),
        );
    }
}

fn wrapper_controls(ui: &mut egui::Ui, config: &Configuration, actions: &mut Vec<AppAction>) {
    ui.horizontal_wrapped(|ui| {
        for &wrapper in WrapperType::all() {
            if ui
                .selectable_label(config.wrapper_type == wrapper, wrapper.display_name())
                .clicked()
            {
                actions.push(AppAction::UpdateConfig(ConfigUpdate::Wrapper(wrapper)));
            }
        }
    });
}

fn volume_controls(ui: &mut egui::Ui, config: &Configuration, actions: &mut Vec<AppAction>) {
    egui::Grid::new("order_volume")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            let fields: [(&str, Option<u32>, fn(Option<u32>) -> ConfigUpdate); 3] = [
                (
                    "Master cartons",
                    config.num_master_cartons,
                    ConfigUpdate::MasterCartons,
                ),
                (
                    "Inner boxes per carton",
                    config.inner_boxes_per_carton,
                    ConfigUpdate::InnerBoxesPerCarton,
                ),
                (
                    "Straws per inner box",
                    config.qty_per_inner_box,
                    ConfigUpdate::QtyPerInnerBox,
                ),
            ];

            for (label, value, update) in fields {
                ui.label(label);
                let mut text = value.map(|v| v.to_string()).unwrap_or_default();
                let response = ui.add(
                    egui::TextEdit::singleline(&mut text)
                        .hint_text("0")
                        .desired_width(120.0),
                );
                if response.changed() {
                    if let Some(parsed) = parse_quantity(&text) {
                        actions.push(AppAction::UpdateConfig(update(parsed)));
                    }
                }
                ui.end_row();
            }
        });

    ui.horizontal(|ui| {
        ui.label("Total quantity:");
        ui.label(egui::RichText::new(format_thousands(config.total_qty())).strong());
    });

    if config.validation().below_minimum_order {
        ui.colored_label(
            ui.visuals().error_fg_color,
            format!(
                "Minimum order is {} straws",
                format_thousands(MIN_ORDER_QUANTITY)
            ),
        );
    }
}

/// Whether the design image can be captured, and why not
#[derive(Debug, Clone, Copy)]
struct CaptureAvailability {
    has_renderer: bool,
    available: bool,
}

impl CaptureAvailability {
    fn unavailable_reason(&self) -> &'static str {
        if self.has_renderer {
            "Image capture is unavailable because the rendering context was lost"
        } else {
            "Image capture needs a WebGPU-capable browser"
        }
    }
}

fn submit_controls(
    ui: &mut egui::Ui,
    config: &Configuration,
    capture: CaptureAvailability,
    review_busy: bool,
    actions: &mut Vec<AppAction>,
) {
    let can_submit = config.validation().can_submit();

    ui.vertical_centered_justified(|ui| {
        let review = ui
            .add_enabled(
                can_submit && !review_busy,
                egui::Button::new(egui::RichText::new("Review Order").strong()),
            )
            .on_disabled_hover_text("Fix the highlighted fields to continue");
        if review.clicked() {
            actions.push(AppAction::RequestReview);
        }

        let download = ui
            .add_enabled(capture.available, egui::Button::new("Download Design Image"))
            .on_disabled_hover_text(capture.unavailable_reason());
        if download.clicked() {
            actions.push(AppAction::DownloadSnapshot);
        }

        if ui
            .add_enabled(!review_busy, egui::Button::new("Reset to Defaults"))
            .clicked()
        {
            actions.push(AppAction::ResetConfiguration);
        }
    });
}

/// Parse an order volume field. Empty text clears the field; text that is
/// not a whole number is rejected with `None`.
fn parse_quantity(text: &str) -> Option<Option<u32>> {
    let text = text.trim();
    if text.is_empty() {
        return Some(None);
    }
    let digits: String = text.chars().filter(|c| *c != ',' && *c != '_').collect();
    digits.parse::<u32>().ok().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(""), Some(None));
        assert_eq!(parse_quantity("  "), Some(None));
        assert_eq!(parse_quantity("250"), Some(Some(250)));
        assert_eq!(parse_quantity("1,000"), Some(Some(1000)));
        assert_eq!(parse_quantity("12a"), None);
        assert_eq!(parse_quantity("-5"), None);
        assert_eq!(parse_quantity("99999999999"), None);
    }

    #[test]
    fn test_capture_unavailable_reason() {
        let no_renderer = CaptureAvailability {
            has_renderer: false,
            available: false,
        };
        let lost = CaptureAvailability {
            has_renderer: true,
            available: false,
        };
        assert!(no_renderer.unavailable_reason().contains("WebGPU"));
        assert!(lost.unavailable_reason().contains("context was lost"));
        assert_ne!(no_renderer.unavailable_reason(), lost.unavailable_reason());
    }
}
