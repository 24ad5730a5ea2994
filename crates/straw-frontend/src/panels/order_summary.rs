//! Order summary window

use straw_core::{OrderSummary, SnapshotImage};

use crate::actions::save_snapshot;
use crate::state::{AppAction, SharedAppState};

/// Largest edge of the snapshot preview in points
const PREVIEW_SIZE: f32 = 220.0;

/// Read-only review of the configuration with the captured design
#[derive(Default)]
pub struct OrderSummaryWindow {
    /// Uploaded preview and the snapshot it was made from
    preview: Option<(SnapshotImage, egui::TextureHandle)>,
}

impl OrderSummaryWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the capture notice or the summary, depending on the review state
    pub fn show(&mut self, ctx: &egui::Context, app_state: &SharedAppState) {
        let (awaiting, open, confirming, summary, snapshot) = {
            let state = app_state.lock();
            (
                state.review.is_awaiting_snapshot(),
                state.review.is_summary_open(),
                state.review.is_confirming(),
                OrderSummary::from_config(state.config()),
                state.review.snapshot().cloned(),
            )
        };

        if awaiting {
            egui::Window::new("Preparing Summary")
                .collapsible(false)
                .resizable(false)
                .title_bar(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Capturing your design...");
                    });
                });
        }

        if !open {
            self.preview = None;
            return;
        }

        let preview = snapshot
            .as_ref()
            .and_then(|image| self.preview_texture(ctx, image));

        let mut actions = Vec::new();

        egui::Window::new("Order Summary")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                if confirming {
                    ui.vertical_centered(|ui| {
                        ui.add_space(12.0);
                        ui.heading("Order Confirmed");
                        ui.label("Thank you! Your configuration has been submitted.");
                        ui.add_space(8.0);
                        ui.spinner();
                        ui.add_space(12.0);
                    });
                    return;
                }

                ui.horizontal_top(|ui| {
                    match preview {
                        Some((texture_id, size)) => {
                            ui.add(egui::Image::new(egui::load::SizedTexture::new(
                                texture_id, size,
                            )));
                        }
                        None => {
                            let (rect, _) = ui.allocate_exact_size(
                                egui::vec2(PREVIEW_SIZE, PREVIEW_SIZE),
                                egui::Sense::hover(),
                            );
                            ui.painter().rect_filled(rect, 6.0, ui.visuals().faint_bg_color);
                            ui.painter().text(
                                rect.center(),
                                egui::Align2::CENTER_CENTER,
                                "No preview available",
                                egui::FontId::proportional(14.0),
                                ui.visuals().weak_text_color(),
                            );
                        }
                    }

                    ui.vertical(|ui| {
                        details(ui, &summary);
                    });
                });

                ui.separator();
                ui.horizontal(|ui| {
                    for figure in &summary.volume {
                        ui.vertical(|ui| {
                            ui.small(figure.label);
                            ui.label(egui::RichText::new(&figure.value).strong());
                        });
                        ui.add_space(16.0);
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("Total Quantity:");
                    ui.label(
                        egui::RichText::new(format!("{} Straws", summary.total_formatted()))
                            .heading()
                            .strong(),
                    );
                });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Back to Editing").clicked() {
                        actions.push(AppAction::CloseSummary);
                    }
                    if ui.button("Export PDF").clicked() {
                        actions.push(AppAction::ExportPdf);
                    }
                    if let Some(image) = &snapshot {
                        if ui.button("Download Image").clicked() {
                            save_snapshot(image);
                        }
                    }
                    if ui
                        .button(egui::RichText::new("Confirm Order").strong())
                        .clicked()
                    {
                        actions.push(AppAction::ConfirmOrder);
                    }
                });
            });

        if !actions.is_empty() {
            let mut state = app_state.lock();
            for action in actions {
                state.queue_action(action);
            }
        }
    }

    /// Upload the snapshot once and return its texture and display size
    fn preview_texture(
        &mut self,
        ctx: &egui::Context,
        image: &SnapshotImage,
    ) -> Option<(egui::TextureId, egui::Vec2)> {
        let cached = self
            .preview
            .as_ref()
            .is_some_and(|(source, _)| source == image);

        if !cached {
            let pixels = match image.to_image() {
                Ok(pixels) => pixels,
                Err(e) => {
                    tracing::warn!("Cannot show snapshot: {}", e);
                    return None;
                }
            };
            let color_image = egui::ColorImage::from_rgba_unmultiplied(
                [pixels.width() as usize, pixels.height() as usize],
                pixels.as_raw(),
            );
            let handle = ctx.load_texture("order-snapshot", color_image, egui::TextureOptions::LINEAR);
            self.preview = Some((image.clone(), handle));
        }

        let (_, handle) = self.preview.as_ref()?;
        let [w, h] = handle.size();
        let scale = PREVIEW_SIZE / (w.max(h).max(1) as f32);
        Some((handle.id(), egui::vec2(w as f32 * scale, h as f32 * scale)))
    }
}

fn details(ui: &mut egui::Ui, summary: &OrderSummary) {
    ui.heading("Product Details");
    egui::Grid::new("summary_details")
        .num_columns(2)
        .striped(true)
        .spacing([16.0, 4.0])
        .show(ui, |ui| {
            for row in &summary.specifications {
                ui.label(row.label);
                if row.label == "Color" {
                    ui.horizontal(|ui| {
                        let color = summary.color;
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                        ui.painter().rect_filled(
                            rect,
                            3.0,
                            egui::Color32::from_rgb(color.r(), color.g(), color.b()),
                        );
                        ui.label(&row.value);
                    });
                } else {
                    ui.label(&row.value);
                }
                ui.end_row();
            }
        });

    if let Some(notes) = &summary.notes {
        ui.add_space(6.0);
        ui.label(egui::RichText::new("Notes").strong());
        ui.label(notes);
    }
}
