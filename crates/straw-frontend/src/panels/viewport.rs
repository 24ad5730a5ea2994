//! 3D Viewport panel

use crate::panels::Panel;
use crate::state::{SharedAppState, SharedViewportState};

/// 3D viewport panel
#[derive(Default)]
pub struct ViewportPanel;

impl ViewportPanel {
    pub fn new() -> Self {
        Self
    }
}

impl Panel for ViewportPanel {
    fn name(&self) -> &str {
        "3D View"
    }

    fn needs_render_context(&self) -> bool {
        true
    }

    fn ui(&mut self, ui: &mut egui::Ui, _app_state: &SharedAppState) {
        // Fallback when no render context
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, egui::Sense::hover());

        painter.rect_filled(response.rect, 0.0, egui::Color32::from_rgb(224, 229, 237));
        painter.text(
            response.rect.center(),
            egui::Align2::CENTER_CENTER,
            "3D View\n(WebGPU not available)",
            egui::FontId::proportional(16.0),
            egui::Color32::DARK_GRAY,
        );
    }

    fn ui_with_render_context(
        &mut self,
        ui: &mut egui::Ui,
        app_state: &SharedAppState,
        render_state: &egui_wgpu::RenderState,
        viewport_state: &SharedViewportState,
    ) {
        let library_ready = app_state.lock().library_ready;

        let available_size = ui.available_size();
        let width = available_size.x as u32;
        let height = available_size.y as u32;

        if width == 0 || height == 0 {
            return;
        }

        // Ensure texture and render
        let texture_id = {
            let mut state = viewport_state.lock();
            let mut egui_renderer = render_state.renderer.write();
            let tex_id = state.ensure_texture(width, height, &mut egui_renderer);
            state.render();
            tex_id
        };

        // Display the rendered texture
        let response = ui.add(
            egui::Image::new(egui::load::SizedTexture::new(
                texture_id,
                [available_size.x, available_size.y],
            ))
            .sense(egui::Sense::click_and_drag()),
        );

        // Orbit only; pan and zoom stay disabled
        let now = ui.input(|i| i.time);
        {
            let mut state = viewport_state.lock();
            if response.drag_started() {
                state.renderer.begin_interaction();
            }
            if response.dragged() {
                let delta = response.drag_delta();
                state.renderer.orbit_drag(delta.x, delta.y);
            }
            if response.drag_stopped() {
                state.renderer.end_interaction(now);
            }
        }

        if response.hovered() {
            ui.ctx().set_cursor_icon(if response.dragged() {
                egui::CursorIcon::Grabbing
            } else {
                egui::CursorIcon::Grab
            });
        }

        if !library_ready {
            ui.painter().text(
                response.rect.center(),
                egui::Align2::CENTER_CENTER,
                "Loading parts...",
                egui::FontId::proportional(18.0),
                egui::Color32::DARK_GRAY,
            );
        }
    }
}
