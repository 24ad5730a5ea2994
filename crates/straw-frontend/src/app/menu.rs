//! Menu bar rendering

use straw_core::ReviewState;

use crate::state::{AppAction, SharedAppState};

/// Menu actions handled by the app itself
pub enum MenuAction {
    ResetLayout,
}

/// Render the menu bar and return any triggered action
pub fn render_menu_bar(ctx: &egui::Context, app_state: &SharedAppState) -> Option<MenuAction> {
    let mut menu_action = None;

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("Order", |ui| {
                let (can_submit, snapshots_available, locked) = {
                    let state = app_state.lock();
                    (
                        state.config().validation().can_submit()
                            && *state.review.state() == ReviewState::Editing,
                        state.snapshots_available(),
                        state.is_config_locked(),
                    )
                };
                if ui
                    .add_enabled(can_submit, egui::Button::new("Review Order..."))
                    .clicked()
                {
                    app_state.lock().queue_action(AppAction::RequestReview);
                    ui.close_menu();
                }
                if ui
                    .add_enabled(snapshots_available, egui::Button::new("Download Design Image"))
                    .clicked()
                {
                    app_state.lock().queue_action(AppAction::DownloadSnapshot);
                    ui.close_menu();
                }
                ui.separator();
                if ui
                    .add_enabled(!locked, egui::Button::new("Reset to Defaults"))
                    .clicked()
                {
                    app_state.lock().queue_action(AppAction::ResetConfiguration);
                    ui.close_menu();
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Reset Layout").clicked() {
                    menu_action = Some(MenuAction::ResetLayout);
                    ui.close_menu();
                }
            });
        });
    });

    menu_action
}
