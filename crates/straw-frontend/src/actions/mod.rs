//! Action handling module
//!
//! Actions are queued in AppState by the panels and processed once at the
//! start of each frame, so a frame always sees one complete configuration.

mod config;
mod export;
#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod file_wasm;
mod review;

use straw_core::KeyValueStorage;

use crate::state::{AppAction, SharedAppState, SharedViewportState};

pub use config::handle_config_action;
pub use export::{handle_export_action, save_snapshot, today};
#[cfg(not(target_arch = "wasm32"))]
pub use file::save_bytes;
#[cfg(target_arch = "wasm32")]
pub use file_wasm::save_bytes;
pub use review::{handle_capture_outcome, handle_review_action};

/// Context for action handlers
pub struct ActionContext<'a> {
    pub app_state: &'a SharedAppState,
    pub viewport_state: &'a Option<SharedViewportState>,
    pub storage: &'a mut dyn KeyValueStorage,
    /// Frame time in seconds
    pub now: f64,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        app_state: &'a SharedAppState,
        viewport_state: &'a Option<SharedViewportState>,
        storage: &'a mut dyn KeyValueStorage,
        now: f64,
    ) -> Self {
        Self {
            app_state,
            viewport_state,
            storage,
            now,
        }
    }
}

/// Dispatch an action to the appropriate handler
pub fn dispatch_action(action: AppAction, ctx: &mut ActionContext) {
    match action {
        AppAction::UpdateConfig(_) | AppAction::ResetConfiguration => {
            handle_config_action(action, ctx);
        }

        AppAction::RequestReview | AppAction::ConfirmOrder | AppAction::CloseSummary => {
            handle_review_action(action, ctx);
        }

        AppAction::DownloadSnapshot | AppAction::ExportPdf => {
            handle_export_action(action, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use straw_core::{
        ConfigStore, ConfigUpdate, EndType, MemoryStorage, ReviewState, ReviewTick, StrawType,
    };

    use super::*;
    use crate::state::create_shared_state;

    fn orderable(state: &SharedAppState, storage: &mut MemoryStorage) {
        for update in [
            ConfigUpdate::MasterCartons(Some(10)),
            ConfigUpdate::QtyPerInnerBox(Some(100)),
            ConfigUpdate::InnerBoxesPerCarton(Some(100)),
        ] {
            let viewport = None;
            let mut ctx = ActionContext::new(state, &viewport, storage, 0.0);
            dispatch_action(AppAction::UpdateConfig(update), &mut ctx);
        }
    }

    #[test]
    fn test_update_persists_and_dirties_scene() {
        let state = create_shared_state(ConfigStore::default());
        state.lock().take_scene_dirty();
        let mut storage = MemoryStorage::new();

        let viewport = None;
        let mut ctx = ActionContext::new(&state, &viewport, &mut storage, 0.0);
        dispatch_action(
            AppAction::UpdateConfig(ConfigUpdate::EndType(EndType::FortyFiveDegree)),
            &mut ctx,
        );

        let mut state = state.lock();
        assert_eq!(state.config().straw_type, StrawType::Straight);
        assert!(state.take_scene_dirty());
        assert_eq!(ConfigStore::load(&storage).config(), state.config());
    }

    #[test]
    fn test_invalid_order_cannot_be_reviewed() {
        let state = create_shared_state(ConfigStore::default());
        let mut storage = MemoryStorage::new();

        let viewport = None;
        let mut ctx = ActionContext::new(&state, &viewport, &mut storage, 0.0);
        dispatch_action(AppAction::RequestReview, &mut ctx);

        assert_eq!(*state.lock().review.state(), ReviewState::Editing);
    }

    #[test]
    fn test_review_without_renderer_opens_summary() {
        let state = create_shared_state(ConfigStore::default());
        let mut storage = MemoryStorage::new();
        orderable(&state, &mut storage);

        let viewport = None;
        let mut ctx = ActionContext::new(&state, &viewport, &mut storage, 1.0);
        dispatch_action(AppAction::RequestReview, &mut ctx);

        let state = state.lock();
        assert!(state.review.is_summary_open());
        assert!(state.review.snapshot().is_none());
    }

    #[test]
    fn test_confirm_resets_after_delay() {
        let state = create_shared_state(ConfigStore::default());
        let mut storage = MemoryStorage::new();
        orderable(&state, &mut storage);

        for (action, now) in [(AppAction::RequestReview, 1.0), (AppAction::ConfirmOrder, 2.0)] {
            let viewport = None;
            let mut ctx = ActionContext::new(&state, &viewport, &mut storage, now);
            dispatch_action(action, &mut ctx);
        }
        assert!(state.lock().review.is_confirming());

        let tick = state.lock().review.tick(4.5);
        assert_eq!(tick, ReviewTick::ResetConfiguration);

        let viewport = None;
        let mut ctx = ActionContext::new(&state, &viewport, &mut storage, 4.5);
        dispatch_action(AppAction::ResetConfiguration, &mut ctx);
        assert_eq!(state.lock().config().total_qty(), 0);
        assert!(ConfigStore::load(&storage).config().num_master_cartons.is_none());
    }

    #[test]
    fn test_configuration_is_frozen_under_review() {
        let state = create_shared_state(ConfigStore::default());
        let mut storage = MemoryStorage::new();
        orderable(&state, &mut storage);

        for action in [
            AppAction::RequestReview,
            AppAction::UpdateConfig(ConfigUpdate::Length(120.0)),
            AppAction::ResetConfiguration,
        ] {
            let viewport = None;
            let mut ctx = ActionContext::new(&state, &viewport, &mut storage, 1.0);
            dispatch_action(action, &mut ctx);
        }

        let state = state.lock();
        assert!(state.review.is_summary_open());
        assert_eq!(state.config().length_mm, 300.0);
        assert_eq!(state.config().total_qty(), 100_000);
        assert_eq!(ConfigStore::load(&storage).config(), state.config());
    }

    #[test]
    fn test_edits_resume_after_closing_summary() {
        let state = create_shared_state(ConfigStore::default());
        let mut storage = MemoryStorage::new();
        orderable(&state, &mut storage);

        for action in [
            AppAction::RequestReview,
            AppAction::CloseSummary,
            AppAction::UpdateConfig(ConfigUpdate::Length(120.0)),
        ] {
            let viewport = None;
            let mut ctx = ActionContext::new(&state, &viewport, &mut storage, 1.0);
            dispatch_action(action, &mut ctx);
        }

        assert_eq!(state.lock().config().length_mm, 120.0);
    }

    #[test]
    fn test_close_keeps_configuration() {
        let state = create_shared_state(ConfigStore::default());
        let mut storage = MemoryStorage::new();
        orderable(&state, &mut storage);

        for action in [AppAction::RequestReview, AppAction::CloseSummary] {
            let viewport = None;
            let mut ctx = ActionContext::new(&state, &viewport, &mut storage, 1.0);
            dispatch_action(action, &mut ctx);
        }

        let state = state.lock();
        assert_eq!(*state.review.state(), ReviewState::Editing);
        assert_eq!(state.config().total_qty(), 100_000);
    }
}
