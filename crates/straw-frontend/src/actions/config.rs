//! Configuration action handlers

use crate::state::AppAction;

use super::ActionContext;

/// Handle configuration actions
pub fn handle_config_action(action: AppAction, ctx: &mut ActionContext) {
    let mut state = ctx.app_state.lock();
    if state.is_config_locked() {
        tracing::debug!("Ignoring {:?} while the order is under review", action);
        return;
    }
    match action {
        AppAction::UpdateConfig(update) => {
            tracing::debug!("Config update: {:?}", update);
            let before = state.config().clone();
            state.store.update(ctx.storage, update);
            if *state.config() != before {
                state.mark_scene_dirty();
            }
        }
        AppAction::ResetConfiguration => {
            state.store.reset(ctx.storage);
            state.mark_scene_dirty();
        }
        _ => {}
    }
}
