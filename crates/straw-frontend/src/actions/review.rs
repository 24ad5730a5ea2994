//! Review flow action handlers

use crate::state::{AppAction, CaptureOutcome, CapturePurpose, SharedAppState};

use super::ActionContext;
use super::export::save_snapshot;

/// Handle review actions
pub fn handle_review_action(action: AppAction, ctx: &mut ActionContext) {
    match action {
        AppAction::RequestReview => handle_request_review(ctx),
        AppAction::ConfirmOrder => {
            ctx.app_state.lock().review.confirm(ctx.now);
        }
        AppAction::CloseSummary => {
            ctx.app_state.lock().review.close();
        }
        _ => {}
    }
}

fn handle_request_review(ctx: &mut ActionContext) {
    let mut state = ctx.app_state.lock();

    let validation = state.config().validation();
    if !validation.can_submit() {
        tracing::warn!("Review requested for an invalid order: {:?}", validation);
        return;
    }

    let available = state.snapshots_available();
    let Some(request) = state.review.request_review(ctx.now, available) else {
        return;
    };

    let Some(viewport_state) = ctx.viewport_state else {
        tracing::warn!("No viewport to capture from, reviewing without image");
        state.review.resolve_snapshot(request, None);
        return;
    };
    if let Err(e) = viewport_state
        .lock()
        .capture(request, CapturePurpose::Review)
    {
        tracing::warn!("Snapshot capture not started: {}", e);
        state.review.resolve_snapshot(request, None);
    }
}

/// Route a finished capture to whoever asked for it
pub fn handle_capture_outcome(outcome: CaptureOutcome, app_state: &SharedAppState) {
    match outcome.purpose {
        CapturePurpose::Review => {
            app_state
                .lock()
                .review
                .resolve_snapshot(outcome.request, outcome.image);
        }
        CapturePurpose::Download => match outcome.image {
            Some(image) => save_snapshot(&image),
            None => tracing::warn!("Snapshot download failed"),
        },
    }
}

#[cfg(test)]
mod tests {
    use straw_core::{CaptureRequest, ConfigStore, ConfigUpdate, MemoryStorage, SnapshotImage};
    use straw_renderer::ContextLossFlag;

    use super::*;
    use crate::actions::{ActionContext, dispatch_action};
    use crate::state::create_shared_state;

    fn orderable_state() -> (SharedAppState, MemoryStorage) {
        let mut store = ConfigStore::default();
        let mut storage = MemoryStorage::new();
        for update in [
            ConfigUpdate::MasterCartons(Some(10)),
            ConfigUpdate::InnerBoxesPerCarton(Some(100)),
            ConfigUpdate::QtyPerInnerBox(Some(100)),
        ] {
            store.update(&mut storage, update);
        }
        (create_shared_state(store), storage)
    }

    #[test]
    fn test_lost_context_reviews_without_capture() {
        let (state, mut storage) = orderable_state();
        let flag = ContextLossFlag::new();
        state.lock().attach_context_loss(flag.clone());
        assert!(state.lock().snapshots_available());

        // Raised by the device-lost callback
        flag.mark_lost();
        assert!(!state.lock().snapshots_available());

        let viewport = None;
        let mut ctx = ActionContext::new(&state, &viewport, &mut storage, 1.0);
        dispatch_action(AppAction::RequestReview, &mut ctx);

        let state = state.lock();
        assert!(state.review.is_summary_open());
        assert!(!state.review.is_awaiting_snapshot());
        assert!(state.review.snapshot().is_none());
    }

    #[test]
    fn test_capture_that_cannot_start_still_opens_summary() {
        let (state, mut storage) = orderable_state();
        state.lock().attach_context_loss(ContextLossFlag::new());

        let viewport = None;
        let mut ctx = ActionContext::new(&state, &viewport, &mut storage, 1.0);
        dispatch_action(AppAction::RequestReview, &mut ctx);

        let state = state.lock();
        assert!(state.review.is_summary_open());
        assert!(state.review.snapshot().is_none());
    }

    #[test]
    fn test_review_outcome_resolves_pending_request() {
        let state = create_shared_state(ConfigStore::default());
        let request = state
            .lock()
            .review
            .request_review(0.0, true)
            .unwrap();

        let image = SnapshotImage::from_rgba(1, 1, vec![255, 0, 0, 255]).unwrap();
        handle_capture_outcome(
            CaptureOutcome {
                request,
                purpose: CapturePurpose::Review,
                image: Some(image.clone()),
            },
            &state,
        );

        assert_eq!(state.lock().review.snapshot(), Some(&image));
    }

    #[test]
    fn test_stale_outcome_is_dropped() {
        let state = create_shared_state(ConfigStore::default());
        let request = state
            .lock()
            .review
            .request_review(0.0, true)
            .unwrap();

        handle_capture_outcome(
            CaptureOutcome {
                request: CaptureRequest(request.0 + 1),
                purpose: CapturePurpose::Review,
                image: None,
            },
            &state,
        );

        assert!(state.lock().review.is_awaiting_snapshot());
    }
}
