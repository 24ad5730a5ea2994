//! Application state module

mod viewport;

pub use viewport::{CaptureOutcome, CapturePurpose, SharedViewportState, ViewportState};

use std::sync::Arc;

use parking_lot::Mutex;

use straw_core::{ConfigStore, ConfigUpdate, Configuration, ReviewFlow};
use straw_renderer::ContextLossFlag;

/// Actions that can be performed on the app state
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    // Configuration actions
    /// Change one configuration field
    UpdateConfig(ConfigUpdate),
    /// Restore defaults and clear the persisted entry
    ResetConfiguration,

    // Review actions
    /// Capture a snapshot and open the order summary
    RequestReview,
    /// Confirm the order from the summary
    ConfirmOrder,
    /// Close the summary and keep editing
    CloseSummary,

    // Export actions
    /// Capture a snapshot and save it as PNG
    DownloadSnapshot,
    /// Save the order summary as PDF
    ExportPdf,
}

/// Application state
#[derive(Default)]
pub struct AppState {
    /// Persisted user configuration
    pub store: ConfigStore,
    /// Review / confirm flow
    pub review: ReviewFlow,
    /// Device-lost flag shared with the renderer; `None` without one
    context_loss: Option<ContextLossFlag>,
    /// Whether the part library is loaded
    pub library_ready: bool,
    /// The assembled scene no longer matches the configuration
    scene_dirty: bool,
    /// Pending actions
    pending_actions: Vec<AppAction>,
}

impl AppState {
    /// Create an app state around a loaded store
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store,
            scene_dirty: true,
            ..Default::default()
        }
    }

    /// Current configuration
    pub fn config(&self) -> &Configuration {
        self.store.config()
    }

    /// Follow the renderer's device-lost flag
    pub fn attach_context_loss(&mut self, flag: ContextLossFlag) {
        self.context_loss = Some(flag);
    }

    /// Whether a renderer is attached at all
    pub fn has_renderer(&self) -> bool {
        self.context_loss.is_some()
    }

    /// Whether snapshots can still be taken this session
    pub fn snapshots_available(&self) -> bool {
        self.context_loss.as_ref().is_some_and(|flag| !flag.is_lost())
    }

    /// Whether the configuration is frozen by an open review
    pub fn is_config_locked(&self) -> bool {
        self.review.is_awaiting_snapshot() || self.review.is_summary_open()
    }

    /// Queue an action
    pub fn queue_action(&mut self, action: AppAction) {
        self.pending_actions.push(action);
    }

    /// Take pending actions
    pub fn take_pending_actions(&mut self) -> Vec<AppAction> {
        std::mem::take(&mut self.pending_actions)
    }

    /// Request a scene rebuild before the next render
    pub fn mark_scene_dirty(&mut self) {
        self.scene_dirty = true;
    }

    /// Clear and return the rebuild flag
    pub fn take_scene_dirty(&mut self) -> bool {
        std::mem::take(&mut self.scene_dirty)
    }
}

pub type SharedAppState = Arc<Mutex<AppState>>;

/// Create a new shared app state
pub fn create_shared_state(store: ConfigStore) -> SharedAppState {
    Arc::new(Mutex::new(AppState::new(store)))
}
