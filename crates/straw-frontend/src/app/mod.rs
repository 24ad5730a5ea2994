//! Main application module

mod dock;
mod menu;
mod storage;

use std::sync::Arc;

use egui_dock::{DockArea, DockState, Style};
use parking_lot::Mutex;

use straw_core::{KeyValueStorage, MemoryStorage, ReviewTick, assemble};

use crate::actions::{ActionContext, dispatch_action, handle_capture_outcome};
use crate::assets::PartAssets;
use crate::panels::OrderSummaryWindow;
use crate::state::{AppAction, SharedAppState, SharedViewportState, ViewportState, create_shared_state};

pub use dock::{PanelType, StrawTabViewer, create_dock_layout};
pub use menu::{MenuAction, render_menu_bar};
pub use storage::{EframeStorage, load_store};

/// Main application
pub struct StrawConfiguratorApp {
    dock_state: DockState<PanelType>,
    app_state: SharedAppState,
    viewport_state: Option<SharedViewportState>,
    assets: PartAssets,
    /// Used when eframe provides no persistent storage
    fallback_storage: MemoryStorage,
    order_summary: OrderSummaryWindow,
    mounted: bool,
}

impl StrawConfiguratorApp {
    /// Create a new app
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Create viewport state if WGPU is available
        let viewport_state = cc.wgpu_render_state.as_ref().map(|render_state| {
            let device = render_state.device.clone();
            let queue = render_state.queue.clone();
            let format = render_state.target_format;

            Arc::new(Mutex::new(ViewportState::new(device, queue, format)))
        });
        if viewport_state.is_none() {
            tracing::warn!("No WGPU render state, 3D view and snapshots disabled");
        }

        let app_state = create_shared_state(load_store(cc.storage));
        if let Some(viewport_state) = &viewport_state {
            let flag = viewport_state.lock().renderer.context_loss();
            app_state.lock().attach_context_loss(flag);
        }

        Self {
            dock_state: create_dock_layout(),
            app_state,
            viewport_state,
            assets: PartAssets::load(),
            fallback_storage: MemoryStorage::new(),
            order_summary: OrderSummaryWindow::new(),
            mounted: false,
        }
    }

    /// Advance review deadlines
    fn tick_review(&mut self, now: f64) {
        let tick = self.app_state.lock().review.tick(now);
        if tick == ReviewTick::ResetConfiguration {
            self.app_state
                .lock()
                .queue_action(AppAction::ResetConfiguration);
        }
    }

    /// Process pending actions
    fn process_actions(&mut self, frame: &mut eframe::Frame, now: f64) {
        let actions = self.app_state.lock().take_pending_actions();
        if actions.is_empty() {
            return;
        }

        let mut persistent;
        let storage: &mut dyn KeyValueStorage = match frame.storage_mut() {
            Some(storage) => {
                persistent = EframeStorage(storage);
                &mut persistent
            }
            None => &mut self.fallback_storage,
        };

        let mut ctx = ActionContext::new(&self.app_state, &self.viewport_state, storage, now);
        for action in actions {
            dispatch_action(action, &mut ctx);
        }
    }

    /// Pick up the part library once it finishes loading
    fn sync_library(&mut self) {
        if self.assets.poll().is_some() {
            let mut state = self.app_state.lock();
            state.library_ready = true;
            state.mark_scene_dirty();
        }
    }

    /// Rebuild the scene, advance animation and collect captures
    fn sync_viewport(&mut self, now: f64, dt: f32) {
        let Some(viewport_state) = &self.viewport_state else {
            return;
        };

        if !self.mounted {
            viewport_state.lock().renderer.mount(now);
            self.mounted = true;
        }

        if let Some(library) = self.assets.library() {
            let config = {
                let mut state = self.app_state.lock();
                state.take_scene_dirty().then(|| state.config().clone())
            };
            if let Some(config) = config {
                let subgraph = assemble(&config, library);
                viewport_state.lock().set_scene(subgraph.as_ref(), library);
            }
        }

        let outcome = {
            let mut viewport = viewport_state.lock();
            viewport.renderer.update(now, dt);
            viewport.poll_capture()
        };

        if let Some(outcome) = outcome {
            handle_capture_outcome(outcome, &self.app_state);
        }
    }
}

impl eframe::App for StrawConfiguratorApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let (now, dt) = ctx.input(|i| (i.time, i.stable_dt));

        // Deadlines first so a due reset is applied with this frame's actions
        self.tick_review(now);
        self.process_actions(frame, now);
        self.sync_library();
        self.sync_viewport(now, dt);

        // Menu bar
        if let Some(menu_action) = render_menu_bar(ctx, &self.app_state) {
            match menu_action {
                MenuAction::ResetLayout => {
                    self.dock_state = create_dock_layout();
                }
            }
        }

        // Dock area
        let render_state = frame.wgpu_render_state();

        DockArea::new(&mut self.dock_state)
            .style(Style::from_egui(ctx.style().as_ref()))
            .show(
                ctx,
                &mut StrawTabViewer {
                    app_state: &self.app_state,
                    render_state,
                    viewport_state: &self.viewport_state,
                },
            );

        // Review windows
        self.order_summary.show(ctx, &self.app_state);

        // Animation and capture polling run every frame
        ctx.request_repaint();
    }

    fn on_exit(&mut self) {
        if let Some(viewport_state) = &self.viewport_state {
            viewport_state.lock().renderer.teardown();
        }
    }
}
