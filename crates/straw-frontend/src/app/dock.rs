//! Dock layout and tab viewer

use egui_dock::{DockState, NodeIndex, TabViewer};

use crate::panels::{ConfiguratorPanel, Panel, ViewportPanel};
use crate::state::{SharedAppState, SharedViewportState};

/// Panel types for the dock system
pub enum PanelType {
    Viewport(ViewportPanel),
    Configurator(ConfiguratorPanel),
}

impl PanelType {
    fn panel_mut(&mut self) -> &mut dyn Panel {
        match self {
            PanelType::Viewport(p) => p,
            PanelType::Configurator(p) => p,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PanelType::Viewport(p) => p.name(),
            PanelType::Configurator(p) => p.name(),
        }
    }
}

/// Tab viewer for dock area
pub struct StrawTabViewer<'a> {
    pub app_state: &'a SharedAppState,
    pub render_state: Option<&'a egui_wgpu::RenderState>,
    pub viewport_state: &'a Option<SharedViewportState>,
}

impl TabViewer for StrawTabViewer<'_> {
    type Tab = PanelType;

    fn title(&mut self, tab: &mut Self::Tab) -> egui::WidgetText {
        tab.name().into()
    }

    fn ui(&mut self, ui: &mut egui::Ui, tab: &mut Self::Tab) {
        let panel = tab.panel_mut();
        match (self.render_state, self.viewport_state) {
            (Some(render_state), Some(viewport_state)) if panel.needs_render_context() => {
                panel.ui_with_render_context(ui, self.app_state, render_state, viewport_state);
            }
            _ => panel.ui(ui, self.app_state),
        }
    }

    fn closeable(&mut self, _tab: &mut Self::Tab) -> bool {
        false
    }
}

/// Create the default dock layout
pub fn create_dock_layout() -> DockState<PanelType> {
    let mut dock_state = DockState::new(vec![PanelType::Viewport(ViewportPanel::new())]);

    // Configuration form on the right
    let surface = dock_state.main_surface_mut();
    let [_viewport, _configurator] = surface.split_right(
        NodeIndex::root(),
        0.62,
        vec![PanelType::Configurator(ConfiguratorPanel::new())],
    );

    dock_state
}
