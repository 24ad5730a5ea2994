//! Straw Configurator Frontend
//!
//! egui-based application for configuring drinking straws and reviewing
//! bulk orders.

pub mod actions;
pub mod app;
pub mod assets;
pub mod panels;
pub mod state;

// Re-exports for convenience
pub use app::StrawConfiguratorApp;
pub use state::{AppAction, AppState, SharedAppState};
