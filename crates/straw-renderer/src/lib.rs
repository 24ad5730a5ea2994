//! Straw Configurator Renderer
//!
//! WGPU-based 3D rendering of an assembled straw on its display platform.
//!
//! # Module Structure
//!
//! ```text
//! straw-renderer/
//! ├── config.rs        # Viewport, lighting, camera and animation settings
//! ├── camera.rs        # Orbit camera with a pinned polar angle
//! ├── auto_rotate.rs   # Idle auto-rotation and float animation
//! ├── scene.rs         # Model placement, ground mesh and draw list
//! ├── snapshot.rs      # Canonical-pose captures and readback
//! ├── vertex.rs        # Vertex formats
//! └── renderer.rs      # Main Renderer
//! ```

pub mod auto_rotate;
pub mod camera;
pub mod config;
pub mod renderer;
pub mod scene;
pub mod snapshot;
pub mod vertex;

// Re-exports for convenience
pub use auto_rotate::{AutoRotate, AutoRotateState, FloatAnimator};
pub use camera::*;
pub use config::RendererConfig;
pub use renderer::*;
pub use scene::{DrawItem, ScenePlacement};
pub use snapshot::{CaptureError, ContextLossFlag, ScopedCameraOverride, ViewState};
pub use vertex::MeshVertex;
