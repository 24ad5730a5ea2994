//! Renderer configuration structures
//!
//! Settings for the configurator scene that can be serialized and loaded
//! from configuration files. Every section falls back to its defaults when
//! missing.

use serde::{Deserialize, Serialize};

/// Viewport rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewportConfig {
    /// Background clear color (RGBA, linear)
    pub background_color: [f32; 4],
    /// MSAA sample count (1 = disabled, 4)
    pub msaa_sample_count: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            background_color: [0.88, 0.9, 0.93, 1.0],
            msaa_sample_count: 4,
        }
    }
}

/// Lighting configuration: one key light, one fill light and ambient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LightingConfig {
    /// Direction the key light shines from (normalized in the shader)
    pub key_direction: [f32; 3],
    /// Key light color (RGB)
    pub key_color: [f32; 3],
    /// Key light intensity multiplier
    pub key_intensity: f32,
    /// Direction the fill light shines from
    pub fill_direction: [f32; 3],
    /// Fill light intensity multiplier
    pub fill_intensity: f32,
    /// Ambient light color (RGB)
    pub ambient_color: [f32; 3],
    /// Ambient light strength
    pub ambient_strength: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            key_direction: [5.0, 10.0, 7.0],
            key_color: [1.0, 1.0, 1.0],
            key_intensity: 1.0,
            fill_direction: [-6.0, 3.0, -4.0],
            fill_intensity: 0.35,
            ambient_color: [1.0, 1.0, 1.0],
            ambient_strength: 0.45,
        }
    }
}

/// Orbit camera configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraConfig {
    /// Field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near_plane: f32,
    /// Far clipping plane distance
    pub far_plane: f32,
    /// Canonical camera position, looking at the origin
    pub position: [f32; 3],
    /// Fixed polar angle from +Y, in radians
    pub polar_angle: f32,
    /// Minimum orbit distance
    pub min_distance: f32,
    /// Maximum orbit distance
    pub max_distance: f32,
    /// Orbit sensitivity (radians per pixel)
    pub orbit_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near_plane: 0.1,
            far_plane: 100.0,
            position: [8.0, 4.0, 10.0],
            polar_angle: std::f32::consts::PI / 2.5,
            min_distance: 5.0,
            max_distance: 15.0,
            orbit_sensitivity: 0.008,
        }
    }
}

/// Idle auto-rotate and float animation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoRotateConfig {
    /// Whether auto-rotate is enabled at all
    pub enabled: bool,
    /// Inactivity window before auto-rotating, in seconds
    pub idle_delay_secs: f64,
    /// Rotation speed; 1.0 is one turn per minute
    pub speed: f32,
    /// Float offset amplitude
    pub float_amplitude: f32,
    /// Float angular frequency (radians per second)
    pub float_frequency: f32,
    /// Per-frame lerp factor toward the float target while rotating
    pub float_lerp: f32,
    /// Per-frame lerp factor back to rest otherwise
    pub settle_lerp: f32,
}

impl Default for AutoRotateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            idle_delay_secs: 2.0,
            speed: 1.5,
            float_amplitude: 0.15,
            float_frequency: 0.5,
            float_lerp: 0.02,
            settle_lerp: 0.1,
        }
    }
}

/// Placement of the straw model and the ground platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneConfig {
    /// Vertical offset of the model group
    pub group_offset_y: f32,
    /// Vertical offset of the model inside its group
    pub model_offset_y: f32,
    /// Uniform model scale (parts are authored in meters)
    pub model_scale: f32,
    /// Model rotation as XYZ Euler angles in radians
    pub model_rotation: [f32; 3],
    /// Ground platform top radius
    pub ground_radius: f32,
    /// Ground platform height
    pub ground_height: f32,
    /// Ground platform edge bevel
    pub ground_bevel: f32,
    /// Vertical position of the ground platform center
    pub ground_y: f32,
    /// Contact shadow radius on the platform top
    pub shadow_radius: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            group_offset_y: -1.0,
            model_offset_y: -1.0,
            model_scale: 22.0,
            model_rotation: [0.1, std::f32::consts::PI / 1.5, 0.0],
            ground_radius: 3.0,
            ground_height: 0.5,
            ground_bevel: 0.2,
            ground_y: -3.5,
            shadow_radius: 1.2,
        }
    }
}

/// Snapshot capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotConfig {
    /// Capture width in pixels
    pub width: u32,
    /// Capture height in pixels
    pub height: u32,
    /// Background color of captured images (RGBA, linear)
    pub background_color: [f32; 4],
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            background_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Complete renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RendererConfig {
    /// Viewport settings
    #[serde(default)]
    pub viewport: ViewportConfig,
    /// Lighting settings
    #[serde(default)]
    pub lighting: LightingConfig,
    /// Camera settings
    #[serde(default)]
    pub camera: CameraConfig,
    /// Auto-rotate settings
    #[serde(default)]
    pub auto_rotate: AutoRotateConfig,
    /// Scene placement settings
    #[serde(default)]
    pub scene: SceneConfig,
    /// Snapshot settings
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl RendererConfig {
    /// Create a new renderer configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// MSAA sample count limited to the values the pipelines support
    pub fn sample_count(&self) -> u32 {
        if self.viewport.msaa_sample_count >= 4 {
            4
        } else {
            1
        }
    }
}
