//! Global constants for straw-core

/// Minimum total straw quantity for an order (inclusive)
pub const MIN_ORDER_QUANTITY: u64 = 100_000;

/// Shortest orderable straw length in millimeters (inclusive)
pub const MIN_LENGTH_MM: f32 = 50.0;

/// Longest orderable straw length in millimeters (inclusive)
pub const MAX_LENGTH_MM: f32 = 999.0;

/// Default straw length in millimeters
pub const DEFAULT_LENGTH_MM: f32 = 300.0;

/// Default straw diameter in millimeters
pub const DEFAULT_DIAMETER_MM: f32 = 12.0;

/// Length range mapped onto the visual length scale
pub const VISUAL_LENGTH_RANGE_MM: (f32, f32) = (200.0, 400.0);

/// Visual length scale at the ends of [`VISUAL_LENGTH_RANGE_MM`]
pub const LENGTH_SCALE_RANGE: (f32, f32) = (0.8, 1.2);

/// Offered diameters (mm) and their radius multipliers
pub const DIAMETER_TABLE: [(f32, f32); 4] = [(3.0, 0.5), (5.5, 0.7), (8.0, 0.85), (12.0, 1.0)];

/// Radius multiplier for diameters outside [`DIAMETER_TABLE`]
pub const FALLBACK_RADIUS_MULTIPLIER: f32 = 1.0;

/// Storage key of the persisted configuration
pub const CONFIG_STORAGE_KEY: &str = "straw_configurator.config";

/// Format version of the persisted configuration
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Joint angle of a flexible straw (radians)
pub const FLEX_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

/// Joint angle of an extra flexible straw (radians)
pub const EXTRA_FLEX_ANGLE: f32 = 70.0 * std::f32::consts::PI / 180.0;

/// Uniform scale of the long-flex mesh
pub const LONG_FLEX_SCALE: f32 = 1.2;

/// Downward offset of the long-flex mesh inside the joint group
pub const LONG_FLEX_DROP: f32 = 0.05;

/// Vertical overlap between stacked parts so seams never open
pub const SEAM_OVERLAP: f32 = 0.002;

/// Knee sphere radius relative to the straw radius
pub const KNEE_RADIUS_FACTOR: f32 = 0.96;

/// Straight filler radius relative to the straw radius
pub const FILLER_RADIUS_FACTOR: f32 = 0.98;

/// Wrapper shell clearance around the assembled body
pub const WRAPPER_CLEARANCE: f32 = 1.08;

/// Default number of segments for cylinder mesh generation
pub const CYLINDER_SEGMENTS: u32 = 32;

/// Default number of latitude segments for sphere mesh generation
pub const SPHERE_LAT_SEGMENTS: u32 = 16;

/// Default number of longitude segments for sphere mesh generation
pub const SPHERE_LON_SEGMENTS: u32 = 32;

/// Default number of radial segments for lathe meshes
pub const LATHE_SEGMENTS: u32 = 64;

/// Edge length of generated textures in pixels
pub const TEXTURE_SIZE: u32 = 512;

/// Seconds the review flow waits for a snapshot before reviewing without one
pub const SNAPSHOT_TIMEOUT_SECS: f64 = 3.0;

/// Seconds the confirmation message stays up before the configuration resets
pub const CONFIRM_DELAY_SECS: f64 = 2.0;

/// File name of the exported order document
pub const ORDER_PDF_FILE_NAME: &str = "straw-order-config.pdf";
