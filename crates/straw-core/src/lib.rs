//! Straw Configurator Core
//!
//! Data model and rendering-independent logic for the straw configurator:
//! - Configuration: product options, validation and persistence
//! - Part library: OBJ straw parts with built-in fallbacks
//! - Assembly: configuration to scene subgraph
//! - Textures: procedural material textures
//! - Review: snapshot / summary / confirm flow, order summary and PDF export

pub mod assembly;
pub mod config;
pub mod constants;
pub mod export;
pub mod order;
pub mod part;
pub mod plan;
pub mod primitive;
pub mod review;
pub mod snapshot;
pub mod texture;

pub use assembly::*;
pub use config::*;
pub use constants::*;
pub use export::*;
pub use order::*;
pub use part::*;
pub use plan::*;
pub use primitive::*;
pub use review::*;
pub use snapshot::*;
pub use texture::*;
