// src/lib.rs
//! Furnish AR placement engine
//!
//! Detects placeable surfaces through a spatial-tracking service, loads and
//! caches furniture models and textures, and lets the user place, select,
//! move, rotate, scale and re-skin them with touch gestures. Rendering and the
//! platform AR runtime belong to the host.

pub mod assets;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gfx;
pub mod input;
pub mod prelude;
pub mod session;

// Re-export main types for convenience
pub use config::EngineConfig;
pub use error::{LoadError, PlacementError};
pub use session::ArSession;
