// src/gfx/resources/mod.rs
//! Material and texture resources
//!
//! Materials carry the texture maps a renderer uploads; textures are decoded
//! images shared read-only between materials.

pub mod material;
pub mod texture;

// Re-export main types
pub use material::Material;
pub use texture::{MapSlot, TextureImage, TextureMaps};
