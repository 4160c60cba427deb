//! Material system for textured PBR surfaces
//!
//! Each mesh of a model owns its materials. Texture images are shared through
//! `Arc`, but the map slots belong to the material, so re-skinning one object
//! leaves every other clone of the same model untouched.

use std::sync::Arc;

use super::texture::{TextureImage, TextureMaps};

/// Material definition with PBR factors and optional texture maps
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub diffuse_map: Option<Arc<TextureImage>>,
    pub normal_map: Option<Arc<TextureImage>>,
    pub roughness_map: Option<Arc<TextureImage>>,

    /// Set whenever a map or factor changes; the renderer clears it after
    /// re-uploading the material.
    needs_update: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            metallic: 0.0,
            roughness: 0.5,
            diffuse_map: None,
            normal_map: None,
            roughness_map: None,
            needs_update: true,
        }
    }
}

impl Material {
    /// Creates a new material with basic PBR properties
    ///
    /// # Arguments
    /// * `name` - Name of this material
    /// * `base_color` - RGBA base color
    /// * `metallic` - Metallic factor (0.0 = dielectric, 1.0 = metallic)
    /// * `roughness` - Surface roughness (0.0 = mirror, 1.0 = rough)
    pub fn new(name: &str, base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    /// Builder pattern: Set base color from RGB values
    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.base_color = [r, g, b, self.base_color[3]];
        self
    }

    /// Builder pattern: Set metallic factor
    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: Set roughness factor
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Assigns the maps of a texture variant.
    ///
    /// Maps the variant does not define are cleared. A defined map that failed
    /// to load leaves the material's current map in place.
    pub fn assign_maps(&mut self, maps: &TextureMaps) {
        self.diffuse_map = Some(Arc::clone(&maps.diffuse));
        maps.normal.assign_to(&mut self.normal_map);
        maps.roughness.assign_to(&mut self.roughness_map);
        self.mark_dirty();
    }

    pub fn mark_dirty(&mut self) {
        self.needs_update = true;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Returns the dirty flag and clears it. Called by the renderer after upload.
    pub fn take_needs_update(&mut self) -> bool {
        std::mem::replace(&mut self.needs_update, false)
    }
}
