//! Decoded texture images and resolved texture map sets
//!
//! Textures are decoded once per URL and shared read-only between materials
//! through `Arc`. A material owns its map *slots*, so pointing one material at
//! a new image never affects any other material.

use std::sync::Arc;

use crate::error::LoadError;

/// RGBA8 image decoded from a texture source
#[derive(Clone, PartialEq)]
pub struct TextureImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Raw RGBA8 pixel data (4 bytes per pixel)
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureImage")
            .field("url", &self.url)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl TextureImage {
    /// Decodes PNG or JPEG bytes into an RGBA8 image
    pub fn decode(url: &str, bytes: &[u8]) -> Result<Self, LoadError> {
        let image = image::load_from_memory(bytes).map_err(|e| LoadError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let rgba = image.to_rgba8();

        Ok(Self {
            url: url.to_string(),
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }

    /// Builds an image from raw RGBA8 data
    pub fn from_rgba(url: &str, width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        Self {
            url: url.to_string(),
            width,
            height,
            rgba,
        }
    }
}

/// State of an optional map after resolving a texture variant
#[derive(Debug, Clone, Default)]
pub enum MapSlot {
    /// The variant does not define this map
    #[default]
    Absent,
    Loaded(Arc<TextureImage>),
    /// Defined by the variant but its load failed
    Failed,
}

impl MapSlot {
    pub fn image(&self) -> Option<&Arc<TextureImage>> {
        match self {
            MapSlot::Loaded(image) => Some(image),
            MapSlot::Absent | MapSlot::Failed => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MapSlot::Failed)
    }

    /// Writes this slot into a material map: absent clears, loaded replaces,
    /// failed keeps the current map.
    pub fn assign_to(&self, target: &mut Option<Arc<TextureImage>>) {
        match self {
            MapSlot::Absent => *target = None,
            MapSlot::Loaded(image) => *target = Some(Arc::clone(image)),
            MapSlot::Failed => {}
        }
    }
}

/// The images of one product texture variant, ready to assign to materials.
#[derive(Debug, Clone)]
pub struct TextureMaps {
    pub texture_id: String,
    pub diffuse: Arc<TextureImage>,
    pub normal: MapSlot,
    pub roughness: MapSlot,
}
