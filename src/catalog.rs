//! Product catalog types
//!
//! Products come from the commerce backend as JSON. The engine only needs the
//! model and texture URLs; price and names are carried through for the host.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One texture variant a product can be shown in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTexture {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub thumbnail_url: String,
    pub diffuse_url: String,
    #[serde(default)]
    pub normal_url: Option<String>,
    #[serde(default)]
    pub roughness_url: Option<String>,
    /// Set when this variant ships as its own model instead of a re-skin.
    #[serde(default)]
    pub model_url: Option<String>,
}

impl ProductTexture {
    /// True when the variant replaces the model instead of re-skinning it
    pub fn has_model_variant(&self) -> bool {
        self.model_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub model_url: Option<String>,
    pub textures: Vec<ProductTexture>,
    pub default_texture_id: String,
}

impl Product {
    pub fn texture(&self, texture_id: &str) -> Option<&ProductTexture> {
        self.textures.iter().find(|texture| texture.id == texture_id)
    }

    pub fn default_texture(&self) -> Option<&ProductTexture> {
        self.texture(&self.default_texture_id)
    }

    /// Model URL to load for the given texture: the variant's own model when it
    /// has one, the product's base model otherwise. Blank URLs count as absent.
    pub fn model_url_for<'a>(&'a self, texture: Option<&'a ProductTexture>) -> Option<&'a str> {
        texture
            .and_then(|texture| texture.model_url.as_deref())
            .or(self.model_url.as_deref())
            .filter(|url| !url.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.textures.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "product `{}` has no texture variants",
                self.id
            )));
        }
        if self.default_texture().is_none() {
            return Err(ConfigError::Invalid(format!(
                "product `{}` default texture `{}` is not in its texture list",
                self.id, self.default_texture_id
            )));
        }
        Ok(())
    }
}

/// A set of products keyed by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub products: Vec<Product>,
}

impl Catalog {
    /// Parses and validates a catalog document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        for product in &catalog.products {
            product.validate()?;
        }
        Ok(catalog)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }
}

/// Line handed to the commerce collaborator for each placed object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub product_id: String,
    pub texture_id: String,
    pub quantity: u32,
}
