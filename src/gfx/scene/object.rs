use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::catalog::Product;
use crate::gfx::geometry::Transform;

use super::model::Model;

/// Opaque identity of a placed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A piece of furniture placed in the scene.
///
/// The model is this object's own clone; no other object shares its
/// materials.
#[derive(Debug)]
pub struct PlacedObject {
    pub(crate) id: ObjectId,
    pub(crate) product: Arc<Product>,
    pub(crate) model: Model,
    pub(crate) transform: Transform,
    pub(crate) current_texture_id: String,
    pub(crate) selected: bool,
    /// Ticket of the newest texture request; older completions are dropped
    pub(crate) texture_request: u64,
}

impl PlacedObject {
    pub(crate) fn new(product: Arc<Product>, model: Model, transform: Transform, texture_id: String) -> Self {
        Self {
            id: ObjectId::new(),
            product,
            model,
            transform,
            current_texture_id: texture_id,
            selected: false,
            texture_request: 0,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Mutable model access for the renderer (clearing material dirty flags)
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn current_texture_id(&self) -> &str {
        &self.current_texture_id
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn view(&self) -> PlacedObjectView {
        PlacedObjectView {
            id: self.id,
            product_id: self.product.id.clone(),
            transform: self.transform,
            texture_id: self.current_texture_id.clone(),
            selected: self.selected,
        }
    }
}

/// Snapshot of a placed object for rendering and UI
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedObjectView {
    pub id: ObjectId,
    pub product_id: String,
    pub transform: Transform,
    pub texture_id: String,
    pub selected: bool,
}
