//! Placed-object lifecycle, selection, and mutation
//!
//! The object collection is shared with in-flight placement and texture
//! tasks, so it lives behind a mutex that is never held across an `.await`.
//! Every async operation records the scene generation when it starts and
//! discards its result if the session was torn down in the meantime.

use std::sync::Arc;

use cgmath::Vector3;
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::assets::AssetCache;
use crate::catalog::{Product, ProductTexture};
use crate::config::EngineConfig;
use crate::error::{PlacementError, Result};
use crate::gfx::geometry::{Transform, TransformUpdate};
use crate::gfx::resources::TextureMaps;

use super::model::Model;
use super::object::{ObjectId, PlacedObject, PlacedObjectView};

/// Outcome of an async mutation that may lose a race with teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// The session ended, the object was removed, or a newer request for the
    /// same object superseded this one. Nothing was changed.
    Discarded,
}

impl Completion {
    pub fn is_applied(self) -> bool {
        self == Completion::Applied
    }
}

enum TextureChange {
    Maps(TextureMaps),
    Model(Model),
}

struct SceneState {
    objects: Vec<PlacedObject>,
    /// Bumped on teardown; async completions from an older generation are dropped
    generation: u64,
    next_texture_request: u64,
}

fn find_mut(objects: &mut [PlacedObject], id: ObjectId) -> Result<&mut PlacedObject> {
    objects
        .iter_mut()
        .find(|object| object.id == id)
        .ok_or(PlacementError::UnknownObject(id))
}

/// Owns every placed object of the session.
///
/// Cheap to clone; clones share the same collection.
#[derive(Clone)]
pub struct ObjectManager {
    state: Arc<Mutex<SceneState>>,
    assets: Arc<AssetCache>,
    config: Arc<EngineConfig>,
}

impl ObjectManager {
    pub fn new(assets: Arc<AssetCache>, config: EngineConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(SceneState {
                objects: Vec::new(),
                generation: 0,
                next_texture_request: 0,
            })),
            assets,
            config: Arc::new(config),
        }
    }

    pub fn assets(&self) -> &Arc<AssetCache> {
        &self.assets
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn default_transform(&self) -> Transform {
        Transform::at(Vector3::from(self.config.default_position))
    }

    fn is_current(&self, generation: u64) -> bool {
        self.state.lock().generation == generation
    }

    /// Loads the model a texture variant is shown with: the variant's own
    /// model, or the base model re-skinned with the variant's maps.
    async fn prepare_model(&self, product: &Product, texture: Option<&ProductTexture>) -> Result<Model> {
        let url = product
            .model_url_for(texture)
            .ok_or_else(|| PlacementError::NoModelAvailable(product.id.clone()))?;
        let mut model = self.assets.load_model(url).await?;

        if let Some(texture) = texture.filter(|texture| !texture.has_model_variant()) {
            self.assets.apply_texture(&mut model, texture, None).await?;
        }
        Ok(model)
    }

    /// Places a product at the default transform and selects it.
    ///
    /// `texture_id` picks the variant, the product default otherwise. Resolves
    /// to `Ok(None)` when the session was torn down before the model loaded.
    pub async fn place(
        &self,
        product: impl Into<Arc<Product>>,
        texture_id: Option<&str>,
    ) -> Result<Option<ObjectId>> {
        let product = product.into();
        let texture = match texture_id {
            Some(texture_id) => Some(product.texture(texture_id).ok_or_else(|| {
                PlacementError::UnknownTexture {
                    product_id: product.id.clone(),
                    texture_id: texture_id.to_string(),
                }
            })?),
            None => product.default_texture(),
        };
        let texture_id = texture
            .map(|texture| texture.id.clone())
            .unwrap_or_else(|| product.default_texture_id.clone());

        let generation = self.state.lock().generation;
        let model = match self.prepare_model(&product, texture).await {
            Ok(model) => model,
            Err(e) if !self.is_current(generation) => {
                debug!("placement of `{}` failed after session end: {}", product.id, e);
                return Ok(None);
            }
            Err(e) => {
                warn!("placement of `{}` failed: {}", product.id, e);
                return Err(e);
            }
        };

        let mut state = self.state.lock();
        if state.generation != generation {
            debug!("session ended while placing `{}`; discarding", product.id);
            return Ok(None);
        }

        let mut object = PlacedObject::new(
            Arc::clone(&product),
            model,
            self.default_transform(),
            texture_id,
        );
        object.selected = true;
        for other in &mut state.objects {
            other.selected = false;
        }
        let id = object.id;
        state.objects.push(object);

        info!(
            "placed `{}` as {} ({} objects in scene)",
            product.id,
            id,
            state.objects.len()
        );
        Ok(Some(id))
    }

    /// Selects `id` and deselects every other object; `None` clears the
    /// selection. An unknown id leaves the selection unchanged.
    pub fn select(&self, id: Option<ObjectId>) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(id) = id {
            if !state.objects.iter().any(|object| object.id == id) {
                return Err(PlacementError::UnknownObject(id));
            }
        }
        for object in &mut state.objects {
            object.selected = Some(object.id) == id;
        }
        Ok(())
    }

    /// Merges the supplied transform fields. Scale is clamped to the
    /// configured bounds here, so no reader ever sees an out-of-range scale.
    pub fn update_transform(&self, id: ObjectId, update: TransformUpdate) -> Result<Transform> {
        self.modify_transform(id, |_| update)
    }

    /// Read-modify-write of a transform under one lock
    pub fn modify_transform<F>(&self, id: ObjectId, f: F) -> Result<Transform>
    where
        F: FnOnce(&Transform) -> TransformUpdate,
    {
        let mut state = self.state.lock();
        let object = find_mut(&mut state.objects, id)?;
        let update = f(&object.transform);
        update.apply(&mut object.transform, self.config.min_scale, self.config.max_scale);
        Ok(object.transform)
    }

    /// Re-skins an object with another variant of its product.
    ///
    /// Unknown texture ids are rejected before anything loads. On a load
    /// failure the object keeps its current look and the error is returned.
    pub async fn change_texture(&self, id: ObjectId, texture_id: &str) -> Result<Completion> {
        let (product, texture, request, generation, current_source) = {
            let mut state = self.state.lock();
            let generation = state.generation;
            state.next_texture_request += 1;
            let request = state.next_texture_request;

            let object = find_mut(&mut state.objects, id)?;
            let texture = object.product.texture(texture_id).cloned().ok_or_else(|| {
                PlacementError::UnknownTexture {
                    product_id: object.product.id.clone(),
                    texture_id: texture_id.to_string(),
                }
            })?;
            object.texture_request = request;
            (
                Arc::clone(&object.product),
                texture,
                request,
                generation,
                object.model.source.clone(),
            )
        };

        let needs_new_model = texture.has_model_variant()
            || product.model_url_for(Some(&texture)) != Some(current_source.as_str());
        let change = if needs_new_model {
            self.prepare_model(&product, Some(&texture))
                .await
                .map(TextureChange::Model)
        } else {
            self.assets
                .resolve_texture(&texture)
                .await
                .map(TextureChange::Maps)
                .map_err(PlacementError::from)
        };

        let mut state = self.state.lock();
        if state.generation != generation {
            debug!("session ended while changing texture of {}; discarding", id);
            return Ok(Completion::Discarded);
        }
        let Some(object) = state.objects.iter_mut().find(|object| object.id == id) else {
            debug!("object {} was removed before texture `{}` loaded", id, texture.id);
            return Ok(Completion::Discarded);
        };
        if object.texture_request != request {
            debug!("texture `{}` for {} superseded by a newer request", texture.id, id);
            return Ok(Completion::Discarded);
        }

        match change {
            Ok(TextureChange::Maps(maps)) => {
                object.model.apply_maps(&maps, None);
            }
            Ok(TextureChange::Model(model)) => object.model = model,
            Err(e) => {
                warn!("texture `{}` for {} failed: {}", texture.id, id, e);
                return Err(e);
            }
        }
        object.current_texture_id = texture.id.clone();
        info!("{} now shows texture `{}`", id, texture.id);
        Ok(Completion::Applied)
    }

    /// Removes one object, releasing its model clone.
    pub fn remove(&self, id: ObjectId) -> Result<PlacedObject> {
        let mut state = self.state.lock();
        let index = state
            .objects
            .iter()
            .position(|object| object.id == id)
            .ok_or(PlacementError::UnknownObject(id))?;
        let object = state.objects.remove(index);
        info!("removed {} (`{}`)", id, object.product_id());
        Ok(object)
    }

    /// Drops every object and invalidates all in-flight tasks.
    pub fn teardown(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        let count = state.objects.len();
        state.objects.clear();
        info!("scene torn down ({} objects released)", count);
    }

    pub fn objects(&self) -> Vec<PlacedObjectView> {
        self.state.lock().objects.iter().map(PlacedObject::view).collect()
    }

    pub fn selected(&self) -> Option<ObjectId> {
        self.state
            .lock()
            .objects
            .iter()
            .find(|object| object.selected)
            .map(|object| object.id)
    }

    pub fn transform_of(&self, id: ObjectId) -> Option<Transform> {
        self.with_object(id, |object| object.transform)
    }

    pub fn with_object<R>(&self, id: ObjectId, f: impl FnOnce(&PlacedObject) -> R) -> Option<R> {
        let state = self.state.lock();
        state.objects.iter().find(|object| object.id == id).map(f)
    }

    pub fn with_object_mut<R>(
        &self,
        id: ObjectId,
        f: impl FnOnce(&mut PlacedObject) -> R,
    ) -> Option<R> {
        let mut state = self.state.lock();
        state.objects.iter_mut().find(|object| object.id == id).map(f)
    }

    pub fn len(&self) -> usize {
        self.state.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().objects.is_empty()
    }
}
