//! URL-keyed asset cache with clone-on-read models and coalesced loads

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::catalog::ProductTexture;
use crate::error::LoadError;
use crate::gfx::resources::{MapSlot, TextureImage, TextureMaps};
use crate::gfx::scene::model::Model;

use super::fetch::AssetFetcher;
use super::obj::parse_obj;

type SharedLoad<T> = Shared<BoxFuture<'static, Result<Arc<T>, LoadError>>>;

/// Canonical entries plus the loads currently running, for one asset kind.
struct AssetTable<T> {
    ready: HashMap<String, Arc<T>>,
    /// Each in-flight load is tagged with a ticket so a finishing waiter only
    /// retires the load it actually awaited.
    in_flight: HashMap<String, (u64, SharedLoad<T>)>,
    next_ticket: u64,
}

impl<T> Default for AssetTable<T> {
    fn default() -> Self {
        Self {
            ready: HashMap::new(),
            in_flight: HashMap::new(),
            next_ticket: 0,
        }
    }
}

impl<T> AssetTable<T> {
    /// Forgets every entry. The ticket counter keeps running so a load
    /// started before the clear can never match a newer in-flight entry.
    fn clear(&mut self) {
        self.ready.clear();
        self.in_flight.clear();
    }
}

/// Returns the canonical asset for `url`, starting a load with `start` only
/// when the asset is neither cached nor already being loaded.
async fn get_or_load<T, F>(
    table: &Mutex<AssetTable<T>>,
    url: &str,
    start: F,
) -> Result<Arc<T>, LoadError>
where
    T: Send + Sync + 'static,
    F: FnOnce() -> BoxFuture<'static, Result<Arc<T>, LoadError>>,
{
    let (ticket, load) = {
        let mut state = table.lock();
        if let Some(asset) = state.ready.get(url) {
            debug!("cache hit: {}", url);
            return Ok(Arc::clone(asset));
        }
        match state.in_flight.get(url) {
            Some((ticket, load)) => {
                debug!("joining in-flight load: {}", url);
                (*ticket, load.clone())
            }
            None => {
                let ticket = state.next_ticket;
                state.next_ticket += 1;
                let load = start().shared();
                state
                    .in_flight
                    .insert(url.to_string(), (ticket, load.clone()));
                (ticket, load)
            }
        }
    };

    let result = load.await;

    let mut state = table.lock();
    let owns_entry = state
        .in_flight
        .get(url)
        .is_some_and(|(current, _)| *current == ticket);
    if owns_entry {
        state.in_flight.remove(url);
        // Failures are not cached: the next request fetches again.
        if let Ok(asset) = &result {
            state.ready.insert(url.to_string(), Arc::clone(asset));
        }
    }
    result
}

/// Strips query and fragment so `chair.obj?v=3` still dispatches on `.obj`.
fn extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    file.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

fn parse_model(url: &str, bytes: &[u8]) -> Result<Model, LoadError> {
    match extension(url).as_deref() {
        Some("obj") => parse_obj(url, bytes),
        _ => Err(LoadError::UnsupportedFormat {
            url: url.to_string(),
        }),
    }
}

/// Loads models and textures by URL and keeps one canonical copy of each for
/// the lifetime of the session.
///
/// Models are handed out as clones so each placed object can be re-skinned
/// independently. Textures are immutable and handed out as `Arc`s.
pub struct AssetCache {
    fetcher: Arc<dyn AssetFetcher>,
    models: Mutex<AssetTable<Model>>,
    textures: Mutex<AssetTable<TextureImage>>,
}

impl AssetCache {
    pub fn new(fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            fetcher,
            models: Mutex::new(AssetTable::default()),
            textures: Mutex::new(AssetTable::default()),
        }
    }

    /// Returns an independent clone of the model at `url`, fetching and
    /// parsing it on first use.
    pub async fn load_model(&self, url: &str) -> Result<Model, LoadError> {
        let fetcher = Arc::clone(&self.fetcher);
        let canonical = get_or_load(&self.models, url, || {
            let url = url.to_string();
            async move {
                let bytes = fetcher.fetch(&url).await?;
                let model = parse_model(&url, &bytes)?;
                info!(
                    "loaded model {} ({} meshes, {} triangles)",
                    url,
                    model.meshes.len(),
                    model.triangle_count()
                );
                Ok(Arc::new(model))
            }
            .boxed()
        })
        .await?;

        Ok(Model::clone(&canonical))
    }

    /// Returns the decoded texture at `url`, fetching it on first use.
    pub async fn load_texture(&self, url: &str) -> Result<Arc<TextureImage>, LoadError> {
        let fetcher = Arc::clone(&self.fetcher);
        get_or_load(&self.textures, url, || {
            let url = url.to_string();
            async move {
                let bytes = fetcher.fetch(&url).await?;
                let texture = TextureImage::decode(&url, &bytes)?;
                info!("loaded texture {} ({}x{})", url, texture.width, texture.height);
                Ok(Arc::new(texture))
            }
            .boxed()
        })
        .await
    }

    async fn load_optional(&self, url: Option<&str>, kind: &str) -> MapSlot {
        let Some(url) = url.filter(|url| !url.trim().is_empty()) else {
            return MapSlot::Absent;
        };
        match self.load_texture(url).await {
            Ok(texture) => MapSlot::Loaded(texture),
            Err(e) => {
                warn!("skipping {} map: {}", kind, e);
                MapSlot::Failed
            }
        }
    }

    /// Loads the maps of a texture variant.
    ///
    /// The diffuse map is required. Normal and roughness maps load
    /// independently; a failed optional map is logged and marked
    /// [`MapSlot::Failed`].
    pub async fn resolve_texture(&self, texture: &ProductTexture) -> Result<TextureMaps, LoadError> {
        let (diffuse, normal, roughness) = futures::join!(
            self.load_texture(&texture.diffuse_url),
            self.load_optional(texture.normal_url.as_deref(), "normal"),
            self.load_optional(texture.roughness_url.as_deref(), "roughness"),
        );

        Ok(TextureMaps {
            texture_id: texture.id.clone(),
            diffuse: diffuse?,
            normal,
            roughness,
        })
    }

    /// Loads a texture variant and assigns it to `model`'s materials,
    /// optionally only to meshes named `material_filter`.
    ///
    /// Nothing is assigned unless the diffuse map loaded. Returns the number
    /// of materials updated.
    pub async fn apply_texture(
        &self,
        model: &mut Model,
        texture: &ProductTexture,
        material_filter: Option<&str>,
    ) -> Result<usize, LoadError> {
        let maps = self.resolve_texture(texture).await?;
        let updated = model.apply_maps(&maps, material_filter);
        debug!(
            "applied texture `{}` to {} materials of {}",
            texture.id, updated, model.source
        );
        Ok(updated)
    }

    pub fn contains_model(&self, url: &str) -> bool {
        self.models.lock().ready.contains_key(url)
    }

    pub fn cached_model_count(&self) -> usize {
        self.models.lock().ready.len()
    }

    pub fn cached_texture_count(&self) -> usize {
        self.textures.lock().ready.len()
    }

    /// Drops every cached asset. Loads still running finish for their
    /// callers but are not stored.
    pub fn clear(&self) {
        self.models.lock().clear();
        self.textures.lock().clear();
    }
}
