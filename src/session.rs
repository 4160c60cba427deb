//! # AR Session
//!
//! [`ArSession`] wires the pieces together: per-frame surface classification,
//! touch gestures applied to the selected object, placement at the detected
//! surface, and the requests the host UI sends down (add product, change
//! texture, cart contents).
//!
//! The per-frame path ([`ArSession::on_frame`], gesture handling) is
//! synchronous. Loads come back as `'static` futures the host drives on its
//! own executor.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use furnish::assets::FileFetcher;
//! use furnish::catalog::Catalog;
//! use furnish::gfx::hit_test::scripted::ScriptedTracker;
//! use furnish::{ArSession, EngineConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let catalog = Catalog::from_json_str(&std::fs::read_to_string("assets/catalog.json")?)?;
//! let sofa = catalog
//!     .product("sofa-01")
//!     .cloned()
//!     .ok_or_else(|| anyhow::anyhow!("sofa-01 not in catalog"))?;
//!
//! let fetcher = Arc::new(FileFetcher::with_root("assets"));
//! let mut session = ArSession::new(fetcher, EngineConfig::default())?;
//! session.start();
//! session.arm_placement(sofa, None)?;
//!
//! // every frame
//! let mut tracker = ScriptedTracker::presenting();
//! session.on_frame(&mut tracker);
//!
//! // on the user's select tap
//! if let Some(task) = session.confirm_placement() {
//!     let placed = pollster::block_on(task)?;
//!     println!("placed {:?}", placed);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cgmath::{Euler, Rad, Vector2, Vector3};
use futures::future::{BoxFuture, FutureExt};
use log::{debug, info};
use winit::event::Touch;

use crate::assets::{AssetCache, AssetFetcher};
use crate::catalog::{CartItem, Product};
use crate::config::EngineConfig;
use crate::error::{ConfigError, PlacementError, Result};
use crate::gfx::geometry::{Transform, TransformUpdate};
use crate::gfx::hit_test::{SpatialTracker, SurfaceClassifier, SurfaceHit};
use crate::gfx::scene::{Completion, ObjectId, ObjectManager, PlacedObjectView};
use crate::input::{GestureEvent, GestureHandler, TouchTracker};

/// Placement running on the host's executor. Resolves to the new object's id,
/// or `None` if the session ended first.
pub type PlacementTask = BoxFuture<'static, Result<Option<ObjectId>>>;

/// Texture change running on the host's executor
pub type TextureTask = BoxFuture<'static, Result<Completion>>;

/// Product waiting for the user to confirm a surface
#[derive(Debug, Clone)]
struct ArmedProduct {
    product: Arc<Product>,
    texture_id: Option<String>,
}

/// Clears the in-flight flag when the placement task finishes or is dropped
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ArSession {
    config: EngineConfig,
    objects: ObjectManager,
    classifier: SurfaceClassifier,
    touches: TouchTracker,
    armed: Option<ArmedProduct>,
    latest_hit: Option<SurfaceHit>,
    placing: Arc<AtomicBool>,
    active: bool,
}

impl ArSession {
    pub fn new(fetcher: Arc<dyn AssetFetcher>, config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_cache(Arc::new(AssetCache::new(fetcher)), config)
    }

    /// Builds a session on an existing cache
    pub fn with_cache(assets: Arc<AssetCache>, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            classifier: SurfaceClassifier::with_space(
                config.reference_space,
                config.placeable_normal_threshold,
            ),
            objects: ObjectManager::new(assets, config.clone()),
            touches: TouchTracker::new(),
            armed: None,
            latest_hit: None,
            placing: Arc::new(AtomicBool::new(false)),
            active: false,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn objects(&self) -> &ObjectManager {
        &self.objects
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Latest placeable surface seen by [`Self::on_frame`]
    pub fn latest_hit(&self) -> Option<SurfaceHit> {
        self.latest_hit
    }

    fn ensure_active(&self) -> Result<()> {
        if self.active {
            Ok(())
        } else {
            Err(PlacementError::SessionInactive)
        }
    }

    pub fn is_placing(&self) -> bool {
        self.placing.load(Ordering::Acquire)
    }

    pub fn start(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        info!("AR session started");
    }

    /// Stops hit testing, drops every placed object and the asset cache.
    ///
    /// Placement and texture tasks still running resolve without effect.
    pub fn end(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.classifier.reset();
        self.objects.teardown();
        self.objects.assets().clear();
        self.armed = None;
        self.latest_hit = None;
        self.touches = TouchTracker::new();
        info!("AR session ended");
    }

    /// Per-frame hit test. Returns the placeable surface under the viewport
    /// center, if any, for the host to draw a reticle at.
    pub fn on_frame<T: SpatialTracker + ?Sized>(&mut self, tracker: &mut T) -> Option<SurfaceHit> {
        if !self.active {
            return None;
        }
        self.latest_hit = self.classifier.classify_placeable(tracker);
        self.latest_hit
    }

    /// Chooses the product the next confirmed surface will receive.
    pub fn arm_placement(
        &mut self,
        product: impl Into<Arc<Product>>,
        texture_id: Option<&str>,
    ) -> Result<()> {
        self.ensure_active()?;
        let product = product.into();
        if let Some(texture_id) = texture_id {
            if product.texture(texture_id).is_none() {
                return Err(PlacementError::UnknownTexture {
                    product_id: product.id.clone(),
                    texture_id: texture_id.to_string(),
                });
            }
        }
        debug!("armed `{}` for surface placement", product.id);
        self.armed = Some(ArmedProduct {
            product,
            texture_id: texture_id.map(str::to_string),
        });
        Ok(())
    }

    /// The user's select tap. Starts placing the armed product at the latest
    /// placeable surface, but only into an empty scene and only one at a time.
    pub fn confirm_placement(&mut self) -> Option<PlacementTask> {
        let armed = self.armed.clone()?;
        let hit = self.latest_hit?;
        if !self.objects.is_empty() {
            debug!("surface placement ignored: scene already has objects");
            return None;
        }
        if self.placing.swap(true, Ordering::AcqRel) {
            debug!("surface placement ignored: a placement is in flight");
            return None;
        }

        let in_flight = InFlight(Arc::clone(&self.placing));
        let objects = self.objects.clone();
        Some(
            async move {
                let _in_flight = in_flight;
                let placed = objects
                    .place(armed.product, armed.texture_id.as_deref())
                    .await?;
                let Some(id) = placed else {
                    return Ok(None);
                };
                // By id: the object may have been removed since the load finished
                let moved = objects.with_object_mut(id, |object| {
                    object.transform.position = hit.position;
                });
                Ok(moved.map(|()| id))
            }
            .boxed(),
        )
    }

    /// Places a product at the configured default offset.
    pub fn add_product(&self, product: impl Into<Arc<Product>>, texture_id: Option<&str>) -> PlacementTask {
        if let Err(e) = self.ensure_active() {
            return futures::future::ready(Err(e)).boxed();
        }
        let objects = self.objects.clone();
        let product = product.into();
        let texture_id = texture_id.map(str::to_string);
        async move { objects.place(product, texture_id.as_deref()).await }.boxed()
    }

    /// Re-skins whichever object is selected now.
    pub fn change_selected_texture(&self, texture_id: &str) -> TextureTask {
        if let Err(e) = self.ensure_active() {
            return futures::future::ready(Err(e)).boxed();
        }
        let Some(id) = self.objects.selected() else {
            return futures::future::ready(Err(PlacementError::NothingSelected)).boxed();
        };
        let objects = self.objects.clone();
        let texture_id = texture_id.to_string();
        async move { objects.change_texture(id, &texture_id).await }.boxed()
    }

    pub fn select(&self, id: Option<ObjectId>) -> Result<()> {
        self.ensure_active()?;
        self.objects.select(id)
    }

    pub fn placed_objects(&self) -> Vec<PlacedObjectView> {
        self.objects.objects()
    }

    /// One cart line per placed object
    pub fn cart_items(&self) -> Vec<CartItem> {
        self.objects
            .objects()
            .into_iter()
            .map(|object| CartItem {
                product_id: object.product_id,
                texture_id: object.texture_id,
                quantity: 1,
            })
            .collect()
    }

    /// Applies a recognized gesture to the selected object.
    pub fn handle_gesture(&mut self, event: GestureEvent) {
        event.dispatch(self);
    }

    /// Feeds a winit touch event through the recognizer.
    pub fn handle_touch(&mut self, touch: &Touch) {
        if let Some(event) = self.touches.handle(touch) {
            self.handle_gesture(event);
        }
    }

    fn modify_selected<F>(&self, f: F) -> Option<Transform>
    where
        F: FnOnce(&Transform) -> TransformUpdate,
    {
        let id = self.objects.selected()?;
        self.objects.modify_transform(id, f).ok()
    }
}

impl GestureHandler for ArSession {
    fn on_translate(&mut self, delta: Vector2<f32>) {
        let offset = Vector3::new(delta.x, 0.0, delta.y) * self.config.translate_sensitivity;
        self.modify_selected(|current| TransformUpdate::new().with_position(current.position + offset));
    }

    fn on_rotate(&mut self, delta_angle: f32) {
        self.modify_selected(|current| {
            TransformUpdate::new().with_rotation(Euler {
                y: current.rotation.y + Rad(delta_angle),
                ..current.rotation
            })
        });
    }

    fn on_scale(&mut self, delta_scale: f32) {
        self.modify_selected(|current| TransformUpdate::new().with_scale(current.scale + delta_scale));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::fixtures::{self, GatedFetcher};
    use crate::assets::MemoryFetcher;
    use crate::gfx::hit_test::scripted::{ScriptedFrame, ScriptedTracker};
    use cgmath::{Quaternion, Rotation3};
    use rand::{Rng, SeedableRng};

    fn session() -> (Arc<MemoryFetcher>, ArSession) {
        let fetcher = Arc::new(fixtures::sofa_fetcher());
        let mut session = ArSession::new(fetcher.clone(), EngineConfig::default()).unwrap();
        session.start();
        (fetcher, session)
    }

    fn add_sofa(session: &ArSession) -> ObjectId {
        pollster::block_on(session.add_product(fixtures::sofa(), None))
            .unwrap()
            .unwrap()
    }

    fn floor_tracker(position: Vector3<f32>) -> ScriptedTracker {
        let mut tracker = ScriptedTracker::presenting();
        tracker.push_hit(position, Quaternion::new(1.0, 0.0, 0.0, 0.0));
        tracker
    }

    fn pinch(scale_delta: f32, rotate_delta: f32) -> GestureEvent {
        GestureEvent::Pinch {
            scale_delta,
            rotate_delta,
        }
    }

    #[test]
    fn test_two_rotations_accumulate() {
        let (_, mut session) = session();
        let id = add_sofa(&session);

        session.handle_gesture(pinch(0.0, 0.3));
        session.handle_gesture(pinch(0.0, 0.3));

        let transform = session.objects().transform_of(id).unwrap();
        assert!((transform.rotation.y.0 - 0.6).abs() < 1e-6);
        assert_eq!(transform.rotation.x, Rad(0.0));
        assert_eq!(transform.scale, 1.0);
        assert_eq!(transform.position, Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_translate_moves_on_floor_plane() {
        let (_, mut session) = session();
        let id = add_sofa(&session);

        session.handle_gesture(GestureEvent::Translate(Vector2::new(100.0, -40.0)));

        let position = session.objects().transform_of(id).unwrap().position;
        assert!((position.x - 0.5).abs() < 1e-6);
        assert_eq!(position.y, 0.0);
        assert!((position.z - (-1.2)).abs() < 1e-6);
    }

    #[test]
    fn test_pinch_scale_stays_clamped() {
        let (_, mut session) = session();
        let id = add_sofa(&session);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        for _ in 0..200 {
            session.handle_gesture(pinch(rng.random_range(-1.5..1.5), 0.0));
            let scale = session.objects().transform_of(id).unwrap().scale;
            assert!((0.5..=2.0).contains(&scale));
        }
    }

    #[test]
    fn test_gestures_only_touch_selected_object() {
        let (_, mut session) = session();
        let a = add_sofa(&session);
        let b = add_sofa(&session);

        session.handle_gesture(pinch(0.5, 0.0));
        assert_eq!(session.objects().transform_of(a).unwrap().scale, 1.0);
        assert_eq!(session.objects().transform_of(b).unwrap().scale, 1.5);

        session.select(None).unwrap();
        session.handle_gesture(pinch(0.5, 0.0));
        assert_eq!(session.objects().transform_of(b).unwrap().scale, 1.5);
    }

    #[test]
    fn test_on_frame_keeps_only_placeable_hits() {
        let (_, mut session) = session();
        let mut tracker = ScriptedTracker::presenting();
        // Wall: up vector rotated onto +Z
        tracker.push_hit(
            Vector3::new(0.0, 1.0, -2.0),
            Quaternion::from_angle_x(Rad(std::f32::consts::FRAC_PI_2)),
        );
        tracker.push(ScriptedFrame::Miss);
        tracker.push_hit(Vector3::new(0.0, 0.0, -1.5), Quaternion::new(1.0, 0.0, 0.0, 0.0));

        assert!(session.on_frame(&mut tracker).is_none());
        assert!(session.on_frame(&mut tracker).is_none());
        let hit = session.on_frame(&mut tracker).unwrap();
        assert_eq!(hit.position, Vector3::new(0.0, 0.0, -1.5));
        assert_eq!(session.latest_hit(), Some(hit));
    }

    #[test]
    fn test_confirm_places_at_surface() {
        let (_, mut session) = session();
        let mut tracker = floor_tracker(Vector3::new(0.3, -1.4, -2.0));
        session.arm_placement(fixtures::sofa(), Some("velvet")).unwrap();
        session.on_frame(&mut tracker);

        let task = session.confirm_placement().unwrap();
        let id = pollster::block_on(task).unwrap().unwrap();

        let view = &session.placed_objects()[0];
        assert_eq!(view.id, id);
        assert_eq!(view.texture_id, "velvet");
        assert_eq!(view.transform.position, Vector3::new(0.3, -1.4, -2.0));
        assert!(!session.is_placing());
    }

    #[test]
    fn test_confirm_requires_armed_product_and_hit() {
        let (_, mut session) = session();
        assert!(session.confirm_placement().is_none());

        session.arm_placement(fixtures::sofa(), None).unwrap();
        assert!(session.confirm_placement().is_none());
    }

    #[test]
    fn test_confirm_ignored_when_scene_not_empty() {
        let (_, mut session) = session();
        add_sofa(&session);
        let mut tracker = floor_tracker(Vector3::new(0.0, -1.0, -1.0));
        session.arm_placement(fixtures::sofa(), None).unwrap();
        session.on_frame(&mut tracker);

        assert!(session.confirm_placement().is_none());
    }

    #[test]
    fn test_one_placement_in_flight() {
        let (_, mut session) = session();
        let mut tracker = floor_tracker(Vector3::new(0.0, -1.0, -1.0));
        session.arm_placement(fixtures::sofa(), None).unwrap();
        session.on_frame(&mut tracker);

        let first = session.confirm_placement().unwrap();
        assert!(session.is_placing());
        assert!(session.confirm_placement().is_none());

        drop(first);
        assert!(!session.is_placing());
        assert!(session.confirm_placement().is_some());
    }

    #[test]
    fn test_arm_rejects_unknown_texture() {
        let (_, mut session) = session();

        let err = session.arm_placement(fixtures::sofa(), Some("tweed")).unwrap_err();

        assert!(matches!(err, PlacementError::UnknownTexture { .. }));
    }

    #[test]
    fn test_change_selected_texture() {
        let (_, session) = session();
        let err = pollster::block_on(session.change_selected_texture("velvet")).unwrap_err();
        assert!(matches!(err, PlacementError::NothingSelected));

        add_sofa(&session);
        let done = pollster::block_on(session.change_selected_texture("velvet")).unwrap();
        assert_eq!(done, Completion::Applied);
        assert_eq!(session.placed_objects()[0].texture_id, "velvet");
    }

    #[test]
    fn test_cart_lists_each_object() {
        let (_, session) = session();
        add_sofa(&session);
        pollster::block_on(session.add_product(fixtures::sofa(), Some("leather")))
            .unwrap()
            .unwrap();

        let cart = session.cart_items();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart[0].texture_id, "linen");
        assert_eq!(cart[1].texture_id, "leather");
        assert!(cart.iter().all(|item| item.product_id == "sofa-01" && item.quantity == 1));
    }

    #[test]
    fn test_end_releases_everything() {
        let (_, mut session) = session();
        add_sofa(&session);
        let mut tracker = floor_tracker(Vector3::new(0.0, -1.0, -1.0));
        session.on_frame(&mut tracker);
        assert!(session.objects().assets().cached_model_count() > 0);

        session.end();

        assert!(session.placed_objects().is_empty());
        assert_eq!(session.objects().assets().cached_model_count(), 0);
        assert_eq!(session.objects().assets().cached_texture_count(), 0);
        assert!(session.latest_hit().is_none());
        assert!(session.on_frame(&mut tracker).is_none());
    }

    #[test]
    fn test_end_during_placement_discards_it() {
        let fetcher = Arc::new(GatedFetcher::new(fixtures::sofa_fetcher()));
        let mut session = ArSession::new(fetcher.clone(), EngineConfig::default()).unwrap();
        session.start();
        let release = fetcher.gate(fixtures::SOFA_URL);
        let mut task = session.add_product(fixtures::sofa(), None);

        // First poll starts the gated fetch
        assert!((&mut task).now_or_never().is_none());
        session.end();
        release.send(()).unwrap();

        assert!(pollster::block_on(task).unwrap().is_none());
        assert!(session.placed_objects().is_empty());
    }

    #[test]
    fn test_requests_after_end_are_rejected() {
        let (fetcher, mut session) = session();
        let id = add_sofa(&session);
        session.end();
        let fetches = fetcher.fetch_count();

        let placed = pollster::block_on(session.add_product(fixtures::sofa(), None));
        let textured = pollster::block_on(session.change_selected_texture("velvet"));

        assert!(matches!(placed, Err(PlacementError::SessionInactive)));
        assert!(matches!(textured, Err(PlacementError::SessionInactive)));
        assert!(matches!(session.select(Some(id)), Err(PlacementError::SessionInactive)));
        assert!(matches!(
            session.arm_placement(fixtures::sofa(), None),
            Err(PlacementError::SessionInactive)
        ));
        assert!(session.placed_objects().is_empty());
        assert_eq!(fetcher.fetch_count(), fetches);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let fetcher = Arc::new(MemoryFetcher::new());
        let config = EngineConfig::default().with_scale_bounds(2.0, 0.5);

        assert!(ArSession::new(fetcher, config).is_err());
    }
}
