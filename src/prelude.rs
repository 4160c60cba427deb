//! # Furnish Prelude
//!
//! Commonly used types in one import.
//!
//! ```rust
//! use furnish::prelude::*;
//!
//! let config = EngineConfig::default().with_scale_bounds(0.25, 4.0);
//! let session = ArSession::new(Arc::new(MemoryFetcher::new()), config).unwrap();
//! assert!(session.placed_objects().is_empty());
//! ```

// Session and configuration
pub use crate::config::EngineConfig;
pub use crate::error::{LoadError, PlacementError};
pub use crate::session::{ArSession, PlacementTask, TextureTask};

// Catalog and assets
pub use crate::assets::{AssetCache, AssetFetcher, FileFetcher, MemoryFetcher};
pub use crate::catalog::{CartItem, Catalog, Product, ProductTexture};

// Scene, hit testing and input
pub use crate::gfx::geometry::{Transform, TransformUpdate};
pub use crate::gfx::hit_test::{Pose, ReferenceSpace, SpatialTracker, SurfaceClassifier, SurfaceHit};
pub use crate::gfx::scene::{Completion, ObjectId, ObjectManager, PlacedObjectView};
pub use crate::input::{GestureEvent, GestureHandler, GestureRecognizer, TouchPoint, TouchTracker};

// Common external types
pub use cgmath::{Quaternion, Vector2, Vector3};
pub use std::sync::Arc;
