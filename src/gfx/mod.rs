//! # Graphics Module
//!
//! Everything the placement engine knows about 3D space: transforms and
//! screen-space math, surface hit testing, materials and textures, and the
//! scene of placed objects.
//!
//! ## Architecture Overview
//!
//! - **Geometry** ([`geometry`]) - transforms and the small vector helpers gestures need
//! - **Hit Testing** ([`hit_test`]) - per-frame surface classification against the tracker
//! - **Resources** ([`resources`]) - materials and decoded texture images
//! - **Scene** ([`scene`]) - placed objects and their lifecycle
//!
//! Rendering itself belongs to the host; it reads [`scene::PlacedObjectView`]
//! snapshots and the per-object [`scene::Model`] through the object manager.

pub mod geometry;
pub mod hit_test;
pub mod resources;
pub mod scene;

pub use geometry::{Transform, TransformUpdate};
pub use hit_test::{SurfaceClassifier, SurfaceHit};
pub use scene::ObjectManager;
