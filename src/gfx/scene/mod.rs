//! # Scene Module
//!
//! Placed objects and the data they carry: per-object model clones, transforms,
//! selection, and the texture variant currently shown.
//!
//! ## Key Components
//!
//! - [`ObjectManager`] - owns every placed object; placement, selection,
//!   transform updates, texture changes and teardown
//! - [`PlacedObject`] - one piece of furniture in the scene
//! - [`Model`] / [`Mesh`] - geometry plus per-object materials
//! - [`Vertex3D`] - interleaved vertex layout handed to the renderer
//!
//! ## Object Management
//!
//! Objects in the scene support:
//! - Exactly-one-or-none selection
//! - Partial transform updates with clamped uniform scale
//! - Texture variant changes that never leak into other objects

pub mod manager;
pub mod model;
pub mod object;
pub mod vertex;

pub use manager::{Completion, ObjectManager};
pub use model::{Mesh, MeshGeometry, Model};
pub use object::{ObjectId, PlacedObject, PlacedObjectView};
pub use vertex::Vertex3D;
