//! # Transform & Geometry Primitives
//!
//! Small helpers shared by the gesture recognizer, the surface classifier and
//! the object manager. All math is done with `cgmath`; this module only adds
//! the handful of operations the placement engine needs on top of it.
//!
//! ## Contents
//!
//! - [`Transform`] / [`TransformUpdate`] - position, Euler rotation and uniform scale
//! - Screen-space helpers: [`distance`], [`center`], [`angle_about`]
//! - [`surface_normal`] - rotates the canonical up vector by a hit orientation
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Vector2;
//! use furnish::gfx::geometry::{center, distance};
//!
//! let a = Vector2::new(0.0, 0.0);
//! let b = Vector2::new(100.0, 0.0);
//! assert_eq!(distance(a, b), 100.0);
//! assert_eq!(center(a, b), Vector2::new(50.0, 0.0));
//! ```

pub mod transform;

pub use transform::{Transform, TransformUpdate};

use cgmath::{InnerSpace, Quaternion, Vector2, Vector3};

/// Euler rotation in radians, the representation stored on placed objects.
pub type EulerRotation = cgmath::Euler<cgmath::Rad<f32>>;

/// Canonical "up" direction of the tracking space.
pub const UP: Vector3<f32> = Vector3 {
    x: 0.0,
    y: 1.0,
    z: 0.0,
};

/// Euclidean distance between two screen points.
pub fn distance(a: Vector2<f32>, b: Vector2<f32>) -> f32 {
    (b - a).magnitude()
}

/// Midpoint of two screen points.
pub fn center(a: Vector2<f32>, b: Vector2<f32>) -> Vector2<f32> {
    (a + b) * 0.5
}

/// Angle of `point` around `pivot`, in radians, measured with `atan2`.
///
/// The result lies in `(-PI, PI]`. Callers that difference two angles get the
/// raw difference, including the jump across the `atan2` branch cut.
pub fn angle_about(point: Vector2<f32>, pivot: Vector2<f32>) -> f32 {
    let offset = point - pivot;
    offset.y.atan2(offset.x)
}

/// Normal of a surface whose pose has the given orientation.
pub fn surface_normal(orientation: Quaternion<f32>) -> Vector3<f32> {
    orientation * UP
}

/// Zero rotation.
pub fn zero_rotation() -> EulerRotation {
    cgmath::Euler::new(cgmath::Rad(0.0), cgmath::Rad(0.0), cgmath::Rad(0.0))
}
