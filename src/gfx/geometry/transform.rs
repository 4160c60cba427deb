use cgmath::{Matrix4, Quaternion, Vector3};

use super::{zero_rotation, EulerRotation};

/// Position, rotation and uniform scale of a placed object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: EulerRotation,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: zero_rotation(),
            scale: 1.0,
        }
    }
}

impl Transform {
    /// Transform at `position` with zero rotation and unit scale
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Model matrix built as T * R * S
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.position);
        let r = Matrix4::from(Quaternion::from(self.rotation));
        let s = Matrix4::from_scale(self.scale);
        t * r * s
    }
}

/// Partial transform: only the supplied fields are written.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformUpdate {
    pub position: Option<Vector3<f32>>,
    pub rotation: Option<EulerRotation>,
    pub scale: Option<f32>,
}

impl TransformUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_rotation(mut self, rotation: EulerRotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.scale.is_none()
    }

    /// Merges the supplied fields into `transform`, clamping scale into
    /// `[min_scale, max_scale]`.
    pub fn apply(&self, transform: &mut Transform, min_scale: f32, max_scale: f32) {
        if let Some(position) = self.position {
            transform.position = position;
        }
        if let Some(rotation) = self.rotation {
            transform.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            // NaN would slip through clamp
            if !scale.is_nan() {
                transform.scale = scale.clamp(min_scale, max_scale);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Rad, SquareMatrix};

    #[test]
    fn test_update_merges_only_supplied_fields() {
        let mut transform = Transform::at(Vector3::new(0.0, 0.0, -1.0));
        TransformUpdate::new()
            .with_scale(1.5)
            .apply(&mut transform, 0.5, 2.0);

        assert_eq!(transform.position, Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(transform.rotation, zero_rotation());
        assert_eq!(transform.scale, 1.5);
    }

    #[test]
    fn test_update_clamps_scale() {
        let mut transform = Transform::default();

        TransformUpdate::new().with_scale(10.0).apply(&mut transform, 0.5, 2.0);
        assert_eq!(transform.scale, 2.0);

        TransformUpdate::new().with_scale(-3.0).apply(&mut transform, 0.5, 2.0);
        assert_eq!(transform.scale, 0.5);

        TransformUpdate::new().with_scale(f32::NAN).apply(&mut transform, 0.5, 2.0);
        assert_eq!(transform.scale, 0.5);
    }

    #[test]
    fn test_identity_matrix() {
        assert_eq!(Transform::default().to_matrix(), Matrix4::identity());
    }

    #[test]
    fn test_matrix_translation_column() {
        let mut transform = Transform::at(Vector3::new(1.0, 2.0, 3.0));
        transform.rotation.y = Rad(0.5);
        let matrix = transform.to_matrix();

        assert_eq!(matrix.w.x, 1.0);
        assert_eq!(matrix.w.y, 2.0);
        assert_eq!(matrix.w.z, 3.0);
    }
}
