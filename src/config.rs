use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gfx::hit_test::ReferenceSpace;

/// Tunables of the placement engine.
///
/// Every field has a default, so a JSON document only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// A hit is placeable when its normal's Y component is strictly above this.
    pub placeable_normal_threshold: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Where new objects appear, relative to the session origin (camera at start).
    pub default_position: [f32; 3],
    /// World units moved per screen pixel of one-finger drag.
    pub translate_sensitivity: f32,
    pub reference_space: ReferenceSpace,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            placeable_normal_threshold: 0.7,
            min_scale: 0.5,
            max_scale: 2.0,
            default_position: [0.0, 0.0, -1.0],
            translate_sensitivity: 0.005,
            reference_space: ReferenceSpace::Viewer,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_scale_bounds(mut self, min_scale: f32, max_scale: f32) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    pub fn with_default_position(mut self, position: [f32; 3]) -> Self {
        self.default_position = position;
        self
    }

    pub fn with_translate_sensitivity(mut self, sensitivity: f32) -> Self {
        self.translate_sensitivity = sensitivity;
        self
    }

    pub fn with_placeable_threshold(mut self, threshold: f32) -> Self {
        self.placeable_normal_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale > 0.0) || !(self.max_scale >= self.min_scale) {
            return Err(ConfigError::Invalid(format!(
                "scale bounds [{}, {}] must be positive and ordered",
                self.min_scale, self.max_scale
            )));
        }
        if !(-1.0..=1.0).contains(&self.placeable_normal_threshold) {
            return Err(ConfigError::Invalid(format!(
                "placeable normal threshold {} is outside [-1, 1]",
                self.placeable_normal_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{ "translate_sensitivity": 0.01, "reference_space": "local" }"#)
                .unwrap();

        assert_eq!(config.translate_sensitivity, 0.01);
        assert_eq!(config.reference_space, ReferenceSpace::Local);
        assert_eq!(config.min_scale, 0.5);
        assert_eq!(config.max_scale, 2.0);
        assert_eq!(config.default_position, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_rejects_inverted_scale_bounds() {
        let err = EngineConfig::from_json_str(r#"{ "min_scale": 3.0, "max_scale": 1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        assert!(EngineConfig::default().with_scale_bounds(0.0, 1.0).validate().is_err());
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            EngineConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
