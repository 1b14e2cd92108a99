//! Editor settings. Serialized as JSON through `serde`; the desktop host
//! persists them with eframe's storage.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::shape::ShapeKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Shape drawn by "add shape" when the host does not ask for another one.
    pub default_shape: ShapeKind,
    /// Factor applied by the zoom in / zoom out actions.
    pub zoom_step: f64,
    /// Scale change per scroll unit (device pixels) for modifier + wheel zoom.
    pub scroll_zoom_sensitivity: f64,
    /// Undo stack depth. `0` keeps everything.
    pub max_undo_depth: usize,
    /// Side of a resize handle in device pixels.
    pub handle_size: f64,
    /// Interactively drawn shapes smaller than this (model units, either axis)
    /// are discarded.
    pub min_shape_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_shape: ShapeKind::Rectangle,
            zoom_step: 2.0,
            scroll_zoom_sensitivity: 0.01,
            max_undo_depth: 100,
            handle_size: 8.0,
            min_shape_size: 1.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "zoom_step must be greater than 1, got {}",
                self.zoom_step
            )));
        }
        if !self.scroll_zoom_sensitivity.is_finite() || self.scroll_zoom_sensitivity <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "scroll_zoom_sensitivity must be positive, got {}",
                self.scroll_zoom_sensitivity
            )));
        }
        if !self.handle_size.is_finite() || self.handle_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "handle_size must be positive, got {}",
                self.handle_size
            )));
        }
        if !self.min_shape_size.is_finite() || self.min_shape_size < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_shape_size must not be negative, got {}",
                self.min_shape_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = EditorConfig::from_json(r#"{ "zoom_step": 1.5 }"#).unwrap();
        assert_eq!(config.zoom_step, 1.5);
        assert_eq!(config.max_undo_depth, 100);
        assert_eq!(config.default_shape, ShapeKind::Rectangle);
    }

    #[test]
    fn rejects_shrinking_zoom_step() {
        let err = EditorConfig::from_json(r#"{ "zoom_step": 0.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = EditorConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn json_round_trip_keeps_values() {
        let config = EditorConfig {
            default_shape: ShapeKind::Oval,
            max_undo_depth: 0,
            ..EditorConfig::default()
        };
        let restored = EditorConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(restored, config);
    }
}
