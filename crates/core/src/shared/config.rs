use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::shared::constants::DEFAULT_BLINK_THRESHOLD;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("sampleStride must be >= 1, got {0}")]
    SampleStride(u64),
    #[error("blinkThreshold must lie in (0.0, 1.0), got {0}")]
    BlinkThreshold(f32),
    #[error("imageQuality must lie in (0.0, 1.0], got {0}")]
    ImageQuality(f32),
    #[error("maxImageWidth must be > 0")]
    MaxImageWidth,
}

/// Immutable settings snapshot for one detection session.
///
/// Only `blink_threshold` and `capture_on_blink` are consumed by the blink
/// tracker; `sample_stride` drives frame throttling in the orchestrator and
/// the remaining fields are pass-through hints for the capture collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectionConfig {
    /// Process every Nth frame (1 = every frame).
    pub sample_stride: usize,
    /// Eye open-probability cutoff; `prob >= threshold` classifies "open".
    pub blink_threshold: f32,
    /// Pair each confirmed blink with a captured still.
    pub capture_on_blink: bool,
    /// Crop captured stills to the face bounds.
    pub crop_to_face: bool,
    /// Encoder quality hint for captured stills.
    pub image_quality: f32,
    /// Width cap for captured stills; `None` leaves them unscaled.
    pub max_image_width: Option<u32>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sample_stride: 1,
            blink_threshold: DEFAULT_BLINK_THRESHOLD,
            capture_on_blink: false,
            crop_to_face: false,
            image_quality: 1.0,
            max_image_width: None,
        }
    }
}

impl DetectionConfig {
    /// Builds a validated config from a loosely-typed JSON bag.
    ///
    /// Unrecognized keys are ignored and wrong-typed values fall back to
    /// defaults, matching how embedders pass option maps across language
    /// boundaries. Recognized values outside their domain are rejected, not
    /// clamped, so a caller bug stays visible.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(stride) = map.get("sampleStride").and_then(Value::as_u64) {
            if stride < 1 {
                return Err(ConfigError::SampleStride(stride));
            }
            config.sample_stride = stride as usize;
        }
        if let Some(threshold) = map.get("blinkThreshold").and_then(Value::as_f64) {
            config.blink_threshold = threshold as f32;
        }
        if let Some(capture) = map.get("captureOnBlink").and_then(Value::as_bool) {
            config.capture_on_blink = capture;
        }
        if let Some(crop) = map.get("cropToFace").and_then(Value::as_bool) {
            config.crop_to_face = crop;
        }
        if let Some(quality) = map.get("imageQuality").and_then(Value::as_f64) {
            config.image_quality = quality as f32;
        }
        if let Some(width) = map.get("maxImageWidth").and_then(Value::as_u64) {
            if width == 0 {
                return Err(ConfigError::MaxImageWidth);
            }
            config.max_image_width = Some(width as u32);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_stride < 1 {
            return Err(ConfigError::SampleStride(self.sample_stride as u64));
        }
        if !(self.blink_threshold > 0.0 && self.blink_threshold < 1.0) {
            return Err(ConfigError::BlinkThreshold(self.blink_threshold));
        }
        if !(self.image_quality > 0.0 && self.image_quality <= 1.0) {
            return Err(ConfigError::ImageQuality(self.image_quality));
        }
        if self.max_image_width == Some(0) {
            return Err(ConfigError::MaxImageWidth);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.sample_stride, 1);
        assert_relative_eq!(config.blink_threshold, 0.5);
        assert!(!config.capture_on_blink);
        assert!(!config.crop_to_face);
        assert_relative_eq!(config.image_quality, 1.0);
        assert_eq!(config.max_image_width, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_map_empty_yields_defaults() {
        let config = DetectionConfig::from_map(&Map::new()).unwrap();
        assert_eq!(config, DetectionConfig::default());
    }

    #[test]
    fn test_from_map_all_fields() {
        let config = DetectionConfig::from_map(&map(json!({
            "sampleStride": 3,
            "blinkThreshold": 0.3,
            "captureOnBlink": true,
            "cropToFace": true,
            "imageQuality": 0.7,
            "maxImageWidth": 480,
        })))
        .unwrap();
        assert_eq!(config.sample_stride, 3);
        assert_relative_eq!(config.blink_threshold, 0.3);
        assert!(config.capture_on_blink);
        assert!(config.crop_to_face);
        assert_relative_eq!(config.image_quality, 0.7);
        assert_eq!(config.max_image_width, Some(480));
    }

    #[test]
    fn test_from_map_ignores_unknown_keys() {
        let config = DetectionConfig::from_map(&map(json!({
            "blinkThreshold": 0.4,
            "enableLaserEyes": true,
        })))
        .unwrap();
        assert_relative_eq!(config.blink_threshold, 0.4);
    }

    #[test]
    fn test_from_map_wrong_typed_value_falls_back_to_default() {
        let config = DetectionConfig::from_map(&map(json!({
            "blinkThreshold": "0.4",
            "captureOnBlink": 1,
        })))
        .unwrap();
        assert_relative_eq!(config.blink_threshold, 0.5);
        assert!(!config.capture_on_blink);
    }

    #[rstest]
    #[case::threshold_zero(json!({"blinkThreshold": 0.0}))]
    #[case::threshold_one(json!({"blinkThreshold": 1.0}))]
    #[case::threshold_above_one(json!({"blinkThreshold": 1.5}))]
    #[case::threshold_negative(json!({"blinkThreshold": -0.1}))]
    #[case::stride_zero(json!({"sampleStride": 0}))]
    #[case::quality_zero(json!({"imageQuality": 0.0}))]
    #[case::quality_above_one(json!({"imageQuality": 1.1}))]
    #[case::width_zero(json!({"maxImageWidth": 0}))]
    fn test_from_map_rejects_out_of_domain(#[case] value: Value) {
        assert!(DetectionConfig::from_map(&map(value)).is_err());
    }

    #[test]
    fn test_serde_round_trip_uses_camel_case_keys() {
        let config = DetectionConfig {
            sample_stride: 2,
            max_image_width: Some(640),
            ..DetectionConfig::default()
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["sampleStride"], 2);
        assert_eq!(value["maxImageWidth"], 640);
        let back: DetectionConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_deserialize_missing_fields_take_defaults() {
        let config: DetectionConfig = serde_json::from_value(json!({
            "blinkThreshold": 0.6,
        }))
        .unwrap();
        assert_relative_eq!(config.blink_threshold, 0.6);
        assert_eq!(config.sample_stride, 1);
    }
}
