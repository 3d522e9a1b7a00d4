use crate::detection::domain::face_detector::FaceBounds;
use crate::shared::captured_frame::CapturedFrame;
use crate::shared::config::DetectionConfig;
use crate::shared::frame::Frame;

/// Post-processing hints forwarded to the capture implementation.
///
/// `image_quality` only applies to encoding implementations; raw capturers
/// ignore it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureOptions {
    pub crop_to_face: bool,
    pub image_quality: f32,
    pub max_image_width: Option<u32>,
}

impl From<&DetectionConfig> for CaptureOptions {
    fn from(config: &DetectionConfig) -> Self {
        Self {
            crop_to_face: config.crop_to_face,
            image_quality: config.image_quality,
            max_image_width: config.max_image_width,
        }
    }
}

/// Domain interface for the still-capture collaborator.
///
/// Invoked by the orchestrator when an eye starts closing so the resulting
/// handle can travel with the blink that confirms it. Implementations own
/// cropping, scaling, and encoding; the rest of the system treats the
/// result as opaque.
pub trait FrameCapturer: Send {
    fn capture(
        &mut self,
        frame: &Frame,
        face_bounds: Option<&FaceBounds>,
        options: &CaptureOptions,
    ) -> Result<CapturedFrame, Box<dyn std::error::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_derived_from_config() {
        let config = DetectionConfig {
            crop_to_face: true,
            image_quality: 0.7,
            max_image_width: Some(480),
            ..DetectionConfig::default()
        };
        let options = CaptureOptions::from(&config);
        assert!(options.crop_to_face);
        assert_eq!(options.max_image_width, Some(480));
    }
}
