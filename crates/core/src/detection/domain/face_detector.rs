use serde::{Deserialize, Serialize};

use crate::shared::frame::Frame;

/// Face bounding box in frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Head rotation in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// One eye landmark: position plus the classifier's openness score.
///
/// `open_probability` is `None` when the classifier could not score the eye
/// (e.g. profile view); blink tracking for that face is skipped that frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeObservation {
    pub x: f32,
    pub y: f32,
    pub open_probability: Option<f32>,
}

/// Everything the upstream detector reports for one face in one frame.
///
/// `tracking_id` is assigned and owned by the detector; it is opaque here
/// and stable for as long as the face stays visible. Faces without an id
/// still appear on the geometry channel but cannot accumulate blink state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceObservation {
    pub tracking_id: Option<u32>,
    pub bounds: FaceBounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_pose: Option<HeadPose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_eye: Option<EyeObservation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_eye: Option<EyeObservation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smiling_probability: Option<f32>,
}

impl FaceObservation {
    /// Both eye open-probabilities, when the detector scored both eyes.
    pub fn eye_probabilities(&self) -> Option<(f32, f32)> {
        let left = self.left_eye.as_ref()?.open_probability?;
        let right = self.right_eye.as_ref()?.open_probability?;
        Some((left, right))
    }
}

/// Domain interface for the external face/eye detector.
///
/// Implementations may be stateful (e.g. tracking across frames),
/// hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceObservation>, Box<dyn std::error::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn observation() -> FaceObservation {
        FaceObservation {
            tracking_id: Some(7),
            bounds: FaceBounds {
                x: 10,
                y: 20,
                width: 100,
                height: 120,
            },
            head_pose: None,
            left_eye: Some(EyeObservation {
                x: 40.0,
                y: 60.0,
                open_probability: Some(0.9),
            }),
            right_eye: Some(EyeObservation {
                x: 80.0,
                y: 60.0,
                open_probability: Some(0.8),
            }),
            smiling_probability: None,
        }
    }

    #[test]
    fn test_eye_probabilities_both_scored() {
        let (left, right) = observation().eye_probabilities().unwrap();
        assert_relative_eq!(left, 0.9);
        assert_relative_eq!(right, 0.8);
    }

    #[test]
    fn test_eye_probabilities_missing_eye() {
        let mut obs = observation();
        obs.right_eye = None;
        assert!(obs.eye_probabilities().is_none());
    }

    #[test]
    fn test_eye_probabilities_unscored_eye() {
        let mut obs = observation();
        obs.left_eye.as_mut().unwrap().open_probability = None;
        assert!(obs.eye_probabilities().is_none());
    }

    #[test]
    fn test_deserialize_minimal_observation() {
        let obs: FaceObservation = serde_json::from_str(
            r#"{"trackingId": 3, "bounds": {"x": 0, "y": 0, "width": 50, "height": 50}}"#,
        )
        .unwrap();
        assert_eq!(obs.tracking_id, Some(3));
        assert!(obs.left_eye.is_none());
        assert!(obs.head_pose.is_none());
    }

    #[test]
    fn test_serialize_uses_camel_case_and_omits_absent_fields() {
        let mut obs = observation();
        obs.smiling_probability = None;
        let value = serde_json::to_value(&obs).unwrap();
        assert_eq!(value["trackingId"], 7);
        assert_eq!(value["leftEye"]["openProbability"], 0.9);
        assert!(value.get("smilingProbability").is_none());
    }
}
