use serde::Serialize;

use crate::detection::domain::eye_state::BlinkEvent;
use crate::detection::domain::face_detector::FaceObservation;
use crate::shared::captured_frame::CapturedFrame;

/// Per-frame payload for the face-geometry channel: raw detector output
/// plus frame context, published regardless of any blink activity.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceFrameEvent {
    pub faces: Vec<FaceObservation>,
    pub frame_width: u32,
    pub frame_height: u32,
    pub timestamp_ns: i64,
}

/// Wire form of a confirmed blink for the blink-event channel.
///
/// The capture handle is excluded from serialization; transport encoding
/// of image payloads is the embedder's concern.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlinkNotification {
    pub tracking_id: u32,
    pub left_blink_count: u32,
    pub right_blink_count: u32,
    pub timestamp_ns: i64,
    #[serde(skip)]
    pub capture: Option<CapturedFrame>,
}

impl BlinkNotification {
    pub fn from_event(event: BlinkEvent<CapturedFrame>, timestamp_ns: i64) -> Self {
        Self {
            tracking_id: event.tracking_id,
            left_blink_count: event.left_eye.blink_count,
            right_blink_count: event.right_eye.blink_count,
            timestamp_ns,
            capture: event.capture,
        }
    }
}
