use std::collections::HashSet;
use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::capture::domain::frame_capturer::{CaptureOptions, FrameCapturer};
use crate::detection::domain::blink_tracker::EyeStateTracker;
use crate::detection::domain::face_detector::{FaceDetector, FaceObservation};
use crate::pipeline::events::{BlinkNotification, FaceFrameEvent};
use crate::shared::captured_frame::CapturedFrame;
use crate::shared::config::DetectionConfig;
use crate::shared::frame::Frame;

/// Orchestrates one detection session: decoded frames in, events out.
///
/// Per processed frame the processor runs the external detector, feeds
/// each observation into the blink tracker, evicts state for faces that
/// left the frame, and republishes results on two channels: raw face
/// geometry on every processed frame, blink notifications only when the
/// tracker confirms one. Frame throttling (`sample_stride`) lives here,
/// not in the tracker.
///
/// The tracker is shared through an `Arc` so a UI or maintenance thread
/// can query live eye state while frames are flowing.
pub struct FrameProcessor {
    detector: Box<dyn FaceDetector>,
    capturer: Option<Box<dyn FrameCapturer>>,
    tracker: Arc<EyeStateTracker<CapturedFrame>>,
    config: DetectionConfig,
    face_sink: Option<Sender<FaceFrameEvent>>,
    blink_sink: Option<Sender<BlinkNotification>>,
    frame_count: u64,
}

impl FrameProcessor {
    pub fn new(detector: Box<dyn FaceDetector>) -> Self {
        Self {
            detector,
            capturer: None,
            tracker: Arc::new(EyeStateTracker::new()),
            config: DetectionConfig::default(),
            face_sink: None,
            blink_sink: None,
            frame_count: 0,
        }
    }

    pub fn with_capturer(mut self, capturer: Box<dyn FrameCapturer>) -> Self {
        self.capturer = Some(capturer);
        self
    }

    /// Replaces the session configuration as a whole snapshot.
    ///
    /// Rejected configurations leave the previous one in effect; existing
    /// hysteresis is kept, since a settings change does not invalidate
    /// what was already observed.
    pub fn set_config(&mut self, config: DetectionConfig) -> Result<(), Box<dyn std::error::Error>> {
        config.validate()?;
        self.tracker.apply_config(&config)?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Shared handle to the blink tracker, e.g. for live eye-state overlays.
    pub fn tracker(&self) -> Arc<EyeStateTracker<CapturedFrame>> {
        Arc::clone(&self.tracker)
    }

    pub fn set_face_sink(&mut self, sink: Sender<FaceFrameEvent>) {
        self.face_sink = Some(sink);
    }

    pub fn set_blink_sink(&mut self, sink: Sender<BlinkNotification>) {
        self.blink_sink = Some(sink);
    }

    /// Feeds one decoded frame through the session.
    ///
    /// Returns `Ok(false)` when the frame was throttled away by
    /// `sample_stride`. Detector and tracker errors propagate; the caller
    /// decides whether to drop the frame's contribution or end the session.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<bool, Box<dyn std::error::Error>> {
        self.frame_count += 1;
        if self.frame_count % self.config.sample_stride as u64 != 0 {
            return Ok(false);
        }

        let faces = self.detector.detect(frame)?;
        let mut active_ids = HashSet::new();

        for face in &faces {
            let Some(tracking_id) = face.tracking_id else {
                continue;
            };
            active_ids.insert(tracking_id);

            let Some((left_prob, right_prob)) = face.eye_probabilities() else {
                continue;
            };

            let captured = self.capture_if_closing(frame, face, tracking_id, left_prob, right_prob);
            if let Some(event) = self
                .tracker
                .update(tracking_id, left_prob, right_prob, captured)?
            {
                log::debug!(
                    "blink confirmed for track {tracking_id} (L={} R={})",
                    event.left_eye.blink_count,
                    event.right_eye.blink_count
                );
                self.emit_blink(BlinkNotification::from_event(event, frame.timestamp_ns()));
            }
        }

        self.tracker.cleanup_stale_states(&active_ids);

        self.emit_faces(FaceFrameEvent {
            faces,
            frame_width: frame.width(),
            frame_height: frame.height(),
            timestamp_ns: frame.timestamp_ns(),
        });

        Ok(true)
    }

    /// Requests a still from the capture collaborator when an eye that the
    /// tracker last saw open is now observed below threshold. The capture
    /// has to happen on the closing edge: by the time the blink is
    /// confirmed, the closed-eye frame is gone.
    fn capture_if_closing(
        &mut self,
        frame: &Frame,
        face: &FaceObservation,
        tracking_id: u32,
        left_prob: f32,
        right_prob: f32,
    ) -> Option<CapturedFrame> {
        if !self.config.capture_on_blink {
            return None;
        }
        let capturer = self.capturer.as_mut()?;
        let state = self.tracker.face_state(tracking_id)?;

        let threshold = self.config.blink_threshold;
        let left_closing = left_prob < threshold && state.left_eye.is_open;
        let right_closing = right_prob < threshold && state.right_eye.is_open;
        if !(left_closing || right_closing) {
            return None;
        }

        let options = CaptureOptions::from(&self.config);
        match capturer.capture(frame, Some(&face.bounds), &options) {
            Ok(capture) => Some(capture),
            Err(e) => {
                // A failed capture costs the blink its still, nothing more.
                log::error!("frame capture failed for track {tracking_id}: {e}");
                None
            }
        }
    }

    fn emit_blink(&mut self, notification: BlinkNotification) {
        if let Some(sink) = &self.blink_sink {
            if sink.send(notification).is_err() {
                log::warn!("blink event sink disconnected, dropping sink");
                self.blink_sink = None;
            }
        }
    }

    fn emit_faces(&mut self, event: FaceFrameEvent) {
        if let Some(sink) = &self.face_sink {
            if sink.send(event).is_err() {
                log::warn!("face event sink disconnected, dropping sink");
                self.face_sink = None;
            }
        }
    }

    /// Ends the session: releases both sinks and clears all tracked state.
    /// Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.face_sink = None;
        self.blink_sink = None;
        self.tracker.reset();
    }
}
