use std::io::BufRead;

use serde::Deserialize;

use crate::detection::domain::face_detector::{FaceDetector, FaceObservation};
use crate::shared::frame::Frame;

/// One line of a recorded observation trace.
#[derive(Debug, Deserialize)]
struct TraceRecord {
    #[serde(default)]
    faces: Vec<FaceObservation>,
}

/// Replays pre-recorded detector output by frame index.
///
/// Stands in for the live ML detector when replaying a captured session:
/// frame N always yields the observations recorded for frame N, so blink
/// sequences are reproducible. Frames past the end of the trace yield no
/// faces.
pub struct ScriptedDetector {
    frames: Vec<Vec<FaceObservation>>,
}

impl ScriptedDetector {
    pub fn new(frames: Vec<Vec<FaceObservation>>) -> Self {
        Self { frames }
    }

    /// Parses a JSONL trace: one `{"faces": [...]}` object per line.
    /// Blank lines are skipped.
    pub fn from_jsonl(reader: impl BufRead) -> Result<Self, Box<dyn std::error::Error>> {
        let mut frames = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: TraceRecord = serde_json::from_str(&line)?;
            frames.push(record.faces);
        }
        Ok(Self::new(frames))
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl FaceDetector for ScriptedDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<FaceObservation>, Box<dyn std::error::Error>> {
        Ok(self.frames.get(frame.index()).cloned().unwrap_or_default())
    }
}
