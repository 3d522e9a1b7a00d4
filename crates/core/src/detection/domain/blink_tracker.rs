use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use thiserror::Error;

use crate::detection::domain::eye_state::{BlinkEvent, EyeState, FaceEyeState};
use crate::shared::config::DetectionConfig;
use crate::shared::constants::DEFAULT_BLINK_THRESHOLD;

#[derive(Error, Debug, PartialEq)]
pub enum TrackerError {
    /// Rejected at the setter; the previous configuration stays in effect.
    #[error("blink threshold must lie in (0.0, 1.0), got {threshold}")]
    InvalidConfiguration { threshold: f32 },
    /// Rejected before any state mutation; the face's entry is untouched.
    #[error("eye open probability must lie in [0.0, 1.0], got {value} for track {tracking_id}")]
    InvalidMeasurement { tracking_id: u32, value: f32 },
}

struct Inner<C> {
    states: HashMap<u32, FaceEyeState<C>>,
    threshold: f32,
    capture_on_blink: bool,
}

/// Per-face blink detection state machine.
///
/// Owns the tracking-id table and the blink-confirmation algorithm: each
/// eye carries open/closed hysteresis so a blink is the debounced
/// closed-to-open edge, not a per-frame reaction to noisy probabilities.
/// A [`BlinkEvent`] fires only when both eyes complete that edge in the
/// same update, which filters out single-eye winks.
///
/// `update` is expected from a single producer (the frame pipeline), while
/// `face_state` and `cleanup_stale_states` may come from a UI or
/// maintenance thread; one lock guards the whole table. Call volume is
/// bounded by video frame rate, so exclusivity beats granularity here.
pub struct EyeStateTracker<C> {
    inner: Mutex<Inner<C>>,
}

impl<C: Clone> Default for EyeStateTracker<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clone> EyeStateTracker<C> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                states: HashMap::new(),
                threshold: DEFAULT_BLINK_THRESHOLD,
                capture_on_blink: false,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<C>> {
        self.inner.lock().expect("eye state table lock poisoned")
    }

    /// Replaces the open-probability cutoff for all subsequent updates.
    ///
    /// Existing entries are not reclassified retroactively.
    pub fn set_threshold(&self, threshold: f32) -> Result<(), TrackerError> {
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(TrackerError::InvalidConfiguration { threshold });
        }
        self.lock().threshold = threshold;
        Ok(())
    }

    /// Installs the tracker-relevant knobs from a validated config snapshot.
    pub fn apply_config(&self, config: &DetectionConfig) -> Result<(), TrackerError> {
        self.set_threshold(config.blink_threshold)?;
        self.lock().capture_on_blink = config.capture_on_blink;
        Ok(())
    }

    /// Feeds one frame's eye-openness measurements for one face.
    ///
    /// Lazily creates the face's entry on first sight (seeding hysteresis
    /// with no edge), then advances both eyes independently. `captured` is
    /// parked on a closing edge and returned with the blink that confirms
    /// it. Returns a [`BlinkEvent`] only when both eyes reopen in this
    /// call; the common steady-state case returns `Ok(None)`.
    pub fn update(
        &self,
        tracking_id: u32,
        left_open_prob: f32,
        right_open_prob: f32,
        captured: Option<C>,
    ) -> Result<Option<BlinkEvent<C>>, TrackerError> {
        for value in [left_open_prob, right_open_prob] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TrackerError::InvalidMeasurement { tracking_id, value });
            }
        }

        let mut inner = self.lock();
        let left_now = left_open_prob >= inner.threshold;
        let right_now = right_open_prob >= inner.threshold;
        let capture_enabled = inner.capture_on_blink;

        let face = match inner.states.entry(tracking_id) {
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(FaceEyeState::first_observation(left_now, right_now));
                return Ok(None);
            }
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
        };

        let left_capture = step_eye(&mut face.left_eye, left_now, captured.as_ref(), capture_enabled);
        let right_capture = step_eye(
            &mut face.right_eye,
            right_now,
            captured.as_ref(),
            capture_enabled,
        );

        if face.left_eye.reopened() && face.right_eye.reopened() {
            Ok(Some(BlinkEvent {
                tracking_id,
                left_eye: face.left_eye.clone(),
                right_eye: face.right_eye.clone(),
                capture: left_capture.or(right_capture),
            }))
        } else {
            Ok(None)
        }
    }

    /// Read-only snapshot of one face's hysteresis; `None` for unknown ids.
    pub fn face_state(&self, tracking_id: u32) -> Option<FaceEyeState<C>> {
        self.lock().states.get(&tracking_id).cloned()
    }

    /// Drops every entry whose id is absent from the active set.
    ///
    /// This is the sole eviction path: detector ids are not guaranteed to
    /// be reused, so the table would otherwise grow for the whole session.
    /// Pending captures on evicted entries are discarded.
    pub fn cleanup_stale_states(&self, active_tracking_ids: &HashSet<u32>) {
        self.lock()
            .states
            .retain(|id, _| active_tracking_ids.contains(id));
    }

    /// Clears all per-face state. The table is swapped out whole, so a
    /// concurrent reader sees either the old table or an empty one.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.states = HashMap::new();
    }
}

/// Advances one eye's hysteresis by one sample.
///
/// Closing edge parks the frame captured this call (newest wins); reopening
/// edge counts the blink and takes the parked capture. Returns the taken
/// capture, which is `None` unless this sample reopened the eye.
fn step_eye<C: Clone>(
    eye: &mut EyeState<C>,
    now_open: bool,
    captured: Option<&C>,
    capture_enabled: bool,
) -> Option<C> {
    eye.was_open = eye.is_open;
    eye.is_open = now_open;

    if eye.was_open && !eye.is_open {
        if capture_enabled {
            if let Some(frame) = captured {
                eye.pending_captured_frame = Some(frame.clone());
            }
        }
        None
    } else if eye.reopened() {
        eye.blink_count += 1;
        eye.pending_captured_frame.take()
    } else {
        None
    }
}
