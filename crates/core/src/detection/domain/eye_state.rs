//! Hysteresis state kept between frames for each tracked face.
//!
//! The capture handle type is a generic parameter `C`: the tracker parks and
//! returns handles but never looks inside them. The pipeline resolves `C` to
//! [`crate::shared::captured_frame::CapturedFrame`]; tests use plain strings.

/// Open/closed hysteresis for one eye of one tracked face.
#[derive(Clone, Debug, PartialEq)]
pub struct EyeState<C> {
    /// Classification at the previous observed sample.
    pub was_open: bool,
    /// Classification at the current sample.
    pub is_open: bool,
    /// Confirmed blinks for this eye since the face appeared.
    pub blink_count: u32,
    /// Still captured while the eye was closed, held until the blink is
    /// confirmed by a reopening edge or the entry is evicted.
    pub pending_captured_frame: Option<C>,
}

impl<C> EyeState<C> {
    /// Seeds hysteresis from the first observation: no prior sample exists,
    /// so both classifications start equal and no edge can fire.
    pub fn first_observation(is_open: bool) -> Self {
        Self {
            was_open: is_open,
            is_open,
            blink_count: 0,
            pending_captured_frame: None,
        }
    }

    /// `true` when the current sample completed a closed-to-open transition.
    pub fn reopened(&self) -> bool {
        !self.was_open && self.is_open
    }
}

/// Per-face pair of eye states, keyed by the detector's tracking id.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceEyeState<C> {
    pub left_eye: EyeState<C>,
    pub right_eye: EyeState<C>,
}

impl<C> FaceEyeState<C> {
    pub fn first_observation(left_open: bool, right_open: bool) -> Self {
        Self {
            left_eye: EyeState::first_observation(left_open),
            right_eye: EyeState::first_observation(right_open),
        }
    }
}

/// A confirmed blink: both eyes completed a closed-to-open transition in
/// the same update.
#[derive(Clone, Debug, PartialEq)]
pub struct BlinkEvent<C> {
    pub tracking_id: u32,
    pub left_eye: EyeState<C>,
    pub right_eye: EyeState<C>,
    /// Still associated with this blink, when one was captured during the
    /// closed phase. Left eye's capture wins if both eyes held one.
    pub capture: Option<C>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_observation_has_no_edge() {
        let open: EyeState<&str> = EyeState::first_observation(true);
        assert!(open.was_open && open.is_open);
        assert!(!open.reopened());
        assert_eq!(open.blink_count, 0);

        let closed: EyeState<&str> = EyeState::first_observation(false);
        assert!(!closed.was_open && !closed.is_open);
        assert!(!closed.reopened());
    }

    #[test]
    fn test_reopened_only_on_closed_to_open() {
        let mut eye: EyeState<&str> = EyeState::first_observation(false);
        eye.is_open = true;
        assert!(eye.reopened());

        eye.was_open = true;
        assert!(!eye.reopened());
    }
}
