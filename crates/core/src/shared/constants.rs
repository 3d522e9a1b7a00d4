/// Default open-probability cutoff: `prob >= threshold` classifies an eye
/// as open.
pub const DEFAULT_BLINK_THRESHOLD: f32 = 0.5;

/// Padding added around face bounds when cropping a capture, as a fraction
/// of the shorter side of the box.
pub const FACE_CROP_PADDING: f64 = 0.2;

/// Frames are RGB; format conversion happens before they reach this crate.
pub const RGB_CHANNELS: u8 = 3;
