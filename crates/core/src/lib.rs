//! Blink detection over streaming per-face eye-openness measurements.
//!
//! An upstream detector supplies, per processed frame and per visible face,
//! a stable tracking id and one open-probability per eye. The core turns
//! those noisy frame-level signals into debounced blink events, optionally
//! pairing each confirmed blink with a still image captured while the eyes
//! were closed.

pub mod capture;
pub mod detection;
pub mod pipeline;
pub mod shared;
