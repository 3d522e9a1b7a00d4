pub mod blink_tracker;
pub mod eye_state;
pub mod face_detector;
