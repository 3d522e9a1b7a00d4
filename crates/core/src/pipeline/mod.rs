pub mod events;
pub mod frame_processor;
