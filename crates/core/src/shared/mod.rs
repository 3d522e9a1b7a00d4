pub mod captured_frame;
pub mod config;
pub mod constants;
pub mod frame;
