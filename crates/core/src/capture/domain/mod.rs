pub mod frame_capturer;
