pub mod raw_frame_capturer;
