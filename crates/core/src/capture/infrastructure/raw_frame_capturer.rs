use crate::capture::domain::frame_capturer::{CaptureOptions, FrameCapturer};
use crate::detection::domain::face_detector::FaceBounds;
use crate::shared::captured_frame::CapturedFrame;
use crate::shared::constants::FACE_CROP_PADDING;
use crate::shared::frame::Frame;

/// Capturer that copies raw RGB out of the frame, without encoding.
///
/// Cropping adds padding around the face bounds for context, clamped to
/// the frame; widths above `max_image_width` are reduced by
/// nearest-neighbor sampling. `image_quality` is an encoder hint and is
/// ignored here; embedders wanting JPEG/PNG output supply their own
/// [`FrameCapturer`].
pub struct RawFrameCapturer;

impl RawFrameCapturer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RawFrameCapturer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameCapturer for RawFrameCapturer {
    fn capture(
        &mut self,
        frame: &Frame,
        face_bounds: Option<&FaceBounds>,
        options: &CaptureOptions,
    ) -> Result<CapturedFrame, Box<dyn std::error::Error>> {
        let (x0, y0, x1, y1) = match face_bounds {
            Some(bounds) if options.crop_to_face => crop_rect(frame, bounds),
            _ => (0, 0, frame.width() as usize, frame.height() as usize),
        };

        let crop_w = x1 - x0;
        let crop_h = y1 - y0;
        let (out_w, out_h) = match options.max_image_width {
            Some(max_w) if crop_w > max_w as usize => {
                let scaled_h = (crop_h * max_w as usize + crop_w / 2) / crop_w;
                (max_w as usize, scaled_h.max(1))
            }
            _ => (crop_w, crop_h),
        };

        let arr = frame.as_ndarray();
        let channels = frame.channels() as usize;
        let mut data = Vec::with_capacity(out_w * out_h * channels);
        for row in 0..out_h {
            let src_row = y0 + row * crop_h / out_h;
            for col in 0..out_w {
                let src_col = x0 + col * crop_w / out_w;
                for c in 0..channels {
                    data.push(arr[[src_row, src_col, c]]);
                }
            }
        }

        Ok(CapturedFrame::new(data, out_w as u32, out_h as u32))
    }
}

/// Face bounds expanded by [`FACE_CROP_PADDING`] of the shorter side,
/// clamped to the frame. A degenerate intersection (face reported fully
/// outside the frame) falls back to the whole frame.
fn crop_rect(frame: &Frame, bounds: &FaceBounds) -> (usize, usize, usize, usize) {
    let frame_w = frame.width() as i64;
    let frame_h = frame.height() as i64;
    let padding = (f64::from(bounds.width.min(bounds.height)) * FACE_CROP_PADDING) as i64;

    let x0 = (i64::from(bounds.x) - padding).max(0);
    let y0 = (i64::from(bounds.y) - padding).max(0);
    let x1 = (i64::from(bounds.x) + i64::from(bounds.width) + padding).min(frame_w);
    let y1 = (i64::from(bounds.y) + i64::from(bounds.height) + padding).min(frame_h);

    if x1 <= x0 || y1 <= y0 {
        log::warn!(
            "face bounds {bounds:?} outside {frame_w}x{frame_h} frame, capturing full frame"
        );
        return (0, 0, frame_w as usize, frame_h as usize);
    }
    (x0 as usize, y0 as usize, x1 as usize, y1 as usize)
}
