use std::sync::Arc;

/// Opaque handle to a captured still image.
///
/// The blink tracker holds these between a closing edge and the blink that
/// confirms it, but never inspects the payload. Cloning is cheap; the pixel
/// data is shared, so a handle parked in the tracker does not duplicate the
/// image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedFrame {
    data: Arc<Vec<u8>>,
    width: u32,
    height: u32,
}

impl CapturedFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data: Arc::new(data),
            width,
            height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_payload() {
        let capture = CapturedFrame::new(vec![1, 2, 3], 1, 1);
        let clone = capture.clone();
        assert_eq!(capture, clone);
        assert!(std::ptr::eq(capture.data().as_ptr(), clone.data().as_ptr()));
    }
}
