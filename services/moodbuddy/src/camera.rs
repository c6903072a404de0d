use moodbuddy_core::classifier::Frame;

/// Source of the current camera frame. Frame acquisition hardware is outside
/// the core's scope; the runtime asks this for the latest frame on each
/// sample tick and passes it through to the sampler.
pub trait FrameSource: Send + Sync {
    /// The most recent frame, or `None` if capture has not produced one yet.
    fn current_frame(&self) -> Option<Frame>;
}

/// A fixed test-pattern source standing in for real capture hardware. The
/// stub classifier never inspects pixel data, so a flat gray frame is enough
/// to drive the sampling loop end to end.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        // Matches the small preview-widget size of the UI this stands in for.
        Self {
            width: 200,
            height: 160,
        }
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for SyntheticCamera {
    fn current_frame(&self) -> Option<Frame> {
        Some(Frame {
            width: self.width,
            height: self.height,
            data: vec![0x80; (self.width * self.height) as usize],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_camera_always_has_a_frame() {
        let camera = SyntheticCamera::new();
        let frame = camera.current_frame().unwrap();
        assert_eq!(frame.width, 200);
        assert_eq!(frame.height, 160);
        assert_eq!(frame.data.len(), 200 * 160);
    }
}
