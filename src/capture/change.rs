//! Frame-change gating via perceptual hashing.
//!
//! Pose inference is the expensive step, so frames that look like the
//! previous processed frame are skipped and the previous outcome reused.

use image::RgbImage;
use image_hasher::{HashAlg, Hasher, HasherConfig, ImageHash};

pub struct FrameChangeGate {
    hasher: Hasher,
    last_hash: Option<ImageHash>,
    /// Hamming distance below which the frame counts as unchanged.
    /// 0 disables gating entirely.
    threshold: u32,
}

impl FrameChangeGate {
    pub fn new(threshold: u32) -> Self {
        let hasher = HasherConfig::new()
            .hash_alg(HashAlg::DoubleGradient)
            .hash_size(8, 8)
            .to_hasher();
        Self {
            hasher,
            last_hash: None,
            threshold,
        }
    }

    /// True when `frame` differs enough from the last accepted frame to be
    /// worth running inference on. Accepted frames become the new baseline.
    pub fn accept(&mut self, frame: &RgbImage) -> bool {
        if self.threshold == 0 {
            return true;
        }

        let hash = self.hasher.hash_image(frame);
        let changed = match &self.last_hash {
            Some(last) => last.dist(&hash) >= self.threshold,
            None => true,
        };
        if changed {
            self.last_hash = Some(hash);
        }
        changed
    }

    pub fn reset(&mut self) {
        self.last_hash = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn flat_frame(shade: u8) -> RgbImage {
        RgbImage::from_pixel(64, 64, Rgb([shade, shade, shade]))
    }

    fn horizontal_gradient() -> RgbImage {
        RgbImage::from_fn(64, 64, |x, _| {
            let shade = (x * 4) as u8;
            Rgb([shade, shade, shade])
        })
    }

    fn vertical_gradient() -> RgbImage {
        RgbImage::from_fn(64, 64, |_, y| {
            let shade = (y * 4) as u8;
            Rgb([shade, shade, shade])
        })
    }

    #[test]
    fn first_frame_is_always_accepted() {
        let mut gate = FrameChangeGate::new(4);
        assert!(gate.accept(&flat_frame(50)));
    }

    #[test]
    fn identical_frame_is_rejected() {
        let mut gate = FrameChangeGate::new(1);
        assert!(gate.accept(&horizontal_gradient()));
        assert!(!gate.accept(&horizontal_gradient()));
    }

    #[test]
    fn different_frame_is_accepted() {
        let mut gate = FrameChangeGate::new(1);
        assert!(gate.accept(&horizontal_gradient()));
        assert!(gate.accept(&vertical_gradient()));
    }

    #[test]
    fn zero_threshold_disables_gating() {
        let mut gate = FrameChangeGate::new(0);
        assert!(gate.accept(&flat_frame(10)));
        assert!(gate.accept(&flat_frame(10)));
    }

    #[test]
    fn reset_clears_the_baseline() {
        let mut gate = FrameChangeGate::new(1);
        assert!(gate.accept(&horizontal_gradient()));
        gate.reset();
        assert!(gate.accept(&horizontal_gradient()));
    }
}
