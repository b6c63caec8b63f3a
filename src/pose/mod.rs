//! Pose model boundary.
//!
//! The estimator itself is a black box behind [`PoseEstimator`]; this crate
//! only consumes its output: 33 normalized landmarks in the MediaPipe pose
//! layout, or nothing when no person is in frame.

pub mod replay;

use anyhow::Result;
use image::RgbImage;
use serde::{Deserialize, Serialize};

pub use replay::ReplayEstimator;

pub const LANDMARK_COUNT: usize = 33;

// Landmark indices (MediaPipe pose layout).
pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// Skeleton connections drawn by the annotator (pairs of landmark indices).
pub const SKELETON: [(usize, usize); 12] = [
    (LEFT_SHOULDER, RIGHT_SHOULDER),
    (LEFT_SHOULDER, LEFT_ELBOW),
    (LEFT_ELBOW, LEFT_WRIST),
    (RIGHT_SHOULDER, RIGHT_ELBOW),
    (RIGHT_ELBOW, RIGHT_WRIST),
    (LEFT_SHOULDER, LEFT_HIP),
    (RIGHT_SHOULDER, RIGHT_HIP),
    (LEFT_HIP, RIGHT_HIP),
    (LEFT_HIP, LEFT_KNEE),
    (LEFT_KNEE, LEFT_ANKLE),
    (RIGHT_HIP, RIGHT_KNEE),
    (RIGHT_KNEE, RIGHT_ANKLE),
];

/// A single detected body keypoint, normalized to the frame.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default = "default_visibility")]
    pub visibility: f32,
}

fn default_visibility() -> f32 {
    1.0
}

impl Landmark {
    pub fn point(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// One frame's worth of detected landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseFrame {
    pub landmarks: Vec<Landmark>,
}

impl PoseFrame {
    /// Landmark by index, `None` if the estimator returned fewer points.
    pub fn landmark(&self, index: usize) -> Option<Landmark> {
        self.landmarks.get(index).copied()
    }
}

/// Black-box pose estimator: a raster frame in, landmarks (or nothing) out.
///
/// `Ok(None)` means no person was detected this frame; that is an expected
/// per-frame condition, not an error.
pub trait PoseEstimator: Send + Sync {
    fn detect(&self, frame: &RgbImage) -> Result<Option<PoseFrame>>;
}
