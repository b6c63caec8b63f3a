//! Session orchestration: the per-frame pipeline and the controller that
//! drives it from a frame source.

pub mod controller;
pub mod loop_worker;
pub mod pipeline;

use serde::{Deserialize, Serialize};

pub use controller::{SessionController, SessionStatus};
pub use pipeline::{process_frame, DetectionStatus, FrameOutcome};

/// What the analyzer does with detected poses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ActivityMode {
    /// Skeleton overlay only, no exercise tracking.
    FreePose,
    /// Squat rep counting with form feedback.
    SquatCounter,
}

impl Default for ActivityMode {
    fn default() -> Self {
        ActivityMode::FreePose
    }
}

impl ActivityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityMode::FreePose => "Free Pose",
            ActivityMode::SquatCounter => "Squat Counter",
        }
    }
}
