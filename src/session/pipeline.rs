//! The per-frame processing pipeline, as an explicit function.
//!
//! State goes in and comes back out; any shell (CLI, UI, test) can drive
//! the loop by calling [`process_frame`] once per frame.

use anyhow::Result;
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::analysis::counter::RepEvent;
use crate::analysis::{angle, SessionSnapshot, SessionTracker};
use crate::annotate::FrameAnnotator;
use crate::pose::{
    PoseEstimator, PoseFrame, LEFT_ANKLE, LEFT_HIP, LEFT_KNEE, RIGHT_ANKLE, RIGHT_HIP, RIGHT_KNEE,
};

use super::ActivityMode;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DetectionStatus {
    PoseDetected,
    NoPerson,
}

/// Everything one frame produced.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub annotated: RgbImage,
    pub snapshot: SessionSnapshot,
    pub status: DetectionStatus,
    pub event: RepEvent,
}

/// Run one frame through detection, analysis, and annotation.
pub fn process_frame(
    estimator: &dyn PoseEstimator,
    annotator: &FrameAnnotator,
    tracker: &mut SessionTracker,
    mode: ActivityMode,
    frame: &RgbImage,
) -> Result<FrameOutcome> {
    let pose = estimator.detect(frame)?;
    Ok(apply_pose(pose, annotator, tracker, mode, frame))
}

/// Analysis and annotation for an already-detected pose. Split out so the
/// frame loop can run detection on the blocking pool first.
pub fn apply_pose(
    pose: Option<PoseFrame>,
    annotator: &FrameAnnotator,
    tracker: &mut SessionTracker,
    mode: ActivityMode,
    frame: &RgbImage,
) -> FrameOutcome {
    let Some(pose) = pose else {
        // No detection: pass the frame through and report status; the
        // session state is left exactly as it was.
        return FrameOutcome {
            annotated: annotator.annotate(frame, None, None),
            snapshot: tracker.snapshot(),
            status: DetectionStatus::NoPerson,
            event: RepEvent::None,
        };
    };

    let (event, snapshot, hud) = match mode {
        ActivityMode::SquatCounter => {
            let knee = knee_angle(&pose);
            let event = tracker.record_frame(knee);
            let snapshot = tracker.snapshot();
            (event, snapshot.clone(), Some(snapshot))
        }
        ActivityMode::FreePose => (RepEvent::None, tracker.snapshot(), None),
    };

    FrameOutcome {
        annotated: annotator.annotate(frame, Some(&pose), hud.as_ref()),
        snapshot,
        status: DetectionStatus::PoseDetected,
        event,
    }
}

/// Knee angle averaged over both legs; a leg with a missing landmark
/// contributes the neutral angle.
pub fn knee_angle(pose: &PoseFrame) -> f32 {
    let left = leg_angle(pose, LEFT_HIP, LEFT_KNEE, LEFT_ANKLE);
    let right = leg_angle(pose, RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE);
    (left + right) / 2.0
}

fn leg_angle(pose: &PoseFrame, hip: usize, knee: usize, ankle: usize) -> f32 {
    match (
        pose.landmark(hip),
        pose.landmark(knee),
        pose.landmark(ankle),
    ) {
        (Some(h), Some(k), Some(a)) => angle::joint_angle(h.point(), k.point(), a.point()),
        _ => angle::NEUTRAL_ANGLE,
    }
}

/// Build a pose whose knees both read `angle_deg`: hip directly above the
/// knee, ankle rotated `angle_deg` away from the hip direction.
#[cfg(test)]
pub(crate) fn pose_with_knee_angle(angle_deg: f32) -> PoseFrame {
    use crate::pose::{Landmark, LANDMARK_COUNT};

    let mut landmarks = vec![
        Landmark {
            x: 0.5,
            y: 0.5,
            z: 0.0,
            visibility: 1.0,
        };
        LANDMARK_COUNT
    ];

    for (hip, knee, ankle, x) in [
        (LEFT_HIP, LEFT_KNEE, LEFT_ANKLE, 0.45f32),
        (RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE, 0.55f32),
    ] {
        let knee_pos = (x, 0.6);
        let rad = angle_deg.to_radians();
        landmarks[hip] = Landmark {
            x,
            y: 0.4,
            z: 0.0,
            visibility: 1.0,
        };
        landmarks[knee] = Landmark {
            x: knee_pos.0,
            y: knee_pos.1,
            z: 0.0,
            visibility: 1.0,
        };
        landmarks[ankle] = Landmark {
            x: knee_pos.0 + 0.2 * rad.sin(),
            y: knee_pos.1 - 0.2 * rad.cos(),
            z: 0.0,
            visibility: 1.0,
        };
    }

    PoseFrame { landmarks }
}
