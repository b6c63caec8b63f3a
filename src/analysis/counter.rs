//! Two-state squat rep counter over a stream of knee angles.
//!
//! Thresholds are calibration values, not derived: 90° marks squat depth,
//! 160° marks standing. A rep is counted on the Down -> Up transition.
//! Rapid oscillation right at a threshold can over- or under-count; that is
//! a known limitation of the two-threshold design.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Up,
    Down,
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Up
    }
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Up => "UP",
            Stage::Down => "DOWN",
        }
    }
}

/// Calibrated angle thresholds for squat detection, in degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepThresholds {
    /// At or below this, the knee is at squat depth.
    pub deep_angle: f32,
    /// At or above this, the lifter is standing.
    pub standing_angle: f32,
    /// Bottoming out above this while Down draws a "squat deeper" warning.
    pub shallow_angle: f32,
    /// Above this while Down, prompt the lifter to push up.
    pub rise_prompt_angle: f32,
}

impl Default for RepThresholds {
    fn default() -> Self {
        Self {
            deep_angle: 90.0,
            standing_angle: 160.0,
            shallow_angle: 140.0,
            rise_prompt_angle: 120.0,
        }
    }
}

/// Shown by shells while the feedback slot is still empty.
pub const READY_FEEDBACK: &str = "Ready to start!";

/// What a single angle observation did to the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepEvent {
    None,
    /// Reached squat depth (Up -> Down).
    ReachedDepth,
    /// Completed a rep (Down -> Up); the counter was incremented.
    Completed,
}

#[derive(Debug, Clone)]
pub struct RepCounter {
    thresholds: RepThresholds,
    stage: Stage,
    count: u32,
    feedback: String,
}

pub const COMPLETED_FEEDBACK: &str = "Great squat!";
pub const DEPTH_FEEDBACK: &str = "Perfect depth! Now stand up!";
pub const DESCEND_FEEDBACK: &str = "Keep going down!";
pub const RISE_FEEDBACK: &str = "Push up!";
pub const SHALLOW_FEEDBACK: &str = "Squat deeper for better results!";

impl RepCounter {
    pub fn new(thresholds: RepThresholds) -> Self {
        Self {
            thresholds,
            stage: Stage::Up,
            count: 0,
            feedback: String::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    pub fn thresholds(&self) -> RepThresholds {
        self.thresholds
    }

    /// Feed one angle observation; transitions the stage, counts completed
    /// reps, and refreshes the coaching message for this frame.
    ///
    /// Boundary angles land on the counting side: exactly `deep_angle`
    /// reaches depth, exactly `standing_angle` completes the rep.
    pub fn observe(&mut self, angle: f32) -> RepEvent {
        let t = self.thresholds;
        let mut event = RepEvent::None;

        if angle >= t.standing_angle {
            if self.stage == Stage::Down {
                self.count += 1;
                self.feedback = COMPLETED_FEEDBACK.to_string();
                event = RepEvent::Completed;
            }
            self.stage = Stage::Up;
        } else if angle <= t.deep_angle {
            if self.stage == Stage::Up {
                self.feedback = DEPTH_FEEDBACK.to_string();
                event = RepEvent::ReachedDepth;
            }
            self.stage = Stage::Down;
        } else {
            // Transition band: coach toward the next threshold.
            if self.stage == Stage::Up && angle < t.shallow_angle {
                self.feedback = DESCEND_FEEDBACK.to_string();
            } else if self.stage == Stage::Down && angle > t.rise_prompt_angle {
                self.feedback = RISE_FEEDBACK.to_string();
            }
        }

        // Hovering shallow while Down means the descent stalled early.
        if self.stage == Stage::Down && angle > t.shallow_angle {
            self.feedback = SHALLOW_FEEDBACK.to_string();
        }

        event
    }

    pub fn reset(&mut self) {
        self.stage = Stage::Up;
        self.count = 0;
        self.feedback.clear();
    }
}

impl Default for RepCounter {
    fn default() -> Self {
        Self::new(RepThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(counter: &mut RepCounter, angles: &[f32]) {
        for &angle in angles {
            counter.observe(angle);
        }
    }

    #[test]
    fn full_squat_counts_one_rep() {
        let mut counter = RepCounter::default();
        feed(&mut counter, &[170.0, 85.0, 165.0]);
        assert_eq!(counter.count(), 1);
        assert_eq!(counter.stage(), Stage::Up);
    }

    #[test]
    fn shallow_dip_counts_nothing() {
        let mut counter = RepCounter::default();
        feed(&mut counter, &[170.0, 95.0, 170.0]);
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.stage(), Stage::Up);
    }

    #[test]
    fn oscillation_near_threshold_regression() {
        // 89 crosses depth, 91/89 stay below standing, 161 completes: one rep.
        let mut counter = RepCounter::default();
        feed(&mut counter, &[170.0, 89.0, 91.0, 89.0, 161.0]);
        assert_eq!(counter.count(), 1);
    }

    #[test]
    fn boundary_angles_count_inclusively() {
        let mut counter = RepCounter::default();
        counter.observe(90.0);
        assert_eq!(counter.stage(), Stage::Down);
        counter.observe(160.0);
        assert_eq!(counter.count(), 1);
        assert_eq!(counter.stage(), Stage::Up);
    }

    #[test]
    fn feedback_tracks_movement_phase() {
        let mut counter = RepCounter::default();
        counter.observe(130.0);
        assert_eq!(counter.feedback(), DESCEND_FEEDBACK);
        counter.observe(85.0);
        assert_eq!(counter.feedback(), DEPTH_FEEDBACK);
        counter.observe(125.0);
        assert_eq!(counter.feedback(), RISE_FEEDBACK);
        counter.observe(150.0);
        assert_eq!(counter.feedback(), SHALLOW_FEEDBACK);
        counter.observe(165.0);
        assert_eq!(counter.feedback(), COMPLETED_FEEDBACK);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut counter = RepCounter::default();
        feed(&mut counter, &[170.0, 85.0, 165.0, 80.0]);
        counter.reset();
        assert_eq!(counter.count(), 0);
        assert_eq!(counter.stage(), Stage::Up);
        assert_eq!(counter.feedback(), "");
    }
}
