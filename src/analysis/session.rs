//! Session accumulator: per-frame state driven by the rep counter, plus a
//! depth-based form accuracy score.
//!
//! Accuracy is the running mean of per-rep depth scores; a rep scores by
//! how close its deepest knee angle came to the ideal depth target.

use serde::{Deserialize, Serialize};

use super::counter::{RepCounter, RepEvent, RepThresholds, Stage};

/// Ideal deepest knee angle for a squat, in degrees.
pub const DEFAULT_IDEAL_DEPTH: f32 = 90.0;
/// Deviation from the ideal at which a rep scores zero.
pub const DEFAULT_DEPTH_TOLERANCE: f32 = 30.0;

/// Serializable view of the session for shells and the annotator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub rep_count: u32,
    pub stage: Stage,
    /// Last observed knee angle, degrees.
    pub angle: f32,
    /// Form accuracy, 0-100.
    pub accuracy: f32,
    pub feedback: String,
    pub frames_processed: u64,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            rep_count: 0,
            stage: Stage::Up,
            angle: crate::analysis::NEUTRAL_ANGLE,
            accuracy: 0.0,
            feedback: String::new(),
            frames_processed: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionTracker {
    counter: RepCounter,
    ideal_depth: f32,
    depth_tolerance: f32,
    /// Deepest angle seen since the current descent began.
    deepest_angle: Option<f32>,
    score_sum: f32,
    scored_reps: u32,
    last_angle: f32,
    frames_processed: u64,
}

impl SessionTracker {
    pub fn new(thresholds: RepThresholds, ideal_depth: f32, depth_tolerance: f32) -> Self {
        Self {
            counter: RepCounter::new(thresholds),
            ideal_depth,
            depth_tolerance,
            deepest_angle: None,
            score_sum: 0.0,
            scored_reps: 0,
            last_angle: crate::analysis::NEUTRAL_ANGLE,
            frames_processed: 0,
        }
    }

    /// Feed one knee-angle observation. Returns the rep event so callers
    /// can trigger side cues (chime) on completion.
    pub fn record_frame(&mut self, angle: f32) -> RepEvent {
        self.frames_processed += 1;
        self.last_angle = angle;

        // Track the bottom of the movement across the whole descent,
        // not just while the stage reads Down.
        if self.counter.stage() == Stage::Down || angle < self.counter.thresholds().standing_angle {
            self.deepest_angle = Some(match self.deepest_angle {
                Some(deepest) => deepest.min(angle),
                None => angle,
            });
        }

        let event = self.counter.observe(angle);
        if event == RepEvent::Completed {
            if let Some(deepest) = self.deepest_angle.take() {
                let score = self.score_depth(deepest);
                self.score_sum += score;
                self.scored_reps += 1;
            }
        }
        event
    }

    /// Depth score for one rep, 0-100: 100 at the ideal depth, falling
    /// linearly to 0 at `depth_tolerance` degrees away.
    fn score_depth(&self, deepest: f32) -> f32 {
        let deviation = (deepest - self.ideal_depth).abs();
        (1.0 - deviation / self.depth_tolerance).clamp(0.0, 1.0) * 100.0
    }

    pub fn accuracy(&self) -> f32 {
        if self.scored_reps == 0 {
            0.0
        } else {
            self.score_sum / self.scored_reps as f32
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            rep_count: self.counter.count(),
            stage: self.counter.stage(),
            angle: self.last_angle,
            accuracy: self.accuracy(),
            feedback: self.counter.feedback().to_string(),
            frames_processed: self.frames_processed,
        }
    }

    pub fn reset(&mut self) {
        self.counter.reset();
        self.deepest_angle = None;
        self.score_sum = 0.0;
        self.scored_reps = 0;
        self.last_angle = crate::analysis::NEUTRAL_ANGLE;
        self.frames_processed = 0;
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new(
            RepThresholds::default(),
            DEFAULT_IDEAL_DEPTH,
            DEFAULT_DEPTH_TOLERANCE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(tracker: &mut SessionTracker, angles: &[f32]) {
        for &angle in angles {
            tracker.record_frame(angle);
        }
    }

    #[test]
    fn counts_reps_through_the_tracker() {
        let mut tracker = SessionTracker::default();
        feed(&mut tracker, &[170.0, 85.0, 165.0]);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.rep_count, 1);
        assert_eq!(snapshot.stage, Stage::Up);
        assert_eq!(snapshot.frames_processed, 3);
    }

    #[test]
    fn perfect_depth_scores_full_accuracy() {
        let mut tracker = SessionTracker::default();
        feed(&mut tracker, &[170.0, 90.0, 165.0]);
        assert!((tracker.accuracy() - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn shallow_rep_scores_lower() {
        // Bottom right at the ideal depth scores full marks even when the
        // descent passed through shallower angles first.
        let mut tracker = SessionTracker::default();
        feed(&mut tracker, &[170.0, 105.0, 90.0, 165.0]);
        assert_eq!(tracker.snapshot().rep_count, 1);
        assert!((tracker.accuracy() - 100.0).abs() < f32::EPSILON);

        let mut shallow = SessionTracker::default();
        // Bottom at 75: 15 degrees past ideal, tolerance 30 -> 50.
        feed(&mut shallow, &[170.0, 75.0, 165.0]);
        assert!((shallow.accuracy() - 50.0).abs() < 0.01);
    }

    #[test]
    fn accuracy_averages_across_reps() {
        let mut tracker = SessionTracker::default();
        feed(&mut tracker, &[170.0, 90.0, 165.0]); // scores 100
        feed(&mut tracker, &[75.0, 165.0]); // scores 50
        assert!((tracker.accuracy() - 75.0).abs() < 0.01);
    }

    #[test]
    fn no_completed_rep_means_zero_accuracy() {
        let mut tracker = SessionTracker::default();
        feed(&mut tracker, &[170.0, 95.0, 170.0]);
        assert_eq!(tracker.snapshot().rep_count, 0);
        assert_eq!(tracker.accuracy(), 0.0);
    }

    #[test]
    fn reset_restores_initial_snapshot() {
        let mut tracker = SessionTracker::default();
        feed(&mut tracker, &[170.0, 85.0, 165.0, 80.0]);
        tracker.reset();
        assert_eq!(tracker.snapshot(), SessionSnapshot::default());
    }
}
