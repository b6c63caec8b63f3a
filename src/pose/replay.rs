//! Replay estimator: landmark frames loaded from a JSON file.
//!
//! Lets the whole pipeline run offline (and under test) without a live
//! pose model. The file is an array of entries, one per frame; `null`
//! marks a frame with no detection.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::{PoseEstimator, PoseFrame, LANDMARK_COUNT};

#[derive(Debug, Serialize, Deserialize)]
struct ReplayFile {
    frames: Vec<Option<PoseFrame>>,
}

pub struct ReplayEstimator {
    frames: Vec<Option<PoseFrame>>,
    cursor: Mutex<usize>,
    /// Restart from the first frame after the last, instead of reporting
    /// no detection forever.
    looped: bool,
}

impl ReplayEstimator {
    pub fn from_file(path: &Path, looped: bool) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read replay file {}", path.display()))?;
        let parsed: ReplayFile = serde_json::from_str(&contents)
            .with_context(|| format!("invalid replay file {}", path.display()))?;
        Self::from_frames(parsed.frames, looped)
    }

    pub fn from_frames(frames: Vec<Option<PoseFrame>>, looped: bool) -> Result<Self> {
        if frames.is_empty() {
            bail!("replay contains no frames");
        }
        for (i, frame) in frames.iter().enumerate() {
            if let Some(pose) = frame {
                if pose.landmarks.len() != LANDMARK_COUNT {
                    bail!(
                        "replay frame {} has {} landmarks (expected {})",
                        i,
                        pose.landmarks.len(),
                        LANDMARK_COUNT
                    );
                }
            }
        }
        Ok(Self {
            frames,
            cursor: Mutex::new(0),
            looped,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl PoseEstimator for ReplayEstimator {
    fn detect(&self, _frame: &RgbImage) -> Result<Option<PoseFrame>> {
        let mut cursor = self.cursor.lock().unwrap_or_else(|e| e.into_inner());
        if *cursor >= self.frames.len() {
            if !self.looped {
                return Ok(None);
            }
            *cursor = 0;
        }
        let frame = self.frames[*cursor].clone();
        *cursor += 1;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Landmark;

    fn pose_with_all_landmarks() -> PoseFrame {
        PoseFrame {
            landmarks: vec![Landmark::default(); LANDMARK_COUNT],
        }
    }

    fn blank_frame() -> RgbImage {
        RgbImage::new(4, 4)
    }

    #[test]
    fn serves_frames_in_order_then_stops() {
        let estimator =
            ReplayEstimator::from_frames(vec![Some(pose_with_all_landmarks()), None], false)
                .unwrap();
        let frame = blank_frame();

        assert!(estimator.detect(&frame).unwrap().is_some());
        assert!(estimator.detect(&frame).unwrap().is_none());
        // Exhausted, non-looped: no detection from here on.
        assert!(estimator.detect(&frame).unwrap().is_none());
    }

    #[test]
    fn loops_when_configured() {
        let estimator =
            ReplayEstimator::from_frames(vec![Some(pose_with_all_landmarks())], true).unwrap();
        let frame = blank_frame();

        for _ in 0..5 {
            assert!(estimator.detect(&frame).unwrap().is_some());
        }
    }

    #[test]
    fn rejects_wrong_landmark_count() {
        let short = PoseFrame {
            landmarks: vec![Landmark::default(); 5],
        };
        assert!(ReplayEstimator::from_frames(vec![Some(short)], false).is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let original = ReplayFile {
            frames: vec![Some(pose_with_all_landmarks()), None],
        };
        let json = serde_json::to_string(&original).unwrap();
        let parsed: ReplayFile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.frames.len(), 2);
        assert!(parsed.frames[0].is_some());
        assert!(parsed.frames[1].is_none());
    }
}
