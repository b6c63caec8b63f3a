//! Frame annotator: skeleton overlay and burned-in session HUD.
//!
//! Landmarks arrive normalized; they are scaled to pixel coordinates here.
//! Low-visibility landmarks are neither dotted nor connected.

pub mod hud;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::analysis::SessionSnapshot;
use crate::pose::{PoseFrame, SKELETON};

const CONNECTION_COLOR: Rgb<u8> = Rgb([220, 40, 40]);
const LANDMARK_COLOR: Rgb<u8> = Rgb([40, 220, 40]);
const HUD_PRIMARY: Rgb<u8> = Rgb([40, 220, 40]);
const HUD_SECONDARY: Rgb<u8> = Rgb([240, 240, 240]);
const HUD_WARNING: Rgb<u8> = Rgb([240, 200, 40]);

#[derive(Debug, Clone)]
pub struct FrameAnnotator {
    /// Landmarks below this visibility are skipped.
    min_visibility: f32,
    landmark_radius: i32,
    hud_scale: u32,
}

impl FrameAnnotator {
    pub fn new(min_visibility: f32) -> Self {
        Self {
            min_visibility,
            landmark_radius: 3,
            hud_scale: 2,
        }
    }

    /// Return a copy of `frame` with the skeleton drawn over it and, when a
    /// snapshot is supplied, the session HUD burned in. With no pose the
    /// frame comes back untouched; the caller reports the no-person status.
    pub fn annotate(
        &self,
        frame: &RgbImage,
        pose: Option<&PoseFrame>,
        snapshot: Option<&SessionSnapshot>,
    ) -> RgbImage {
        let mut out = frame.clone();
        let Some(pose) = pose else {
            return out;
        };

        self.draw_skeleton(&mut out, pose);
        if let Some(snapshot) = snapshot {
            self.draw_hud(&mut out, snapshot);
        }
        out
    }

    fn draw_skeleton(&self, out: &mut RgbImage, pose: &PoseFrame) {
        let (w, h) = (out.width() as f32, out.height() as f32);

        for &(from, to) in SKELETON.iter() {
            let (Some(a), Some(b)) = (pose.landmark(from), pose.landmark(to)) else {
                continue;
            };
            if a.visibility < self.min_visibility || b.visibility < self.min_visibility {
                continue;
            }
            draw_line_segment_mut(
                out,
                (a.x * w, a.y * h),
                (b.x * w, b.y * h),
                CONNECTION_COLOR,
            );
        }

        for landmark in &pose.landmarks {
            if landmark.visibility < self.min_visibility {
                continue;
            }
            draw_filled_circle_mut(
                out,
                ((landmark.x * w) as i32, (landmark.y * h) as i32),
                self.landmark_radius,
                LANDMARK_COLOR,
            );
        }
    }

    fn draw_hud(&self, out: &mut RgbImage, snapshot: &SessionSnapshot) {
        let scale = self.hud_scale;
        let line_height = ((hud::GLYPH_HEIGHT + 3) * scale) as i32;
        let x = 8;
        let mut y = 8;

        hud::draw_text(
            out,
            x,
            y,
            scale,
            &format!("REPS: {}", snapshot.rep_count),
            HUD_PRIMARY,
        );
        y += line_height;
        hud::draw_text(
            out,
            x,
            y,
            scale,
            &format!("STAGE: {}", snapshot.stage.as_str()),
            HUD_SECONDARY,
        );
        y += line_height;
        hud::draw_text(
            out,
            x,
            y,
            scale,
            &format!("ANGLE: {:.1}", snapshot.angle),
            HUD_SECONDARY,
        );
        y += line_height;
        hud::draw_text(
            out,
            x,
            y,
            scale,
            &format!("FORM: {:.0}%", snapshot.accuracy),
            HUD_SECONDARY,
        );

        if !snapshot.feedback.is_empty() {
            y += line_height;
            hud::draw_text(out, x, y, scale, &snapshot.feedback, HUD_WARNING);
        }
    }
}

impl Default for FrameAnnotator {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Landmark, LANDMARK_COUNT};

    fn full_pose(visibility: f32) -> PoseFrame {
        let landmarks = (0..LANDMARK_COUNT)
            .map(|i| Landmark {
                x: 0.2 + 0.02 * (i as f32 % 5.0),
                y: 0.1 + 0.025 * i as f32,
                z: 0.0,
                visibility,
            })
            .collect();
        PoseFrame { landmarks }
    }

    #[test]
    fn no_detection_leaves_frame_untouched() {
        let annotator = FrameAnnotator::default();
        let frame = RgbImage::new(64, 64);
        let out = annotator.annotate(&frame, None, Some(&SessionSnapshot::default()));
        assert_eq!(out, frame);
    }

    #[test]
    fn visible_pose_changes_pixels() {
        let annotator = FrameAnnotator::default();
        let frame = RgbImage::new(128, 128);
        let out = annotator.annotate(&frame, Some(&full_pose(1.0)), None);
        assert_ne!(out, frame);
    }

    #[test]
    fn invisible_landmarks_are_skipped() {
        let annotator = FrameAnnotator::default();
        let frame = RgbImage::new(128, 128);
        let out = annotator.annotate(&frame, Some(&full_pose(0.1)), None);
        assert_eq!(out, frame);
    }

    #[test]
    fn hud_renders_with_snapshot() {
        let annotator = FrameAnnotator::default();
        let frame = RgbImage::new(256, 256);
        let snapshot = SessionSnapshot {
            rep_count: 12,
            accuracy: 87.0,
            feedback: "Push up!".to_string(),
            ..SessionSnapshot::default()
        };
        let with_hud = annotator.annotate(&frame, Some(&full_pose(1.0)), Some(&snapshot));
        let without_hud = annotator.annotate(&frame, Some(&full_pose(1.0)), None);
        assert_ne!(with_hud, without_hud);
    }
}
