//! Included-angle calculation from three 2D points.
//!
//! cos(θ) = (BA · BC) / (|BA| × |BC|), reported in degrees. Used on
//! hip/knee/ankle triples to measure knee flexion: ~180° standing,
//! ~90° at squat depth.

/// Returned when a vector is degenerate (an undetected landmark collapses
/// two points onto each other). Reads as a straight joint.
pub const NEUTRAL_ANGLE: f32 = 180.0;

const EPSILON: f32 = 1e-4;

/// Angle at `b` formed by `a` and `c`, in degrees, clamped to [0, 180].
pub fn joint_angle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
    let ba = (a.0 - b.0, a.1 - b.1);
    let bc = (c.0 - b.0, c.1 - b.1);

    let mag_ba = (ba.0 * ba.0 + ba.1 * ba.1).sqrt();
    let mag_bc = (bc.0 * bc.0 + bc.1 * bc.1).sqrt();
    if mag_ba < EPSILON || mag_bc < EPSILON {
        return NEUTRAL_ANGLE;
    }

    let dot = ba.0 * bc.0 + ba.1 * bc.1;
    let cos_angle = (dot / (mag_ba * mag_bc)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collinear_points_read_straight() {
        let angle = joint_angle((0.0, 0.0), (0.5, 0.0), (1.0, 0.0));
        assert!((angle - 180.0).abs() < 0.5);
    }

    #[test]
    fn right_angle() {
        let angle = joint_angle((0.0, 0.0), (0.5, 0.0), (0.5, 0.5));
        assert!((angle - 90.0).abs() < 0.5);
    }

    #[test]
    fn folded_joint_reads_near_zero() {
        let angle = joint_angle((1.0, 0.0), (0.0, 0.0), (1.0, 0.01));
        assert!(angle < 5.0);
    }

    #[test]
    fn degenerate_points_return_sentinel() {
        assert_eq!(joint_angle((0.3, 0.3), (0.3, 0.3), (1.0, 1.0)), NEUTRAL_ANGLE);
        assert_eq!(joint_angle((0.0, 0.0), (1.0, 1.0), (1.0, 1.0)), NEUTRAL_ANGLE);
    }

    #[test]
    fn always_within_bounds() {
        let points = [
            (0.0, 0.0),
            (0.2, 0.9),
            (0.9, 0.1),
            (0.5, 0.5),
            (1.0, 1.0),
            (0.7, 0.3),
        ];
        for &a in &points {
            for &b in &points {
                for &c in &points {
                    let angle = joint_angle(a, b, c);
                    assert!((0.0..=180.0).contains(&angle), "angle {angle} out of range");
                }
            }
        }
    }
}
