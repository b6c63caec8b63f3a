//! Squat analysis: joint angle, rep state machine, session accumulator.

pub mod angle;
pub mod counter;
pub mod session;

pub use angle::{joint_angle, NEUTRAL_ANGLE};
pub use counter::{RepCounter, RepEvent, RepThresholds, Stage};
pub use session::{SessionSnapshot, SessionTracker};
