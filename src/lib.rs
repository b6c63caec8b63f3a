//! FormCoach: a pose-driven squat coach.
//!
//! Frames flow from a [`capture::FrameSource`] through a black-box
//! [`pose::PoseEstimator`], the knee angle drives the rep counter and
//! form scoring in [`analysis`], and [`annotate`] burns the skeleton and
//! session HUD into each frame. [`session::SessionController`] runs the
//! loop; saving appends to the CSV workout history.

pub mod analysis;
pub mod annotate;
pub mod audio;
pub mod capture;
pub mod history;
pub mod pose;
pub mod session;
pub mod settings;
pub mod utils;
pub mod voice;

pub use analysis::{SessionSnapshot, SessionTracker};
pub use session::{ActivityMode, SessionController};
