//! User settings: a JSON file read into a shared store at startup,
//! persisted on every update.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::analysis::session::{DEFAULT_DEPTH_TOLERANCE, DEFAULT_IDEAL_DEPTH};
use crate::analysis::RepThresholds;
use crate::session::ActivityMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoachSettings {
    /// Where the frame source reads image frames from.
    pub frames_dir: PathBuf,
    pub loop_frames: bool,
    /// Landmark replay file for the built-in estimator.
    pub replay_path: PathBuf,
    pub frame_interval_ms: u64,
    /// A single frame taking longer than this is logged and skipped.
    pub frame_timeout_ms: u64,
    /// Perceptual-hash distance below which a frame is skipped; 0 disables.
    pub frame_change_threshold: u32,
    /// When set, annotated frames are written here as PNGs.
    pub annotated_dir: Option<PathBuf>,
    pub history_path: PathBuf,
    pub mode: ActivityMode,
    pub thresholds: RepThresholds,
    pub ideal_depth: f32,
    pub depth_tolerance: f32,
    pub min_visibility: f32,
    pub voice_enabled: bool,
    pub chime_enabled: bool,
    pub chime_volume: f32,
}

impl Default for CoachSettings {
    fn default() -> Self {
        Self {
            frames_dir: PathBuf::from("frames"),
            loop_frames: false,
            replay_path: PathBuf::from("pose_replay.json"),
            frame_interval_ms: 100,
            frame_timeout_ms: 2000,
            frame_change_threshold: 2,
            annotated_dir: None,
            history_path: PathBuf::from("workout_history.csv"),
            mode: ActivityMode::FreePose,
            thresholds: RepThresholds::default(),
            ideal_depth: DEFAULT_IDEAL_DEPTH,
            depth_tolerance: DEFAULT_DEPTH_TOLERANCE,
            min_visibility: 0.5,
            voice_enabled: false,
            chime_enabled: true,
            chime_volume: 0.8,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<CoachSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            CoachSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> CoachSettings {
        self.data.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn update(&self, apply: impl FnOnce(&mut CoachSettings)) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(|e| e.into_inner());
        apply(&mut guard);
        self.persist(&guard)
    }

    fn persist(&self, data: &CoachSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let settings = store.get();
        assert_eq!(settings.mode, ActivityMode::FreePose);
        assert_eq!(settings.thresholds.deep_angle, 90.0);
        assert_eq!(settings.thresholds.standing_angle, 160.0);
    }

    #[test]
    fn update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update(|s| {
                s.voice_enabled = true;
                s.mode = ActivityMode::SquatCounter;
            })
            .unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        let settings = reloaded.get();
        assert!(settings.voice_enabled);
        assert_eq!(settings.mode, ActivityMode::SquatCounter);
    }

    #[test]
    fn garbage_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.get().frame_interval_ms, 100);
    }
}
