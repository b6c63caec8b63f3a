//! Session controller: owns the session state and the frame-loop task, and
//! exposes the command surface shells drive (start/stop/reset/save/...).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use log::info;
use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::analysis::{SessionSnapshot, SessionTracker};
use crate::annotate::FrameAnnotator;
use crate::audio::ChimePlayer;
use crate::capture::FrameSource;
use crate::history::{WorkoutHistory, WorkoutRecord};
use crate::pose::PoseEstimator;
use crate::settings::CoachSettings;
use crate::voice::VoiceNotifier;

use super::loop_worker::{frame_loop, LoopConfig};
use super::{ActivityMode, DetectionStatus};

/// Point-in-time view of the controller for shells.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub running: bool,
    pub session_id: Option<String>,
    pub mode: ActivityMode,
    pub detection: DetectionStatus,
    pub snapshot: SessionSnapshot,
}

pub(crate) struct SharedState {
    pub tracker: SessionTracker,
    pub mode: ActivityMode,
    pub detection: DetectionStatus,
    pub running: bool,
    pub session_id: Option<String>,
}

pub struct SessionController {
    shared: Arc<Mutex<SharedState>>,
    annotator: FrameAnnotator,
    voice: VoiceNotifier,
    chime: ChimePlayer,
    history: WorkoutHistory,
    loop_cfg: LoopConfig,
    task: Mutex<Option<JoinHandle<()>>>,
    cancel_token: Mutex<Option<CancellationToken>>,
}

impl SessionController {
    pub fn new(settings: &CoachSettings, voice: VoiceNotifier, chime: ChimePlayer) -> Self {
        let tracker = SessionTracker::new(
            settings.thresholds,
            settings.ideal_depth,
            settings.depth_tolerance,
        );

        Self {
            shared: Arc::new(Mutex::new(SharedState {
                tracker,
                mode: settings.mode,
                detection: DetectionStatus::NoPerson,
                running: false,
                session_id: None,
            })),
            annotator: FrameAnnotator::new(settings.min_visibility),
            voice,
            chime,
            history: WorkoutHistory::new(settings.history_path.clone()),
            loop_cfg: LoopConfig {
                interval: Duration::from_millis(settings.frame_interval_ms),
                frame_timeout: Duration::from_millis(settings.frame_timeout_ms),
                change_threshold: settings.frame_change_threshold,
                annotated_dir: settings.annotated_dir.clone(),
                chime_enabled: settings.chime_enabled,
                chime_volume: settings.chime_volume,
            },
            task: Mutex::new(None),
            cancel_token: Mutex::new(None),
        }
    }

    /// Start the frame loop over `source`. Fails when a session is already
    /// running; session state carries over (reset is an explicit command).
    pub async fn start(
        &self,
        source: Box<dyn FrameSource>,
        estimator: Arc<dyn PoseEstimator>,
    ) -> Result<String> {
        let session_id = Uuid::new_v4().to_string();

        {
            let mut state = self.shared.lock().await;
            if state.running {
                bail!("a session is already running");
            }
            state.running = true;
            state.session_id = Some(session_id.clone());
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(frame_loop(
            session_id.clone(),
            source,
            estimator,
            self.annotator.clone(),
            Arc::clone(&self.shared),
            self.voice.clone(),
            self.chime.clone(),
            self.loop_cfg.clone(),
            cancel_token.clone(),
        ));

        *self.task.lock().await = Some(handle);
        *self.cancel_token.lock().await = Some(cancel_token);

        info!("session {session_id} started");
        Ok(session_id)
    }

    /// Stop the running loop, if any, and wait for it to wind down.
    pub async fn stop(&self) -> Result<()> {
        if let Some(token) = self.cancel_token.lock().await.take() {
            token.cancel();
        }

        if let Some(handle) = self.task.lock().await.take() {
            handle.await.context("frame loop task failed to join")?;
        }

        self.chime.stop();
        Ok(())
    }

    /// Reset rep count, stage, accuracy, and feedback to their initial
    /// values. Valid whether or not a session is running.
    pub async fn reset(&self) {
        let mut state = self.shared.lock().await;
        state.tracker.reset();
    }

    /// Append the current session to the workout history. Errors (nothing
    /// to save, unwritable store) surface to the caller; the live session
    /// keeps going either way.
    pub async fn save(&self) -> Result<WorkoutRecord> {
        let snapshot = {
            let state = self.shared.lock().await;
            state.tracker.snapshot()
        };

        if snapshot.rep_count == 0 {
            bail!("no completed reps to save yet");
        }

        let record = WorkoutRecord {
            timestamp: Utc::now(),
            reps: snapshot.rep_count,
            accuracy: snapshot.accuracy,
        };
        self.history.append(&record)?;
        info!(
            "saved workout: {} reps at {:.0}% accuracy",
            record.reps, record.accuracy
        );
        Ok(record)
    }

    pub async fn set_mode(&self, mode: ActivityMode) {
        let mut state = self.shared.lock().await;
        state.mode = mode;
    }

    pub fn set_voice(&self, enabled: bool) {
        self.voice.set_enabled(enabled);
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice.is_enabled()
    }

    pub async fn status(&self) -> SessionStatus {
        let state = self.shared.lock().await;
        SessionStatus {
            running: state.running,
            session_id: state.session_id.clone(),
            mode: state.mode,
            detection: state.detection,
            snapshot: state.tracker.snapshot(),
        }
    }

    pub fn history(&self) -> Result<Vec<WorkoutRecord>> {
        self.history.load()
    }
}
