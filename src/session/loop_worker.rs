//! The frame loop: pulls frames from the source on a fixed cadence, runs
//! pose inference on the blocking pool, and feeds the pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::analysis::RepEvent;
use crate::annotate::FrameAnnotator;
use crate::audio::ChimePlayer;
use crate::capture::{FrameChangeGate, FrameSource};
use crate::pose::PoseEstimator;
use crate::voice::VoiceNotifier;

use super::controller::SharedState;
use super::{pipeline, ActivityMode};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

#[derive(Debug, Clone)]
pub(crate) struct LoopConfig {
    pub interval: Duration,
    pub frame_timeout: Duration,
    pub change_threshold: u32,
    pub annotated_dir: Option<PathBuf>,
    pub chime_enabled: bool,
    pub chime_volume: f32,
}

pub(crate) async fn frame_loop(
    session_id: String,
    mut source: Box<dyn FrameSource>,
    estimator: Arc<dyn PoseEstimator>,
    annotator: FrameAnnotator,
    shared: Arc<Mutex<SharedState>>,
    voice: VoiceNotifier,
    chime: ChimePlayer,
    cfg: LoopConfig,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(cfg.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut gate = FrameChangeGate::new(cfg.change_threshold);
    let mut frame_index: u64 = 0;
    let mut skipped: u64 = 0;

    if let Some(dir) = &cfg.annotated_dir {
        if let Err(err) = std::fs::create_dir_all(dir) {
            log_warn!(
                "cannot create annotated output dir {}: {err}; disabling frame output",
                dir.display()
            );
        }
    }

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let frame = match source.next_frame() {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        log_info!("frame source exhausted, ending session {session_id}");
                        break;
                    }
                    Err(err) => {
                        log_error!("frame source lost for session {session_id}: {err:#}");
                        break;
                    }
                };

                if !gate.accept(&frame) {
                    skipped += 1;
                    continue;
                }

                // Inference may take a while; keep it off the async runtime.
                let est = Arc::clone(&estimator);
                let inference_frame = frame.clone();
                let inference = tokio::task::spawn_blocking(move || est.detect(&inference_frame));

                let pose = match tokio::time::timeout(cfg.frame_timeout, inference).await {
                    Ok(Ok(Ok(pose))) => pose,
                    Ok(Ok(Err(err))) => {
                        log_error!("pose inference failed: {err:#}");
                        continue;
                    }
                    Ok(Err(err)) => {
                        log_error!("inference worker join failed: {err}");
                        continue;
                    }
                    Err(_) => {
                        log_warn!(
                            "pose inference timeout (> {:?}) in session {session_id}",
                            cfg.frame_timeout
                        );
                        continue;
                    }
                };

                let (outcome, mode) = {
                    let mut state = shared.lock().await;
                    let mode = state.mode;
                    let outcome =
                        pipeline::apply_pose(pose, &annotator, &mut state.tracker, mode, &frame);
                    state.detection = outcome.status;
                    (outcome, mode)
                };

                if mode == ActivityMode::SquatCounter {
                    voice.notify(&outcome.snapshot.feedback);
                    if outcome.event == RepEvent::Completed && cfg.chime_enabled {
                        chime.chime(cfg.chime_volume);
                    }
                }

                if let Some(dir) = &cfg.annotated_dir {
                    let path = dir.join(format!("{session_id}_{frame_index:05}.png"));
                    if let Err(err) = outcome.annotated.save(&path) {
                        log_warn!("failed to write annotated frame {}: {err}", path.display());
                    }
                }

                frame_index += 1;
            }
            _ = cancel_token.cancelled() => {
                log_info!("frame loop for session {session_id} shutting down");
                break;
            }
        }
    }

    log_info!(
        "session {session_id} loop done: {frame_index} frames processed, {skipped} unchanged frames skipped"
    );

    let mut state = shared.lock().await;
    state.running = false;
}
