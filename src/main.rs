use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use formcoach::analysis::counter::READY_FEEDBACK;
use formcoach::audio::ChimePlayer;
use formcoach::capture::DirectoryFrameSource;
use formcoach::pose::ReplayEstimator;
use formcoach::session::{ActivityMode, DetectionStatus, SessionController};
use formcoach::settings::SettingsStore;
use formcoach::voice::VoiceNotifier;

const HELP: &str = "\
commands:
  start            begin a session over the configured frame source
  stop             end the running session
  reset            reset rep count, stage, and accuracy
  save             append the current session to the workout history
  mode free|squat  switch between free pose and squat counting
  voice on|off     toggle spoken feedback
  stats            show the current session state
  history          list saved workouts
  quit             stop and exit";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("FormCoach starting up...");

    let settings_path = std::env::var_os("FORMCOACH_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("formcoach.json"));
    let settings_store = SettingsStore::new(settings_path)?;
    let settings = settings_store.get();

    let voice = VoiceNotifier::new(settings.voice_enabled)?;
    let controller = SessionController::new(&settings, voice, ChimePlayer::new());

    println!("FormCoach - pose-driven squat coach");
    println!("mode: {}  (type 'help' for commands)", settings.mode.as_str());

    run_shell(&controller, &settings_store).await
}

async fn run_shell(controller: &SessionController, settings: &SettingsStore) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some(command) => command,
            None => continue,
        };
        let arg = parts.next();

        match (command, arg) {
            ("help", _) => println!("{HELP}"),
            ("start", _) => start_session(controller, settings).await,
            ("stop", _) => match controller.stop().await {
                Ok(()) => println!("session stopped"),
                Err(err) => println!("error: {err:#}"),
            },
            ("reset", _) => {
                controller.reset().await;
                println!("counter reset");
            }
            ("save", _) => match controller.save().await {
                Ok(record) => println!(
                    "saved: {} reps at {:.0}% accuracy",
                    record.reps, record.accuracy
                ),
                Err(err) => println!("could not save workout: {err:#}"),
            },
            ("mode", Some("free")) => {
                set_mode(controller, settings, ActivityMode::FreePose).await;
            }
            ("mode", Some("squat")) => {
                set_mode(controller, settings, ActivityMode::SquatCounter).await;
            }
            ("mode", _) => println!("usage: mode free|squat"),
            ("voice", Some("on")) => set_voice(controller, settings, true),
            ("voice", Some("off")) => set_voice(controller, settings, false),
            ("voice", _) => println!("usage: voice on|off"),
            ("stats", _) => print_stats(controller).await,
            ("history", _) => print_history(controller),
            ("quit" | "exit", _) => break,
            _ => println!("unknown command '{command}' (type 'help')"),
        }
    }

    controller.stop().await?;
    Ok(())
}

async fn start_session(controller: &SessionController, settings: &SettingsStore) {
    let settings = settings.get();

    let source = match DirectoryFrameSource::open(&settings.frames_dir, settings.loop_frames) {
        Ok(source) => Box::new(source),
        Err(err) => {
            println!("cannot start session: {err:#}");
            return;
        }
    };
    let estimator = match ReplayEstimator::from_file(&settings.replay_path, settings.loop_frames) {
        Ok(estimator) => Arc::new(estimator),
        Err(err) => {
            println!("cannot start session: {err:#}");
            return;
        }
    };

    match controller.start(source, estimator).await {
        Ok(session_id) => println!("session {session_id} started"),
        Err(err) => println!("cannot start session: {err:#}"),
    }
}

async fn set_mode(controller: &SessionController, settings: &SettingsStore, mode: ActivityMode) {
    controller.set_mode(mode).await;
    if let Err(err) = settings.update(|s| s.mode = mode) {
        log::warn!("failed to persist mode setting: {err:#}");
    }
    println!("mode: {}", mode.as_str());
}

fn set_voice(controller: &SessionController, settings: &SettingsStore, enabled: bool) {
    controller.set_voice(enabled);
    if let Err(err) = settings.update(|s| s.voice_enabled = enabled) {
        log::warn!("failed to persist voice setting: {err:#}");
    }
    println!("voice feedback {}", if enabled { "on" } else { "off" });
}

async fn print_stats(controller: &SessionController) {
    let status = controller.status().await;
    let snapshot = &status.snapshot;
    let feedback = if snapshot.feedback.is_empty() {
        READY_FEEDBACK
    } else {
        &snapshot.feedback
    };

    println!(
        "session: {}",
        if status.running { "running" } else { "idle" }
    );
    println!(
        "detection: {}",
        match status.detection {
            DetectionStatus::PoseDetected => "pose detected",
            DetectionStatus::NoPerson => "no person detected",
        }
    );
    println!("mode: {}", status.mode.as_str());
    println!("reps: {}", snapshot.rep_count);
    println!("stage: {}", snapshot.stage.as_str());
    println!("knee angle: {:.1}", snapshot.angle);
    println!("form accuracy: {:.0}%", snapshot.accuracy);
    println!("frames processed: {}", snapshot.frames_processed);
    println!("coach: {feedback}");
}

fn print_history(controller: &SessionController) {
    match controller.history() {
        Ok(records) if records.is_empty() => println!("no saved workouts yet"),
        Ok(records) => {
            for record in records {
                println!(
                    "{}  {:>3} reps  {:>5.1}% accuracy",
                    record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    record.reps,
                    record.accuracy
                );
            }
        }
        Err(err) => println!("could not load history: {err:#}"),
    }
}
