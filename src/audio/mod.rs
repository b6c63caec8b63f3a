//! Audio cues, rendered on a dedicated thread.
//!
//! rodio's output handle is not `Send`, so a single long-lived thread owns
//! the stream and sink and takes commands over a channel. Commands are
//! fire-and-forget; a machine without an audio device logs one warning and
//! swallows everything after that.

pub mod chime;

use rodio::{OutputStream, Sink};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{Context, Result};
use log::warn;

use chime::RepChime;

enum AudioCommand {
    Chime { volume: f32 },
    Stop,
}

#[derive(Clone)]
pub struct ChimePlayer {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
}

impl ChimePlayer {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>> {
        let mut guard = self.tx.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        thread::Builder::new()
            .name("rep-chime".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;
                let mut warned = false;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<()> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .context("failed to open audio output stream")?;
                        let new_sink =
                            Sink::try_new(&handle).context("failed to create audio sink")?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Chime { volume } => {
                            if let Err(err) = ensure_sink(&mut _stream, &mut sink) {
                                if !warned {
                                    warn!("audio unavailable, muting rep chime: {err:#}");
                                    warned = true;
                                }
                                continue;
                            }
                            if let Some(ref s) = sink {
                                s.append(RepChime::new(volume));
                            }
                        }
                        AudioCommand::Stop => {
                            if let Some(s_old) = sink.take() {
                                s_old.stop();
                            }
                            _stream = None;
                        }
                    }
                }
            })
            .context("failed to spawn audio thread")?;

        let tx_clone = tx.clone();
        *guard = Some(tx);
        Ok(tx_clone)
    }

    /// Play the rep-completion blip. Never blocks on the audio device.
    pub fn chime(&self, volume: f32) {
        match self.ensure_thread() {
            Ok(tx) => {
                let _ = tx.send(AudioCommand::Chime { volume });
            }
            Err(err) => warn!("failed to start audio thread: {err:#}"),
        }
    }

    pub fn stop(&self) {
        if let Some(tx) = self
            .tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            let _ = tx.send(AudioCommand::Stop);
        }
    }
}

impl Default for ChimePlayer {
    fn default() -> Self {
        Self::new()
    }
}
