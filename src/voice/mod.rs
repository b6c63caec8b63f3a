//! Voice feedback: fire-and-forget speech on a dedicated worker thread.
//!
//! The frame loop must never wait on speech synthesis, so messages go over
//! a small bounded channel; when the channel is full the message is simply
//! dropped. A message identical to the previously queued one is dropped
//! too, so the coach does not repeat itself frame after frame. A failing
//! backend gets one warning in the log, then degrades to silence.

pub mod backend;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use log::{debug, error, warn};

pub use backend::{SpeechBackend, SystemSpeech};

const QUEUE_CAPACITY: usize = 8;

enum VoiceCommand {
    Say(String),
    Shutdown,
}

struct VoiceInner {
    enabled: AtomicBool,
    last_message: Mutex<Option<String>>,
    tx: SyncSender<VoiceCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for VoiceInner {
    fn drop(&mut self) {
        let _ = self.tx.send(VoiceCommand::Shutdown);
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = guard.take() {
            if let Err(err) = handle.join() {
                error!("failed to join voice worker: {err:?}");
            }
        }
    }
}

#[derive(Clone)]
pub struct VoiceNotifier {
    inner: Arc<VoiceInner>,
}

impl VoiceNotifier {
    pub fn new(enabled: bool) -> Result<Self> {
        Self::with_backend(enabled, SystemSpeech::new())
    }

    pub fn with_backend(enabled: bool, backend: impl SpeechBackend) -> Result<Self> {
        let (tx, rx) = mpsc::sync_channel::<VoiceCommand>(QUEUE_CAPACITY);

        let worker = thread::Builder::new()
            .name("voice-notifier".to_string())
            .spawn(move || run_worker(rx, backend))
            .context("failed to spawn voice worker thread")?;

        Ok(Self {
            inner: Arc::new(VoiceInner {
                enabled: AtomicBool::new(enabled),
                last_message: Mutex::new(None),
                tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    /// Queue `message` for speaking. Dropped when the notifier is disabled,
    /// the message repeats the previous one, or the queue is full.
    pub fn notify(&self, message: &str) {
        if message.is_empty() || !self.is_enabled() {
            return;
        }

        {
            let mut last = self
                .inner
                .last_message
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if last.as_deref() == Some(message) {
                return;
            }
            *last = Some(message.to_string());
        }

        match self.inner.tx.try_send(VoiceCommand::Say(message.to_string())) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!("voice queue full, dropping message"),
            Err(TrySendError::Disconnected(_)) => warn!("voice worker gone, dropping message"),
        }
    }
}

fn run_worker(rx: mpsc::Receiver<VoiceCommand>, mut backend: impl SpeechBackend) {
    let mut warned = false;

    while let Ok(command) = rx.recv() {
        let message = match command {
            VoiceCommand::Say(message) => message,
            VoiceCommand::Shutdown => break,
        };

        let cleaned = clean_message(&message);
        if cleaned.is_empty() {
            continue;
        }

        if let Err(err) = backend.speak(&cleaned) {
            if !warned {
                warn!("speech backend failed, muting voice feedback: {err:#}");
                warned = true;
            }
        }
    }
}

/// Speech engines stumble over punctuation; keep letters, digits, spaces.
fn clean_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    struct CollectingBackend {
        spoken: Arc<Mutex<Vec<String>>>,
    }

    impl SpeechBackend for CollectingBackend {
        fn speak(&mut self, message: &str) -> Result<()> {
            self.spoken
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(message.to_string());
            Ok(())
        }
    }

    fn collecting_notifier(enabled: bool) -> (VoiceNotifier, Arc<Mutex<Vec<String>>>) {
        let spoken = Arc::new(Mutex::new(Vec::new()));
        let notifier = VoiceNotifier::with_backend(
            enabled,
            CollectingBackend {
                spoken: Arc::clone(&spoken),
            },
        )
        .unwrap();
        (notifier, spoken)
    }

    fn drain(notifier: VoiceNotifier) {
        // Dropping the last handle joins the worker.
        drop(notifier);
    }

    #[test]
    fn never_repeats_the_same_message_consecutively() {
        let (notifier, spoken) = collecting_notifier(true);
        notifier.notify("Push up!");
        notifier.notify("Push up!");
        notifier.notify("Great squat!");
        notifier.notify("Push up!");
        drain(notifier);

        let spoken = spoken.lock().unwrap();
        assert_eq!(*spoken, vec!["Push up", "Great squat", "Push up"]);
    }

    #[test]
    fn disabled_notifier_stays_silent() {
        let (notifier, spoken) = collecting_notifier(false);
        notifier.notify("Keep going down!");
        drain(notifier);

        assert!(spoken.lock().unwrap().is_empty());
    }

    #[test]
    fn strips_punctuation_before_speaking() {
        let (notifier, spoken) = collecting_notifier(true);
        notifier.notify("Squat deeper for better results!");
        drain(notifier);

        assert_eq!(
            *spoken.lock().unwrap(),
            vec!["Squat deeper for better results"]
        );
    }

    struct FailingBackend;

    impl SpeechBackend for FailingBackend {
        fn speak(&mut self, _message: &str) -> Result<()> {
            anyhow::bail!("no speech engine")
        }
    }

    #[test]
    fn backend_failure_is_not_fatal() {
        let notifier = VoiceNotifier::with_backend(true, FailingBackend).unwrap();
        notifier.notify("Push up!");
        notifier.notify("Great squat!");
        drain(notifier);
    }
}
