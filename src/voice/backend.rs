//! Speech backends for the voice notifier.

use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};

/// Turns a feedback string into audible speech. Implementations run on the
/// notifier's worker thread and may block.
pub trait SpeechBackend: Send + 'static {
    fn speak(&mut self, message: &str) -> Result<()>;
}

/// Shells out to the platform speech command.
pub struct SystemSpeech {
    program: &'static str,
}

impl SystemSpeech {
    pub fn new() -> Self {
        #[cfg(target_os = "macos")]
        let program = "say";
        #[cfg(not(target_os = "macos"))]
        let program = "espeak";

        Self { program }
    }
}

impl Default for SystemSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechBackend for SystemSpeech {
    fn speak(&mut self, message: &str) -> Result<()> {
        let status = Command::new(self.program)
            .arg(message)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("failed to launch speech command '{}'", self.program))?;

        if !status.success() {
            bail!("speech command '{}' exited with {status}", self.program);
        }
        Ok(())
    }
}
