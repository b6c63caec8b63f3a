//! Frame acquisition.
//!
//! The session loop pulls frames through [`FrameSource`]; live capture
//! devices plug in behind the same trait. The built-in source replays
//! ordered image files from a directory.

pub mod change;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::RgbImage;

pub use change::FrameChangeGate;

/// A stream of raster frames. `Ok(None)` ends the session cleanly; an error
/// means the source was lost. The source is acquired at session start and
/// released on drop, whatever the exit path.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Frames from image files in a directory, in file-name order.
#[derive(Debug)]
pub struct DirectoryFrameSource {
    files: Vec<PathBuf>,
    cursor: usize,
    looped: bool,
}

impl DirectoryFrameSource {
    pub fn open(dir: &Path, looped: bool) -> Result<Self> {
        let entries = fs::read_dir(dir).with_context(|| {
            format!(
                "cannot open frame directory {} - check the path in your settings and restart",
                dir.display()
            )
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();

        if files.is_empty() {
            bail!(
                "no frames found in {} - capture some frames (png/jpg) there and restart the session",
                dir.display()
            );
        }

        Ok(Self {
            files,
            cursor: 0,
            looped,
        })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FrameSource for DirectoryFrameSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if self.cursor >= self.files.len() {
            if !self.looped {
                return Ok(None);
            }
            self.cursor = 0;
        }

        let path = &self.files[self.cursor];
        self.cursor += 1;

        let frame = image::open(path)
            .with_context(|| format!("failed to load frame {}", path.display()))?
            .to_rgb8();
        Ok(Some(frame))
    }
}
