mod clip_loader;

use crate::error::Result;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// Shared, immutable description of a decoded audio buffer.
///
/// Only the metadata the dispatcher needs is kept here; sample data stays with the
/// rendering backend.
#[derive(Debug, Clone)]
pub struct AudioClip {
    inner: Arc<AudioClipInner>,
}

#[derive(Debug)]
pub(crate) struct AudioClipInner {
    pub name: String,
    pub length: f32,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
}

impl AudioClip {
    pub(crate) fn new(
        name: String,
        length: f32,
        sample_rate: Option<u32>,
        channels: Option<u16>,
    ) -> Self {
        Self {
            inner: Arc::new(AudioClipInner {
                name,
                length,
                sample_rate,
                channels,
            }),
        }
    }

    /// Creates a clip of a known length without touching any file.
    pub fn with_length(name: impl Into<String>, length: f32) -> Self {
        Self::new(name.into(), length, None, None)
    }

    /// Probes an audio file and reads its length.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let extension = path.extension().and_then(|e| e.to_str());

        clip_loader::probe_clip(name, Box::new(file), extension)
    }

    /// Probes an in-memory encoded audio file.
    pub fn from_bytes(
        name: impl Into<String>,
        bytes: Vec<u8>,
        extension: Option<&str>,
    ) -> Result<Self> {
        clip_loader::probe_clip(name.into(), Box::new(Cursor::new(bytes)), extension)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Length in seconds
    pub fn length(&self) -> f32 {
        self.inner.length
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.inner.sample_rate
    }

    pub fn channels(&self) -> Option<u16> {
        self.inner.channels
    }

    /// True when both handles point at the same clip.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
