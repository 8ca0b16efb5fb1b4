//! Voice allocation and rendering seam.
//!
//! The dispatcher never touches samples. It asks a [`VoiceBackend`] for a native voice when an
//! entry starts playing and tells it when that voice is done. [`HeadlessBackend`] keeps only
//! bookkeeping, which is what servers, tools and tests need.

use crate::config::SoundEntryDesc;
use crate::container::ContainerId;
use crate::error::{AudioNestError, Result};
use std::collections::HashMap;

/// Opaque handle to a backend-owned playback object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct VoiceHandle(u64);

impl VoiceHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for VoiceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VoiceHandle({})", self.0)
    }
}

/// When audible playback of a freshly allocated voice begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackStart {
    Immediate,
    /// Start after the given number of seconds
    Delayed(f32),
}

impl PlaybackStart {
    /// Seconds until playback begins.
    pub fn delay(&self) -> f32 {
        match self {
            Self::Immediate => 0.0,
            Self::Delayed(seconds) => *seconds,
        }
    }
}

/// Native voice allocator and renderer.
pub trait VoiceBackend {
    /// Creates a voice configured from `entry`, emitting from `emitter`.
    fn allocate(&mut self, entry: &SoundEntryDesc, emitter: ContainerId) -> Result<VoiceHandle>;

    /// Starts (or schedules) playback of an allocated voice.
    fn set_playback_state(&mut self, handle: VoiceHandle, start: PlaybackStart);

    /// Stops and releases a voice. Destroying an unknown or already destroyed handle is a no-op.
    fn destroy(&mut self, handle: VoiceHandle);

    /// Length in seconds of the clip `entry` plays.
    fn clip_length(&self, entry: &SoundEntryDesc) -> f32 {
        entry.clip_length()
    }
}

/// Bookkeeping for one voice held by a [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessVoice {
    pub entry: String,
    pub emitter: ContainerId,
    pub output: String,
    pub looping: bool,
    pub mute: bool,
    pub volume: f32,
    pub pitch: f32,
    pub start: Option<PlaybackStart>,
}

/// Backend that tracks voices without producing sound.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
    max_voices: Option<usize>,
    voices: HashMap<VoiceHandle, HeadlessVoice>,
    destroyed: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that refuses to allocate beyond `max_voices` concurrent voices.
    pub fn with_max_voices(max_voices: usize) -> Self {
        Self {
            max_voices: Some(max_voices),
            ..Default::default()
        }
    }

    pub fn voice(&self, handle: VoiceHandle) -> Option<&HeadlessVoice> {
        self.voices.get(&handle)
    }

    pub fn is_live(&self, handle: VoiceHandle) -> bool {
        self.voices.contains_key(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.voices.len()
    }

    /// Number of voices released so far.
    pub fn destroyed_count(&self) -> usize {
        self.destroyed
    }
}

impl VoiceBackend for HeadlessBackend {
    fn allocate(&mut self, entry: &SoundEntryDesc, emitter: ContainerId) -> Result<VoiceHandle> {
        if let Some(max) = self.max_voices {
            if self.voices.len() >= max {
                return Err(AudioNestError::AllocationFailed {
                    entry: entry.name.clone(),
                    reason: format!("voice limit of {} reached", max),
                });
            }
        }

        let handle = VoiceHandle(self.next_handle);
        self.next_handle += 1;

        self.voices.insert(
            handle,
            HeadlessVoice {
                entry: entry.name.clone(),
                emitter,
                output: entry
                    .output
                    .as_ref()
                    .map(|o| o.name().to_string())
                    .unwrap_or_default(),
                looping: entry.looping,
                mute: entry.mute,
                volume: entry.volume,
                pitch: entry.pitch,
                start: None,
            },
        );

        Ok(handle)
    }

    fn set_playback_state(&mut self, handle: VoiceHandle, start: PlaybackStart) {
        if let Some(voice) = self.voices.get_mut(&handle) {
            voice.start = Some(start);
        }
    }

    fn destroy(&mut self, handle: VoiceHandle) {
        if self.voices.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }
}
