//! Event types for AudioNest

use crate::container::ContainerId;
use crate::keys::VoiceKey;

/// Why a voice was destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyReason {
    /// Its natural or play-time-limited duration elapsed
    Expired,
    /// A scheduled stop fired
    Stopped,
    /// An instant stop was dispatched
    StoppedInstantly,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioNestEvent {
    VoiceStarted {
        key: VoiceKey,
        container: ContainerId,
        entry: String,
        /// Seconds until audible playback begins
        delay: f32,
    },
    VoiceStopping {
        key: VoiceKey,
        container: ContainerId,
        /// Seconds until the voice is destroyed
        remaining: f32,
    },
    VoiceDestroyed {
        key: VoiceKey,
        container: ContainerId,
        reason: DestroyReason,
    },
}

impl AudioNestEvent {
    pub fn key(&self) -> VoiceKey {
        match self {
            Self::VoiceStarted { key, .. }
            | Self::VoiceStopping { key, .. }
            | Self::VoiceDestroyed { key, .. } => *key,
        }
    }

    pub fn container(&self) -> ContainerId {
        match self {
            Self::VoiceStarted { container, .. }
            | Self::VoiceStopping { container, .. }
            | Self::VoiceDestroyed { container, .. } => *container,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self, Self::VoiceDestroyed { .. })
    }
}
