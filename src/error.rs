//! Error types for AudioNest

use crate::container::ContainerId;
use crate::keys::VoiceKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioNestError {
    #[error("Index {index} out of range for container '{container}' ({len} entries)")]
    InvalidIndex {
        container: String,
        index: usize,
        len: usize,
    },

    #[error("Sound '{name}' not found")]
    NotFound { name: String },

    #[error("Voice allocation failed for '{entry}': {reason}")]
    AllocationFailed { entry: String, reason: String },

    #[error("Voice {key} is not live")]
    StaleKey { key: VoiceKey },

    #[error("Unknown container: {0}")]
    UnknownContainer(ContainerId),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Audio loading error: {0}")]
    AudioLoading(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioNestError {
    /// True for the lookup miss that lets a name search move on to the next child.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, AudioNestError>;
