//! Runtime sound entries.

use crate::audibility;
use crate::backend::{PlaybackStart, VoiceBackend};
use crate::config::SoundEntryDesc;
use crate::container::ContainerId;
use crate::error::{AudioNestError, Result};
use crate::keys::{KeyGenerator, VoiceKey};
use crate::math::Vec3;
use crate::playback::Voice;
use std::collections::HashMap;

/// A sound entry owned by one container: its immutable profile plus the table of live voices
/// spawned from it.
///
/// The voice table is only mutated by the dispatcher of the owning container.
#[derive(Debug)]
pub struct SoundEntry {
    desc: SoundEntryDesc,
    voices: HashMap<VoiceKey, Voice>,
}

impl SoundEntry {
    pub fn new(desc: SoundEntryDesc) -> Result<Self> {
        desc.validate()?;
        Ok(Self {
            desc,
            voices: HashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn desc(&self) -> &SoundEntryDesc {
        &self.desc
    }

    pub fn contains_voice(&self, key: VoiceKey) -> bool {
        self.voices.contains_key(&key)
    }

    pub fn voice(&self, key: VoiceKey) -> Option<&Voice> {
        self.voices.get(&key)
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.values()
    }

    pub fn live_count(&self) -> usize {
        self.voices.len()
    }

    pub fn is_playing(&self) -> bool {
        !self.voices.is_empty()
    }

    /// Detection loudness of this entry at `source` heard from `listener`; 0 when nothing plays.
    pub fn audibility(&self, source: Vec3, listener: Vec3) -> f32 {
        if self.voices.is_empty() {
            return 0.0;
        }
        audibility::loudness_between(&self.desc.detection, source, listener)
    }

    /// Allocates a voice, starts it and records it under a fresh key.
    ///
    /// Nothing is allocated when the entry lacks a clip or an output route.
    pub(crate) fn spawn_voice(
        &mut self,
        backend: &mut dyn VoiceBackend,
        keys: &mut dyn KeyGenerator,
        emitter: ContainerId,
        start: PlaybackStart,
        now: f64,
    ) -> Result<VoiceKey> {
        if self.desc.output.is_none() {
            return Err(AudioNestError::AllocationFailed {
                entry: self.desc.name.clone(),
                reason: "no output route".to_string(),
            });
        }
        if self.desc.clip.is_none() {
            return Err(AudioNestError::AllocationFailed {
                entry: self.desc.name.clone(),
                reason: "no audio clip".to_string(),
            });
        }

        let handle = backend.allocate(&self.desc, emitter)?;
        let key = keys.new_key();

        let mut voice = Voice::new(key, handle, now, start, self.desc.looping);
        backend.set_playback_state(handle, start);
        voice.mark_playing();

        log::debug!(
            "Voice {} of '{}' started on {} ({:?})",
            key,
            self.desc.name,
            handle,
            start
        );

        self.voices.insert(key, voice);
        Ok(key)
    }

    pub(crate) fn voice_mut(&mut self, key: VoiceKey) -> Option<&mut Voice> {
        self.voices.get_mut(&key)
    }

    /// Removes a voice and releases its native handle. Returns `None` if the key is not live.
    pub(crate) fn destroy_voice(
        &mut self,
        backend: &mut dyn VoiceBackend,
        key: VoiceKey,
    ) -> Option<Voice> {
        let mut voice = self.voices.remove(&key)?;
        backend.destroy(voice.handle());
        voice.mark_destroyed();
        log::debug!("Voice {} of '{}' destroyed", key, self.desc.name);
        Some(voice)
    }

    /// Destroys every live voice, returning their keys.
    pub(crate) fn destroy_all(&mut self, backend: &mut dyn VoiceBackend) -> Vec<VoiceKey> {
        let keys: Vec<VoiceKey> = self.voices.keys().copied().collect();
        for key in &keys {
            self.destroy_voice(backend, *key);
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_data::AudioClip;
    use crate::backend::HeadlessBackend;
    use crate::config::OutputRoute;
    use crate::keys::SequentialKeys;
    use crate::playback::VoiceState;

    fn playable(name: &str) -> SoundEntryDesc {
        SoundEntryDesc::new(name)
            .clip(AudioClip::with_length(name, 2.0))
            .output(OutputRoute::new("sfx"))
    }

    #[test]
    fn test_spawn_and_destroy() {
        let mut backend = HeadlessBackend::new();
        let mut keys = SequentialKeys::new();
        let mut entry = SoundEntry::new(playable("bell")).unwrap();
        let emitter = ContainerId::from_index(0);

        let key = entry
            .spawn_voice(&mut backend, &mut keys, emitter, PlaybackStart::Immediate, 0.0)
            .unwrap();
        assert!(entry.contains_voice(key));
        assert!(entry.is_playing());
        assert_eq!(entry.voice(key).unwrap().state(), VoiceState::Playing);
        assert_eq!(backend.live_count(), 1);

        let destroyed = entry.destroy_voice(&mut backend, key).unwrap();
        assert_eq!(destroyed.state(), VoiceState::Destroyed);
        assert!(!entry.contains_voice(key));
        assert_eq!(backend.live_count(), 0);

        assert!(entry.destroy_voice(&mut backend, key).is_none());
    }

    #[test]
    fn test_spawn_requires_clip_and_output() {
        let mut backend = HeadlessBackend::new();
        let mut keys = SequentialKeys::new();
        let emitter = ContainerId::from_index(0);

        let mut silent = SoundEntry::new(SoundEntryDesc::new("silent")).unwrap();
        let result =
            silent.spawn_voice(&mut backend, &mut keys, emitter, PlaybackStart::Immediate, 0.0);
        assert!(matches!(result, Err(AudioNestError::AllocationFailed { .. })));

        let mut unrouted = SoundEntry::new(
            SoundEntryDesc::new("unrouted").clip(AudioClip::with_length("c", 1.0)),
        )
        .unwrap();
        let result =
            unrouted.spawn_voice(&mut backend, &mut keys, emitter, PlaybackStart::Immediate, 0.0);
        assert!(matches!(result, Err(AudioNestError::AllocationFailed { .. })));

        assert_eq!(backend.live_count(), 0);
    }

    #[test]
    fn test_audibility_requires_live_voice() {
        let mut backend = HeadlessBackend::new();
        let mut keys = SequentialKeys::new();
        let mut entry = SoundEntry::new(playable("bell")).unwrap();
        let source = Vec3::ZERO;
        let listener = Vec3::new(5.0, 0.0, 0.0);

        assert_eq!(entry.audibility(source, listener), 0.0);

        entry
            .spawn_voice(
                &mut backend,
                &mut keys,
                ContainerId::from_index(0),
                PlaybackStart::Immediate,
                0.0,
            )
            .unwrap();
        assert!((entry.audibility(source, listener) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_desc_rejected() {
        assert!(SoundEntry::new(playable("x").volume(2.0)).is_err());
    }
}
