//! Playback requests and live voice state.
//!
//! This module provides the value types that flow through the dispatcher:
//! - [`PlayRequest`]: How a play operation schedules start and destruction
//! - [`StopMode`]: How a stop operation ends a voice
//! - [`Operation`]: A play or stop request, addressed by the container layer
//! - [`Voice`]: One live playback instance and its [`VoiceState`]
//!
//! Most users will go through [`AudioNestWorld`](crate::AudioNestWorld) facades like
//! `play()`, `play_delayed()` and `stop_instant()` rather than building these directly.

use crate::backend::{PlaybackStart, VoiceHandle};
use crate::config::SoundEntryDesc;
use crate::keys::VoiceKey;

/// Lifecycle of a voice. No state is re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    /// Allocated, playback not yet requested from the backend
    Requested,
    /// Playing or waiting out its start delay
    Playing,
    /// A stop has been scheduled
    Stopping,
    /// Released; the key is no longer valid
    Destroyed,
}

/// One live playback instance of a sound entry.
#[derive(Debug, Clone)]
pub struct Voice {
    key: VoiceKey,
    handle: VoiceHandle,
    /// Clock time at which audible playback begins (request time plus start delay)
    started_at: f64,
    looping: bool,
    state: VoiceState,
}

impl Voice {
    pub(crate) fn new(
        key: VoiceKey,
        handle: VoiceHandle,
        now: f64,
        start: PlaybackStart,
        looping: bool,
    ) -> Self {
        Self {
            key,
            handle,
            started_at: now + start.delay().max(0.0) as f64,
            looping,
            state: VoiceState::Requested,
        }
    }

    pub fn key(&self) -> VoiceKey {
        self.key
    }

    pub fn handle(&self) -> VoiceHandle {
        self.handle
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// Position within the clip at clock time `now`, in seconds.
    ///
    /// Zero before playback begins. Looping voices wrap around the clip, one-shot voices
    /// stop at its end.
    pub fn playback_position(&self, now: f64, clip_length: f32) -> f32 {
        let elapsed = (now - self.started_at).max(0.0) as f32;
        if clip_length <= 0.0 {
            return 0.0;
        }
        if self.looping {
            elapsed % clip_length
        } else {
            elapsed.min(clip_length)
        }
    }

    pub(crate) fn mark_playing(&mut self) {
        if self.state == VoiceState::Requested {
            self.state = VoiceState::Playing;
        }
    }

    pub(crate) fn mark_stopping(&mut self) {
        if self.state == VoiceState::Playing {
            self.state = VoiceState::Stopping;
        }
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.state = VoiceState::Destroyed;
    }
}

/// How a play operation picks its start delay.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StartMode {
    /// Use the entry's configured play delay
    #[default]
    Configured,
    /// Start immediately, ignoring the configured delay
    Instant,
    /// Start after the given number of seconds
    Delayed(f32),
}

/// Parameters of a play operation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayRequest {
    pub start: StartMode,
    /// Explicit playback duration; the voice is destroyed after `min(play_time, clip length)`
    pub play_time: Option<f32>,
}

impl PlayRequest {
    pub fn configured() -> Self {
        Self::default()
    }

    pub fn instant() -> Self {
        Self {
            start: StartMode::Instant,
            play_time: None,
        }
    }

    pub fn delayed(delay: f32) -> Self {
        Self {
            start: StartMode::Delayed(delay),
            play_time: None,
        }
    }

    pub fn with_play_time(mut self, play_time: f32) -> Self {
        self.play_time = Some(play_time);
        self
    }

    /// Seconds before audible playback begins.
    pub fn start_delay(&self, entry: &SoundEntryDesc) -> f32 {
        match self.start {
            StartMode::Configured => entry.play_delay,
            StartMode::Instant => 0.0,
            StartMode::Delayed(delay) => delay,
        }
    }

    /// Backend playback state for this request.
    pub fn playback_start(&self, entry: &SoundEntryDesc) -> PlaybackStart {
        match self.start {
            StartMode::Configured if entry.play_delay == 0.0 => PlaybackStart::Immediate,
            StartMode::Configured => PlaybackStart::Delayed(entry.play_delay),
            StartMode::Instant => PlaybackStart::Immediate,
            StartMode::Delayed(delay) => PlaybackStart::Delayed(delay),
        }
    }

    /// Seconds after which the new voice is destroyed automatically, if at all.
    ///
    /// Without an explicit play time, looping entries live until stopped and one-shot
    /// entries live for their configured play time (or the whole clip when that is 0).
    /// An explicit play time always schedules destruction.
    pub fn lifetime(&self, entry: &SoundEntryDesc, clip_length: f32) -> Option<f32> {
        let delay = self.start_delay(entry);
        match self.play_time {
            Some(play_time) => Some(delay + play_time.min(clip_length)),
            None if entry.looping => None,
            None if entry.play_time == 0.0 => Some(delay + clip_length),
            None => Some(delay + entry.play_time),
        }
    }
}

/// How a stop operation ends a voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopMode {
    /// Let the current pass through the clip finish
    Natural,
    /// Destroy right away
    Instant,
    /// Destroy after exactly the given number of seconds
    Delayed(f32),
}

/// Operation dispatched to a sound entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Play(PlayRequest),
    Stop { mode: StopMode, key: VoiceKey },
}

/// Successful result of a dispatched [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Played(VoiceKey),
    Stopped(VoiceKey),
}

impl Outcome {
    pub fn key(&self) -> VoiceKey {
        match self {
            Self::Played(key) | Self::Stopped(key) => *key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyGenerator, SequentialKeys};

    fn voice(now: f64, start: PlaybackStart, looping: bool) -> Voice {
        let key = SequentialKeys::new().new_key();
        Voice::new(key, VoiceHandle::from_raw(0), now, start, looping)
    }

    #[test]
    fn test_voice_state_transitions() {
        let mut v = voice(0.0, PlaybackStart::Immediate, false);
        assert_eq!(v.state(), VoiceState::Requested);
        v.mark_stopping();
        assert_eq!(v.state(), VoiceState::Requested);
        v.mark_playing();
        assert_eq!(v.state(), VoiceState::Playing);
        v.mark_stopping();
        assert_eq!(v.state(), VoiceState::Stopping);
        v.mark_playing();
        assert_eq!(v.state(), VoiceState::Stopping);
        v.mark_destroyed();
        assert_eq!(v.state(), VoiceState::Destroyed);
    }

    #[test]
    fn test_playback_position() {
        let one_shot = voice(1.0, PlaybackStart::Delayed(1.0), false);
        assert_eq!(one_shot.started_at(), 2.0);
        assert_eq!(one_shot.playback_position(1.5, 4.0), 0.0);
        assert_eq!(one_shot.playback_position(3.0, 4.0), 1.0);
        assert_eq!(one_shot.playback_position(10.0, 4.0), 4.0);

        let looped = voice(0.0, PlaybackStart::Immediate, true);
        assert_eq!(looped.playback_position(5.0, 4.0), 1.0);
        assert_eq!(looped.playback_position(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_lifetime_without_play_time() {
        let entry = SoundEntryDesc::new("a").play_delay(0.5);
        assert_eq!(PlayRequest::configured().lifetime(&entry, 2.0), Some(2.5));
        assert_eq!(PlayRequest::instant().lifetime(&entry, 2.0), Some(2.0));
        assert_eq!(PlayRequest::delayed(1.0).lifetime(&entry, 2.0), Some(3.0));

        let limited = SoundEntryDesc::new("a").play_time(0.75);
        assert_eq!(PlayRequest::configured().lifetime(&limited, 2.0), Some(0.75));

        let looping = SoundEntryDesc::new("a").looping(true);
        assert_eq!(PlayRequest::configured().lifetime(&looping, 2.0), None);
    }

    #[test]
    fn test_lifetime_with_play_time() {
        let entry = SoundEntryDesc::new("a").play_delay(0.5).looping(true);
        let request = PlayRequest::configured().with_play_time(1.0);
        assert_eq!(request.lifetime(&entry, 2.0), Some(1.5));

        let long = PlayRequest::delayed(1.0).with_play_time(10.0);
        assert_eq!(long.lifetime(&entry, 2.0), Some(3.0));

        let instant = PlayRequest::instant().with_play_time(0.25);
        assert_eq!(instant.lifetime(&entry, 2.0), Some(0.25));
    }

    #[test]
    fn test_playback_start() {
        let immediate = SoundEntryDesc::new("a");
        let delayed = SoundEntryDesc::new("a").play_delay(0.3);

        assert_eq!(
            PlayRequest::configured().playback_start(&immediate),
            PlaybackStart::Immediate
        );
        assert_eq!(
            PlayRequest::configured().playback_start(&delayed),
            PlaybackStart::Delayed(0.3)
        );
        assert_eq!(
            PlayRequest::instant().playback_start(&delayed),
            PlaybackStart::Immediate
        );
        assert_eq!(
            PlayRequest::delayed(0.0).playback_start(&immediate),
            PlaybackStart::Delayed(0.0)
        );
    }
}
