use crate::audio_data::AudioClip;
use crate::curve::ResponseCurve;
use crate::error::{AudioNestError, Result};

/// Upper bound shared by every distance, delay and loudness field.
const MAX_MAGNITUDE: f32 = u16::MAX as f32;

/// Mixer group an entry's voices are routed into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputRoute {
    name: String,
}

impl OutputRoute {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Settings that decide how loud a playing entry counts for detection.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSettings {
    /// Loudness magnitude the response curve is scaled by
    pub loudness: f32,
    /// Distance at which the loudness response begins
    pub inner_radius: f32,
    /// Distance at which the loudness response ends
    pub outer_radius: f32,
    /// Report silence closer than `inner_radius`
    pub cut_on_min: bool,
    /// Report silence farther than `outer_radius`
    pub cut_on_max: bool,
    /// Loudness response over the normalized distance
    pub response: ResponseCurve,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            loudness: 100.0,
            inner_radius: 0.0,
            outer_radius: 10.0,
            cut_on_min: false,
            cut_on_max: true,
            response: ResponseCurve::falloff(),
        }
    }
}

/// 3D rolloff settings handed to the voice backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Rolloff3D {
    pub inner_radius: f32,
    pub outer_radius: f32,
    /// Doppler strength, 0 disables it
    pub doppler_level: f32,
    /// Spread angle in degrees
    pub spread: f32,
    /// Volume response over `distance / outer_radius`
    pub volume_response: ResponseCurve,
}

impl Default for Rolloff3D {
    fn default() -> Self {
        Self {
            inner_radius: 0.0,
            outer_radius: 10.0,
            doppler_level: 1.0,
            spread: 360.0,
            volume_response: ResponseCurve::falloff(),
        }
    }
}

impl Rolloff3D {
    /// Custom-rolloff volume factor at `distance` from the listener.
    ///
    /// Full volume inside the inner radius, otherwise the volume response evaluated at
    /// `distance / outer_radius` clamped to `[0, 1]`.
    pub fn attenuation(&self, distance: f32) -> f32 {
        if distance <= self.inner_radius {
            return 1.0;
        }
        if self.outer_radius <= 0.0 {
            return self.volume_response.evaluate(1.0);
        }
        self.volume_response
            .evaluate((distance / self.outer_radius).clamp(0.0, 1.0))
    }
}

/// Immutable playback and detection profile for one named sound.
#[derive(Debug, Clone)]
pub struct SoundEntryDesc {
    pub name: String,
    pub output: Option<OutputRoute>,
    pub clip: Option<AudioClip>,
    pub looping: bool,
    pub mute: bool,
    /// Delay in seconds applied by the configured play form
    pub play_delay: f32,
    /// Playback time limit in seconds, 0 plays the whole clip
    pub play_time: f32,
    pub reverb_zone_mix: f32,
    pub pitch: f32,
    pub volume: f32,
    /// 0 is fully 2D, 1 is fully 3D
    pub spatial_blend: f32,
    pub detection: DetectionSettings,
    pub rolloff: Rolloff3D,
}

impl Default for SoundEntryDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            output: None,
            clip: None,
            looping: false,
            mute: false,
            play_delay: 0.0,
            play_time: 0.0,
            reverb_zone_mix: 1.0,
            pitch: 1.0,
            volume: 1.0,
            spatial_blend: 0.0,
            detection: DetectionSettings::default(),
            rolloff: Rolloff3D::default(),
        }
    }
}

impl SoundEntryDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn clip(mut self, clip: AudioClip) -> Self {
        self.clip = Some(clip);
        self
    }

    pub fn output(mut self, output: OutputRoute) -> Self {
        self.output = Some(output);
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn mute(mut self, mute: bool) -> Self {
        self.mute = mute;
        self
    }

    pub fn play_delay(mut self, seconds: f32) -> Self {
        self.play_delay = seconds;
        self
    }

    pub fn play_time(mut self, seconds: f32) -> Self {
        self.play_time = seconds;
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn spatial_blend(mut self, blend: f32) -> Self {
        self.spatial_blend = blend;
        self
    }

    pub fn detection(mut self, detection: DetectionSettings) -> Self {
        self.detection = detection;
        self
    }

    pub fn rolloff(mut self, rolloff: Rolloff3D) -> Self {
        self.rolloff = rolloff;
        self
    }

    /// Clip length in seconds, 0 when no clip is assigned.
    pub fn clip_length(&self) -> f32 {
        self.clip.as_ref().map(AudioClip::length).unwrap_or(0.0)
    }

    /// Validates that every field is within its editable range.
    pub fn validate(&self) -> Result<()> {
        let checks: [(&str, f32, f32, f32); 14] = [
            ("volume", self.volume, 0.0, 1.0),
            ("pitch", self.pitch, -3.0, 3.0),
            ("spatial_blend", self.spatial_blend, 0.0, 1.0),
            ("reverb_zone_mix", self.reverb_zone_mix, 0.0, 1.1),
            ("play_delay", self.play_delay, 0.0, MAX_MAGNITUDE),
            ("play_time", self.play_time, 0.0, MAX_MAGNITUDE),
            ("rolloff.doppler_level", self.rolloff.doppler_level, 0.0, 5.0),
            ("rolloff.spread", self.rolloff.spread, 0.0, 360.0),
            ("rolloff.inner_radius", self.rolloff.inner_radius, 0.0, MAX_MAGNITUDE),
            ("rolloff.outer_radius", self.rolloff.outer_radius, 0.0, MAX_MAGNITUDE),
            ("detection.loudness", self.detection.loudness, 0.0, MAX_MAGNITUDE),
            ("detection.inner_radius", self.detection.inner_radius, 0.0, MAX_MAGNITUDE),
            ("detection.outer_radius", self.detection.outer_radius, 0.0, MAX_MAGNITUDE),
            ("clip_length", self.clip_length(), 0.0, f32::MAX),
        ];

        for (field, value, min, max) in checks {
            if !(min..=max).contains(&value) {
                return Err(AudioNestError::Configuration(format!(
                    "Entry '{}': {} = {} is outside [{}, {}]",
                    self.name, field, value, min, max
                )));
            }
        }

        Ok(())
    }
}
