use crate::{
    audio_data::AudioClip,
    error::{AudioNestError, Result},
};
use symphonia::{
    core::{
        errors::Error,
        formats::FormatOptions,
        io::{MediaSource, MediaSourceStream},
        meta::MetadataOptions,
        probe::Hint,
    },
    default::get_probe,
};

/// Probes `source` and measures the length of its default track.
///
/// The frame count from the container header is used when present, otherwise the packet
/// durations of the default track are summed.
pub(crate) fn probe_clip(
    name: String,
    source: Box<dyn MediaSource>,
    extension: Option<&str>,
) -> Result<AudioClip> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioNestError::AudioLoading(format!("Failed to probe '{}': {:?}", name, e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioNestError::AudioLoading(format!("No default track in '{}'", name)))?;

    let track_id = track.id;
    let params = track.codec_params.clone();

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| AudioNestError::AudioLoading(format!("Sample rate not found in '{}'", name)))?;
    let channels = params.channels.map(|c| c.count() as u16);

    let frames = match params.n_frames {
        Some(frames) => frames,
        None => {
            let mut total = 0u64;
            loop {
                let packet = match format.next_packet() {
                    Ok(packet) => packet,
                    Err(Error::IoError(_)) => break, // end-of-file
                    Err(Error::ResetRequired) => break,
                    Err(e) => {
                        return Err(AudioNestError::AudioLoading(format!(
                            "Error reading packet from '{}': {:?}",
                            name, e
                        )));
                    }
                };
                if packet.track_id() == track_id {
                    total += packet.dur();
                }
            }
            total
        }
    };

    let length = (frames as f64 / sample_rate as f64) as f32;
    log::debug!(
        "Probed clip '{}': {} frames at {} Hz ({:.3}s)",
        name,
        frames,
        sample_rate,
        length
    );

    Ok(AudioClip::new(name, length, Some(sample_rate), channels))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 16-bit PCM mono WAV holding `frames` frames of silence.
    fn wav_bytes(sample_rate: u32, frames: u32) -> Vec<u8> {
        let data_len = frames * 2;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.resize(44 + data_len as usize, 0);
        bytes
    }

    #[test]
    fn test_probe_wav_length() {
        let clip = AudioClip::from_bytes("silence", wav_bytes(8000, 12000), Some("wav"))
            .expect("Failed to probe wav");
        assert_eq!(clip.name(), "silence");
        assert_eq!(clip.sample_rate(), Some(8000));
        assert_eq!(clip.channels(), Some(1));
        assert!((clip.length() - 1.5).abs() < 1e-3);
    }

    #[test]
    fn test_probe_garbage_fails() {
        let result = AudioClip::from_bytes("noise", vec![7u8; 128], None);
        assert!(matches!(result, Err(AudioNestError::AudioLoading(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = AudioClip::from_path("does/not/exist.wav");
        assert!(matches!(result, Err(AudioNestError::Io(_))));
    }
}
