//! PCM framing for the realtime triage stream.
//!
//! Microphone frames travel as base64 16-bit little-endian PCM at 16 kHz;
//! model audio comes back in the same encoding (24 kHz by default). These
//! helpers convert between that wire form and float samples.
//!
//! Nothing on the server side calls them: the text socket does not proxy
//! audio. Voice clients use them together with
//! [`PlaybackScheduler`](super::playback::PlaybackScheduler).

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

/// Sample rate expected for microphone input.
pub const INPUT_SAMPLE_RATE: u32 = 16_000;
/// Sample rate of audio returned by the model.
pub const OUTPUT_SAMPLE_RATE: u32 = 24_000;

/// Base64 PCM payload ready to be sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBlob {
    pub data: String,
    pub mime_type: String,
}

/// Decoded audio, interleaved when `channels > 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }

    /// Playback length in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Failures while decoding a PCM payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioDecodeError {
    #[error("audio payload is not valid base64: {0}")]
    Base64(String),
    #[error("PCM16 payload has an odd number of bytes ({0})")]
    OddLength(usize),
    #[error("sample rate and channel count must be non-zero")]
    InvalidFormat,
}

/// Encode float samples in `[-1, 1]` as base64 PCM16 at the input rate.
///
/// Out-of-range samples are clamped.
///
/// # Examples
/// ```
/// use telesaude::domain::audio::encode_pcm16;
///
/// let blob = encode_pcm16(&[0.0, 1.0]);
/// assert_eq!(blob.mime_type, "audio/pcm;rate=16000");
/// ```
pub fn encode_pcm16(samples: &[f32]) -> PcmBlob {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let clamped = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
        let scaled = (clamped * 32_768.0).clamp(f32::from(i16::MIN), f32::from(i16::MAX));
        let value = scaled as i16;
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    PcmBlob {
        data: BASE64_STANDARD.encode(bytes),
        mime_type: format!("audio/pcm;rate={INPUT_SAMPLE_RATE}"),
    }
}

/// Decode base64 PCM16 into float samples.
///
/// # Errors
/// Returns [`AudioDecodeError`] for bad base64, an odd byte count, or a zero
/// sample rate / channel count.
pub fn decode_pcm16(
    data: &str,
    sample_rate: u32,
    channels: u16,
) -> Result<AudioBuffer, AudioDecodeError> {
    if sample_rate == 0 || channels == 0 {
        return Err(AudioDecodeError::InvalidFormat);
    }
    let bytes = BASE64_STANDARD
        .decode(data.trim())
        .map_err(|err| AudioDecodeError::Base64(err.to_string()))?;
    if bytes.len() % 2 != 0 {
        return Err(AudioDecodeError::OddLength(bytes.len()));
    }
    let samples = bytes
        .chunks_exact(2)
        .map(|pair| match pair {
            [lo, hi] => f32::from(i16::from_le_bytes([*lo, *hi])) / 32_768.0,
            _ => 0.0,
        })
        .collect();
    Ok(AudioBuffer {
        samples,
        sample_rate,
        channels,
    })
}

/// Reduce `samples` from `from_rate` to `to_rate` by block averaging.
///
/// Upsampling is not performed: when `to_rate >= from_rate` (or either rate
/// is zero) the input is returned unchanged.
pub fn downsample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if to_rate == 0 || from_rate == 0 || to_rate >= from_rate {
        return samples.to_vec();
    }
    let ratio = f64::from(from_rate) / f64::from(to_rate);
    let out_len = (samples.len() as f64 / ratio).floor() as usize;

    (0..out_len)
        .map(|index| {
            let (start, end) = (
                (index as f64 * ratio).floor() as usize,
                (((index + 1) as f64 * ratio).floor() as usize).min(samples.len()),
            );
            let window = samples.get(start..end).unwrap_or_default();
            if window.is_empty() {
                0.0
            } else {
                let len = window.len() as f32;
                window.iter().sum::<f32>() / len
            }
        })
        .collect()
}
