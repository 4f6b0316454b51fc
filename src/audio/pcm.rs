// speech service payload: little-endian i16 PCM, 24 kHz mono unless told
// otherwise. no resampling or remixing here

use base64::Engine;
use tracing::debug;

use crate::error::DecodeError;
use crate::shared::{DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};

use super::sample_buffer::SampleBuffer;

const BYTES_PER_SAMPLE: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
        }
    }
}

impl PcmFormat {
    pub fn frame_bytes(&self) -> usize {
        self.channels as usize * BYTES_PER_SAMPLE
    }
}

// int16 / 32768; takes a data-url prefix and stray whitespace, never
// returns a partial buffer
pub fn decode_base64_pcm(data: &str, format: PcmFormat) -> Result<SampleBuffer, DecodeError> {
    let data = data.trim_start();
    let payload = if data.starts_with("data:") {
        data.split_once(',').map(|(_, b64)| b64).unwrap_or(data)
    } else {
        data
    };
    let normalized: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(normalized.as_bytes())?;
    decode_pcm_bytes(&bytes, format)
}

pub fn decode_pcm_bytes(bytes: &[u8], format: PcmFormat) -> Result<SampleBuffer, DecodeError> {
    if format.sample_rate == 0 {
        return Err(DecodeError::InvalidFormat("sample rate must be non-zero".into()));
    }
    if format.channels == 0 {
        return Err(DecodeError::InvalidFormat("channel count must be non-zero".into()));
    }
    let frame_bytes = format.frame_bytes();
    if bytes.len() % frame_bytes != 0 {
        return Err(DecodeError::Misaligned {
            len: bytes.len(),
            frame_bytes,
        });
    }

    let num_channels = format.channels as usize;
    let frames = bytes.len() / frame_bytes;
    let mut channels = vec![Vec::with_capacity(frames); num_channels];
    for (i, pair) in bytes.chunks_exact(BYTES_PER_SAMPLE).enumerate() {
        let sample = i16::from_le_bytes([pair[0], pair[1]]);
        channels[i % num_channels].push(sample as f32 / 32768.0);
    }

    debug!(
        frames,
        channels = num_channels,
        sample_rate = format.sample_rate,
        "decoded PCM payload"
    );

    SampleBuffer::from_channels(format.sample_rate, channels)
        .map_err(|e| DecodeError::InvalidFormat(e.to_string()))
}
