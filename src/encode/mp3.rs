use std::mem::MaybeUninit;

use mp3lame_encoder::{
    max_required_buffer_size, Bitrate, Builder, DualPcm, FlushNoGap, MonoPcm, Quality,
};
use tracing::{debug, warn};

use crate::audio::SampleBuffer;
use crate::error::EncodeError;
use crate::shared::{MP3_BITRATE_KBPS, MP3_BLOCK_SAMPLES};

use super::{to_i16, wav::encode_wav, EncodedAudio, ExportFormat};

// anything that turns 16-bit PCM blocks into MP3 frames
pub trait Mp3Backend {
    fn begin(&mut self, sample_rate: u32, channels: u16) -> Result<(), EncodeError>;

    // `right` is `Some` for joint stereo.
    fn encode_block(&mut self, left: &[i16], right: Option<&[i16]>) -> Result<Vec<u8>, EncodeError>;

    fn flush(&mut self) -> Result<Vec<u8>, EncodeError>;
}

// LAME, statically linked
#[derive(Default)]
pub struct LameBackend {
    encoder: Option<mp3lame_encoder::Encoder>,
    upsample: usize,
}

impl LameBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

// highest rate LAME may pick for its output
const LAME_MAX_OUT_RATE: usize = 48_000;

fn lame_error(e: impl std::fmt::Debug) -> EncodeError {
    EncodeError::Mp3(format!("{e:?}"))
}

// 1.25 * num_samples + 7200 bytes, counted at the output rate: low input
// rates get resampled up before encoding
fn output_capacity(samples: usize, upsample: usize) -> usize {
    max_required_buffer_size(samples * upsample.max(1))
}

fn upsample_ratio(sample_rate: u32) -> usize {
    LAME_MAX_OUT_RATE.div_ceil(sample_rate.max(1) as usize).max(1)
}

fn configure(builder: &mut Builder, sample_rate: u32, channels: u8) -> Result<(), EncodeError> {
    builder.set_num_channels(channels).map_err(lame_error)?;
    builder.set_sample_rate(sample_rate).map_err(lame_error)?;
    builder.set_brate(Bitrate::Kbps128).map_err(lame_error)?;
    builder.set_quality(Quality::Good).map_err(lame_error)?;
    Ok(())
}

impl Mp3Backend for LameBackend {
    fn begin(&mut self, sample_rate: u32, channels: u16) -> Result<(), EncodeError> {
        // only a missing encoder counts as unavailable, bad settings are errors
        let mut builder = Builder::new()
            .ok_or_else(|| EncodeError::EncoderUnavailable("failed to allocate LAME".into()))?;
        configure(&mut builder, sample_rate, channels.min(2) as u8)?;
        self.encoder = Some(builder.build().map_err(lame_error)?);
        self.upsample = upsample_ratio(sample_rate);
        Ok(())
    }

    fn encode_block(&mut self, left: &[i16], right: Option<&[i16]>) -> Result<Vec<u8>, EncodeError> {
        let upsample = self.upsample;
        let encoder = self
            .encoder
            .as_mut()
            .ok_or_else(|| EncodeError::Mp3("encode before begin".into()))?;

        let mut out: Vec<u8> = Vec::with_capacity(output_capacity(left.len(), upsample));
        let written = match right {
            Some(right) => encoder.encode(DualPcm { left, right }, out.spare_capacity_mut()),
            None => encoder.encode(MonoPcm(left), out.spare_capacity_mut()),
        }
        .map_err(lame_error)?;

        // SAFETY: LAME wrote exactly `written` bytes into the spare capacity.
        unsafe {
            out.set_len(written);
        }
        Ok(out)
    }

    fn flush(&mut self) -> Result<Vec<u8>, EncodeError> {
        let upsample = self.upsample;
        let Some(encoder) = self.encoder.as_mut() else {
            return Ok(Vec::new());
        };
        let mut out: Vec<u8> = Vec::with_capacity(output_capacity(MP3_BLOCK_SAMPLES, upsample));
        let spare: &mut [MaybeUninit<u8>] = out.spare_capacity_mut();
        let written = encoder
            .flush::<FlushNoGap>(spare)
            .map_err(lame_error)?;

        // SAFETY: as above.
        unsafe {
            out.set_len(written);
        }
        self.encoder = None;
        Ok(out)
    }
}

pub fn encode_mp3(buffer: &SampleBuffer) -> Result<EncodedAudio, EncodeError> {
    let mut lame = LameBackend::new();
    encode_mp3_with(buffer, Some(&mut lame))
}

// Feed `buffer` through `backend` in 1152-sample blocks and append the flush.
// Without a usable backend the result is a WAV instead of an error.
pub fn encode_mp3_with(
    buffer: &SampleBuffer,
    backend: Option<&mut dyn Mp3Backend>,
) -> Result<EncodedAudio, EncodeError> {
    let Some(backend) = backend else {
        warn!("no MP3 backend, falling back to WAV");
        return wav_fallback(buffer);
    };

    match backend.begin(buffer.sample_rate(), buffer.num_channels()) {
        Ok(()) => {}
        Err(EncodeError::EncoderUnavailable(reason)) => {
            warn!(%reason, "MP3 backend unavailable, falling back to WAV");
            return wav_fallback(buffer);
        }
        Err(e) => return Err(e),
    }

    let left: Vec<i16> = buffer.channel(0).iter().copied().map(to_i16).collect();
    // more than two channels: only the front pair is kept
    let right: Option<Vec<i16>> = (buffer.num_channels() >= 2)
        .then(|| buffer.channel(1).iter().copied().map(to_i16).collect());

    let mut bytes = Vec::new();
    let mut blocks = 0usize;
    for (i, left_block) in left.chunks(MP3_BLOCK_SAMPLES).enumerate() {
        let right_block = right.as_ref().map(|r| {
            let start = i * MP3_BLOCK_SAMPLES;
            &r[start..start + left_block.len()]
        });
        bytes.extend(backend.encode_block(left_block, right_block)?);
        blocks += 1;
    }
    bytes.extend(backend.flush()?);

    debug!(
        blocks,
        bytes = bytes.len(),
        kbps = MP3_BITRATE_KBPS,
        "mp3 encoded"
    );
    Ok(EncodedAudio {
        bytes,
        format: ExportFormat::Mp3,
    })
}

fn wav_fallback(buffer: &SampleBuffer) -> Result<EncodedAudio, EncodeError> {
    Ok(EncodedAudio {
        bytes: encode_wav(buffer)?,
        format: ExportFormat::Wav,
    })
}
