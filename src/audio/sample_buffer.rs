use std::path::Path;

use crate::error::{Result, StudioError};

// Planar, normalized audio tagged with its sample rate.
// Every channel holds the same number of frames; the constructors enforce it,
// so the fields stay private.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>, // one Vec per channel, all the same length
}

impl SampleBuffer {
    pub fn from_channels(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(StudioError::InvalidBuffer("sample rate must be non-zero".into()));
        }
        if channels.is_empty() {
            return Err(StudioError::InvalidBuffer("at least one channel is required".into()));
        }
        let frames = channels[0].len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(StudioError::InvalidBuffer("channels differ in length".into()));
        }
        Ok(Self { sample_rate, channels })
    }

    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self> {
        Self::from_channels(sample_rate, vec![samples])
    }

    pub fn silent(sample_rate: u32, num_channels: u16, frames: usize) -> Result<Self> {
        Self::from_channels(sample_rate, vec![vec![0.0; frames]; num_channels as usize])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> u16 {
        self.channels.len() as u16
    }

    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    // Load a WAV file from disk, keeping its native rate and channel layout
    pub fn load_wav(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path)?;
        Self::from_wav_reader(reader)
    }

    pub fn from_wav_reader<R: std::io::Read>(mut reader: hound::WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        let num_channels = spec.channels.max(1) as usize;

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader // float, just pass it through
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => { // int, convert to float
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        // de-interleave
        let frames = samples.len() / num_channels;
        let mut channels = vec![Vec::with_capacity(frames); num_channels];
        for frame in samples.chunks_exact(num_channels) {
            for (ch, &s) in frame.iter().enumerate() {
                channels[ch].push(s);
            }
        }

        Self::from_channels(spec.sample_rate, channels)
    }

    // Linear-interpolated copy at `target_rate`. Only used to match an output
    // device; the decoder never resamples.
    pub fn resampled(&self, target_rate: u32) -> Self {
        if target_rate == self.sample_rate || target_rate == 0 {
            return self.clone();
        }
        let channels = self
            .channels
            .iter()
            .map(|c| resample_linear(c, self.sample_rate, target_rate))
            .collect();
        Self { sample_rate: target_rate, channels }
    }
}

fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        // fractional position in the source buffer
        let src_pos = i as f64 / ratio; // ex. 3.7
        let idx = src_pos.floor() as usize; // ex. 3
        let frac = (src_pos - idx as f64) as f32; // ex. 0.7
        if idx >= samples.len().saturating_sub(1) { // edge case
            out.push(samples.last().copied().unwrap_or(0.0));
        } else {
            let a = samples[idx];
            let b = samples[idx + 1];
            out.push(a * (1.0 - frac) + b * frac); // blend via frac
        }
    }
    out
}
