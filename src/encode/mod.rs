use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::audio::SampleBuffer;
use crate::error::EncodeError;

pub mod mp3;
pub mod wav;

pub use mp3::{encode_mp3, encode_mp3_with, LameBackend, Mp3Backend};
pub use wav::encode_wav;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Mp3,
    Wav,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Mp3 => "mp3",
            ExportFormat::Wav => "wav",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Mp3 => "audio/mpeg",
            ExportFormat::Wav => "audio/wav",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mp3" => Ok(ExportFormat::Mp3),
            "wav" => Ok(ExportFormat::Wav),
            other => Err(format!("unknown format '{other}' (expected mp3 or wav)")),
        }
    }
}

// Finished file contents. `format` says what the bytes actually are, which
// can differ from what was asked for when MP3 falls back to WAV.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedAudio {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
}

impl EncodedAudio {
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }
}

pub fn encode(buffer: &SampleBuffer, format: ExportFormat) -> Result<EncodedAudio, EncodeError> {
    match format {
        ExportFormat::Mp3 => encode_mp3(buffer),
        ExportFormat::Wav => Ok(EncodedAudio {
            bytes: encode_wav(buffer)?,
            format: ExportFormat::Wav,
        }),
    }
}

// Clamp to [-1, 1], then scale negatives by 32768 and the rest by 32767 so
// -1.0 lands on i16::MIN without overflowing the positive side. Truncates.
pub fn to_i16(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asymmetric_scaling() {
        assert_eq!(to_i16(-1.0), i16::MIN);
        assert_eq!(to_i16(1.0), i16::MAX);
        assert_eq!(to_i16(0.0), 0);
        assert_eq!(to_i16(-0.5), -16384);
        assert_eq!(to_i16(0.5), 16383); // 16383.5 truncates
        assert_eq!(to_i16(-0.00001), 0);
    }

    #[test]
    fn format_names() {
        assert_eq!("MP3".parse::<ExportFormat>().unwrap(), ExportFormat::Mp3);
        assert_eq!("wav".parse::<ExportFormat>().unwrap(), ExportFormat::Wav);
        assert!("ogg".parse::<ExportFormat>().is_err());
        assert_eq!(serde_json::to_string(&ExportFormat::Wav).unwrap(), "\"wav\"");
    }

    #[test]
    fn wav_request_is_wav() {
        let buffer = SampleBuffer::silent(24_000, 1, 4).unwrap();
        let encoded = encode(&buffer, ExportFormat::Wav).unwrap();
        assert_eq!(encoded.mime(), "audio/wav");
        assert_eq!(encoded.bytes.len(), 52);
    }
}
