// what the studio remembers between runs

use std::path::PathBuf;

use serde::{Deserialize, Serialize}; // serde does json

use crate::audio::{EffectParams, PcmFormat};
use crate::encode::ExportFormat;
use crate::shared::{DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)] // older files missing a field still load
pub struct StudioSettings {
    pub bass_boost: u8,
    pub echo: u8,
    pub export_format: ExportFormat,

    // how to read raw PCM input; the speech service sends 24 kHz mono
    pub sample_rate: u32,
    pub channels: u16,

    // None = the project directory
    pub export_dir: Option<PathBuf>,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            bass_boost: 0,
            echo: 0,
            export_format: ExportFormat::Mp3,
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            export_dir: None,
        }
    }
}

impl StudioSettings {
    pub fn effects(&self) -> EffectParams {
        EffectParams::new(self.bass_boost, self.echo).clamped()
    }

    pub fn set_effects(&mut self, effects: EffectParams) {
        let effects = effects.clamped();
        self.bass_boost = effects.bass_boost;
        self.echo = effects.echo;
    }

    pub fn pcm_format(&self) -> PcmFormat {
        PcmFormat {
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}
