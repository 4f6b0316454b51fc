// export trigger: offline render -> encode -> one timestamped file

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::audio::{render_offline, EffectParams, SampleBuffer};
use crate::encode::{self, EncodedAudio, ExportFormat};
use crate::error::{RenderError, Result};

const FILE_PREFIX: &str = "voxtty_render_";

#[derive(Clone, Debug)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub format: ExportFormat, // may be Wav even if Mp3 was asked for
    pub bytes: usize,
    pub frames: usize,
}

// The buffer that actually gets encoded. With both knobs at zero the graph
// is a no-op, so the source is used as-is.
pub fn render_for_export(
    buffer: &SampleBuffer,
    effects: EffectParams,
) -> std::result::Result<Cow<'_, SampleBuffer>, RenderError> {
    if effects.is_neutral() {
        if buffer.frames() == 0 {
            return Err(RenderError::EmptyOutput);
        }
        return Ok(Cow::Borrowed(buffer));
    }
    render_offline(buffer, effects).map(Cow::Owned)
}

pub fn export_audio(
    buffer: &SampleBuffer,
    effects: EffectParams,
    format: ExportFormat,
) -> Result<(EncodedAudio, usize)> {
    let rendered = render_for_export(buffer, effects)?;
    let encoded = encode::encode(&rendered, format)?;
    Ok((encoded, rendered.frames()))
}

pub fn export_file_name(format: ExportFormat, unix_millis: u128) -> String {
    format!("{FILE_PREFIX}{unix_millis}.{}", format.extension())
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

// Render, encode and write into `dir`. Nothing touches the disk unless the
// render and encode both succeed.
pub fn export_to_dir(
    buffer: &SampleBuffer,
    effects: EffectParams,
    format: ExportFormat,
    dir: &Path,
) -> Result<ExportOutcome> {
    let (encoded, frames) = export_audio(buffer, effects, format)?;

    std::fs::create_dir_all(dir)?;
    // the name follows what was produced, so a WAV fallback is a .wav
    let path = dir.join(export_file_name(encoded.format, now_millis()));
    std::fs::write(&path, &encoded.bytes)?;

    info!(
        path = %path.display(),
        mime = encoded.mime(),
        bytes = encoded.bytes.len(),
        "exported"
    );
    Ok(ExportOutcome {
        path,
        format: encoded.format,
        bytes: encoded.bytes.len(),
        frames,
    })
}
