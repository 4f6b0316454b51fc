use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::audio::{decode_base64_pcm, PcmFormat, SampleBuffer};
use crate::error::{Result, StudioError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Wav,
    Response, // speech service JSON with inline audio
    Base64,   // bare base64 PCM text
}

// ── speech service response ──────────────────────────────────────

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

pub fn detect_kind(path: &Path, contents: Option<&str>) -> InputKind {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
        Some(ext) if ext == "wav" => InputKind::Wav,
        Some(ext) if ext == "json" => InputKind::Response,
        _ => match contents {
            Some(text) if text.trim_start().starts_with('{') => InputKind::Response,
            _ => InputKind::Base64,
        },
    }
}

// Load an input file into a buffer. Raw PCM is read as `format`; a response
// whose MIME type names a rate (`audio/L16;rate=24000`) overrides the rate.
pub fn load(path: &Path, format: PcmFormat) -> Result<SampleBuffer> {
    let buffer = if detect_kind(path, None) == InputKind::Wav {
        SampleBuffer::load_wav(path)?
    } else {
        let text = std::fs::read_to_string(path)?;
        match detect_kind(path, Some(&text)) {
            InputKind::Response => buffer_from_response(&text, format)?,
            _ => decode_base64_pcm(&text, format)?,
        }
    };
    info!(
        path = %path.display(),
        frames = buffer.frames(),
        rate = buffer.sample_rate(),
        channels = buffer.num_channels(),
        duration = buffer.duration_secs(),
        "input loaded"
    );
    Ok(buffer)
}

// Pull the first inline audio part out of a response body and decode it.
pub fn buffer_from_response(json: &str, format: PcmFormat) -> Result<SampleBuffer> {
    let response: Response = serde_json::from_str(json)?;
    let inline = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.inline_data)
        .ok_or(StudioError::MissingAudio)?;

    let format = match inline.mime_type.as_deref().and_then(rate_from_mime) {
        Some(rate) => {
            debug!(rate, "rate taken from response mime type");
            PcmFormat {
                sample_rate: rate,
                ..format
            }
        }
        None => format,
    };
    Ok(decode_base64_pcm(&inline.data, format)?)
}

// "audio/L16;codec=pcm;rate=24000" -> 24000
fn rate_from_mime(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|p| p.trim().split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("rate"))
        .and_then(|(_, v)| v.trim().parse().ok())
        .filter(|&rate| rate > 0)
}
