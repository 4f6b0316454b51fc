use thiserror::Error;

// Failures turning the speech service payload into samples.
#[derive(Error, Debug)]
pub enum DecodeError {
    // Payload is not valid base64
    #[error("malformed base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    // Byte count does not divide into whole frames
    #[error("PCM payload of {len} bytes is not a multiple of the {frame_bytes}-byte frame width")]
    Misaligned { len: usize, frame_bytes: usize },

    // Declared format can't describe a buffer (zero rate, zero channels, ...)
    #[error("invalid PCM format: {0}")]
    InvalidFormat(String),
}

// Failures of the offline render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render produced no output frames")]
    EmptyOutput,

    #[error("unsupported sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("channel arrays have mismatched lengths")]
    ChannelMismatch,
}

// Failures of the container encoders.
#[derive(Error, Debug)]
pub enum EncodeError {
    // No MP3 backend could be set up; callers fall back to WAV
    #[error("MP3 encoder unavailable: {0}")]
    EncoderUnavailable(String),

    #[error("MP3 encoding failed: {0}")]
    Mp3(String),

    // More data than a RIFF chunk size can describe
    #[error("buffer too large for a WAV container")]
    TooLarge,
}

// Anything that can go wrong between an input file and an exported file.
#[derive(Error, Debug)]
pub enum StudioError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("invalid sample buffer: {0}")]
    InvalidBuffer(String),

    #[error("response JSON has no inline audio data")]
    MissingAudio,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Wav(#[from] hound::Error),
}

pub type Result<T> = std::result::Result<T, StudioError>;
