pub mod audio;
pub mod audio_api;
pub mod encode;
pub mod error;
pub mod loader;
pub mod middle;
pub mod pipeline;
pub mod playback;
pub mod shared;
pub mod tui;
pub mod visualizer;

pub use audio::{decode_base64_pcm, render_offline, EffectParams, PcmFormat, SampleBuffer};
pub use encode::{encode, EncodedAudio, ExportFormat};
pub use error::{DecodeError, EncodeError, RenderError, StudioError};
pub use playback::{AudioSink, Clock, PlaybackController, Session, TransportState};
