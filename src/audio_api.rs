use std::sync::Arc;

pub use crate::audio::{EffectParams, EffectsGraph, SampleBuffer};

// a session ready to play: buffer at the device rate, graph already built
pub struct SessionParams {
    pub buffer: Arc<SampleBuffer>,
    pub start_frame: usize,
    pub graph: Box<EffectsGraph>,
}

pub enum AudioCommand {
    // The engine can't resample or allocate big buffers on the audio thread, so
    // the buffer and graph arrive ready to play. Any running session is retired
    // first.
    Start(SessionParams),

    // Retire the current session (voice + graph). Fine to send when idle.
    Halt,

    // Retarget the live graph's knobs; they glide there.
    SetParams(EffectParams),
}
