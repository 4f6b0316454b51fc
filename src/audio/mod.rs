use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, info};

use crate::audio_api::{AudioCommand, SessionParams};
use crate::playback::{AudioSink, Clock, Session};

pub mod analyser;
pub mod effect;
pub mod engine;
pub mod graph;
pub mod offline;
pub mod pcm;
pub mod sample_buffer;
pub mod voice;

pub use analyser::Analyser;
pub use effect::EffectParams;
pub use graph::{AnalysisWindow, EffectsGraph};
pub use offline::render_offline;
pub use pcm::{decode_base64_pcm, PcmFormat};
pub use sample_buffer::SampleBuffer;

use engine::{Engine, LiveSession, MAX_CHANNELS};

// ui side of the output stream; dropping it closes the stream
pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    analysis_rx: Receiver<AnalysisWindow>,
    retired_rx: Receiver<LiveSession>,
    sample_rate: u32,
    frames_rendered: Arc<AtomicU64>,
    _output_stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.tx.try_send(cmd);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    // driven by the device's own frame counter
    pub fn clock(&self) -> DeviceClock {
        DeviceClock {
            frames: Arc::clone(&self.frames_rendered),
            sample_rate: self.sample_rate,
        }
    }

    // newest window, older ones still queued are skipped
    pub fn latest_analysis(&self) -> Option<AnalysisWindow> {
        self.analysis_rx.try_iter().last()
    }

    // sessions the engine let go of are freed here, off the audio thread
    fn drop_retired(&self) {
        let retired = self.retired_rx.try_iter().count();
        if retired > 0 {
            debug!(retired, "dropped finished sessions");
        }
    }
}

impl AudioSink for AudioHandle {
    fn start(&mut self, session: Session) {
        // resampling happens here, off the audio thread
        let buffer = if session.buffer.sample_rate() == self.sample_rate {
            session.buffer
        } else {
            Arc::new(session.buffer.resampled(self.sample_rate))
        };
        let start_frame = (session.offset_secs * self.sample_rate as f64).round() as usize;
        let channels = (buffer.num_channels() as usize).clamp(1, MAX_CHANNELS);
        // delay line and tap are allocated here, never in the callback
        let graph = Box::new(EffectsGraph::live(session.effects, self.sample_rate, channels));
        debug!(start_frame, rate = self.sample_rate, "starting live session");
        self.drop_retired();
        self.send(AudioCommand::Start(SessionParams {
            buffer,
            start_frame,
            graph,
        }));
    }

    fn halt(&mut self) {
        self.send(AudioCommand::Halt);
        self.drop_retired();
    }

    fn set_params(&mut self, effects: EffectParams) {
        self.send(AudioCommand::SetParams(effects));
    }

    fn latest_analysis(&mut self) -> Option<Vec<f32>> {
        self.drop_retired();
        AudioHandle::latest_analysis(self).map(|window| window.to_vec())
    }
}

// seconds elapsed on the output device, like an audio context's current time
#[derive(Clone, Debug)]
pub struct DeviceClock {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl Clock for DeviceClock {
    fn now(&self) -> f64 {
        self.frames.load(Ordering::Relaxed) as f64 / self.sample_rate as f64
    }
}

pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);
    let (analysis_tx, analysis_rx) = crossbeam_channel::bounded::<AnalysisWindow>(8);
    let (retired_tx, retired_rx) = crossbeam_channel::bounded::<LiveSession>(64);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate: u32 = config.sample_rate();
    let channels = config.channels() as usize;
    let frames_rendered = Arc::new(AtomicU64::new(0));

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream = build_output_stream_f32(
                &device,
                &config.into(),
                rx,
                analysis_tx,
                retired_tx,
                Arc::clone(&frames_rendered),
                channels,
            )?;
            output_stream.play().context("failed to play output stream")?;
            info!(sample_rate, channels, "audio output started");

            Ok(AudioHandle {
                tx,
                analysis_rx,
                retired_rx,
                sample_rate,
                frames_rendered,
                _output_stream: output_stream,
            })
        }
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    }
}

// ── Output stream ─────────────────────────────────────────────────

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    analysis_tx: Sender<AnalysisWindow>,
    retired_tx: Sender<LiveSession>,
    frames_rendered: Arc<AtomicU64>,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new();
    engine.set_analysis_tx(analysis_tx);
    engine.set_retired_tx(retired_tx);

    let err_fn = |err| error!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() { // set up command handling
                engine.handle_cmd(cmd);
            }
            engine.render_block(data, channels);
            frames_rendered.fetch_add((data.len() / channels.max(1)) as u64, Ordering::Relaxed);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
