// Stopped -play-> Playing -pause-> Paused -play-> Playing; stop or finish -> Stopped.
// every play builds a new session on the sink, nothing resumes in place

use std::sync::Arc;

use tracing::{debug, info};

use crate::audio::{EffectParams, SampleBuffer};

// What the sink needs to build a fresh graph and start playing.
#[derive(Clone, Debug)]
pub struct Session {
    pub buffer: Arc<SampleBuffer>,
    pub offset_secs: f64,
    pub effects: EffectParams,
}

// Where sessions actually play. `start` must dispose of any previous session
// before the new one makes sound, and `halt` must be harmless when idle.
pub trait AudioSink {
    fn start(&mut self, session: Session);
    fn halt(&mut self);
    fn set_params(&mut self, effects: EffectParams);

    // Most recent window of output samples for analysis, if any.
    fn latest_analysis(&mut self) -> Option<Vec<f32>> {
        None
    }
}

pub trait Clock {
    fn now(&self) -> f64;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Playing,
    Paused,
}

impl TransportState {
    pub fn label(self) -> &'static str {
        match self {
            TransportState::Stopped => "STOPPED",
            TransportState::Playing => "PLAYING",
            TransportState::Paused => "PAUSED",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    pub transport: TransportState,
    pub offset_secs: f64, // where the next play starts
    pub start_reference: f64, // clock time that maps to buffer position 0
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            transport: TransportState::Stopped,
            offset_secs: 0.0,
            start_reference: 0.0,
        }
    }
}

pub struct PlaybackController<S: AudioSink, C: Clock> {
    sink: S,
    clock: C,
    buffer: Option<Arc<SampleBuffer>>,
    effects: EffectParams,
    state: PlaybackState,
}

impl<S: AudioSink, C: Clock> PlaybackController<S, C> {
    pub fn new(sink: S, clock: C) -> Self {
        Self {
            sink,
            clock,
            buffer: None,
            effects: EffectParams::default(),
            state: PlaybackState::default(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn transport(&self) -> TransportState {
        self.state.transport
    }

    pub fn is_playing(&self) -> bool {
        self.state.transport == TransportState::Playing
    }

    pub fn buffer(&self) -> Option<&Arc<SampleBuffer>> {
        self.buffer.as_ref()
    }

    pub fn effects(&self) -> EffectParams {
        self.effects
    }

    pub fn duration_secs(&self) -> f64 {
        self.buffer.as_ref().map_or(0.0, |b| b.duration_secs())
    }

    // A new buffer arrived: whatever was playing stops and the offset resets.
    pub fn load(&mut self, buffer: Arc<SampleBuffer>) {
        self.stop();
        info!(
            frames = buffer.frames(),
            duration = buffer.duration_secs(),
            "buffer loaded"
        );
        self.buffer = Some(buffer);
    }

    pub fn play(&mut self) {
        if self.is_playing() {
            return;
        }
        let Some(buffer) = self.buffer.clone() else {
            return;
        };
        let duration = buffer.duration_secs();
        let offset = if duration > 0.0 {
            self.state.offset_secs % duration
        } else {
            0.0
        };

        // never two sessions at once
        self.sink.halt();
        self.sink.start(Session {
            buffer,
            offset_secs: offset,
            effects: self.effects,
        });

        self.state.start_reference = self.clock.now() - offset;
        self.state.offset_secs = offset;
        self.state.transport = TransportState::Playing;
        debug!(offset, "transport -> playing");
    }

    pub fn pause(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.sink.halt();
        self.state.offset_secs = self.clock.now() - self.state.start_reference;
        self.state.transport = TransportState::Paused;
        debug!(offset = self.state.offset_secs, "transport -> paused");
    }

    // Halt unconditionally. Safe to call any number of times.
    pub fn stop(&mut self) {
        self.sink.halt();
        self.state.offset_secs = 0.0;
        self.state.transport = TransportState::Stopped;
    }

    pub fn toggle(&mut self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn set_effects(&mut self, effects: EffectParams) {
        self.effects = effects;
        if self.is_playing() {
            self.sink.set_params(effects);
        }
    }

    // Seconds since the session's position 0, including any echo tail.
    pub fn elapsed_secs(&self) -> f64 {
        match self.state.transport {
            TransportState::Playing => self.clock.now() - self.state.start_reference,
            _ => self.state.offset_secs,
        }
    }

    // Playhead for display, capped at the buffer length.
    pub fn position_secs(&self) -> f64 {
        self.elapsed_secs().clamp(0.0, self.duration_secs())
    }

    // Check for completion. Playback only counts as finished once the echo
    // tail has had time to ring out. Returns true on the tick that stops.
    pub fn tick(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        let end = self.duration_secs() + self.effects.echo_tail_secs();
        if self.elapsed_secs() >= end {
            self.stop();
            debug!("playback finished");
            return true;
        }
        false
    }
}
