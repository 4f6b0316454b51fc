use crossbeam_channel::Sender;

use crate::audio_api::{AudioCommand, SessionParams};

use super::graph::{AnalysisWindow, EffectsGraph};
use super::voice::Voice;

pub const MAX_CHANNELS: usize = 8; // scratch frame size, so we wont malloc per frame

// one live playback: a voice feeding its own graph
pub struct LiveSession {
    voice: Voice,
    graph: Box<EffectsGraph>,
}

// Lives inside the output callback: drains commands, renders the current
// session and publishes analysis windows. Nothing here allocates or frees;
// finished sessions go back to the ui thread to be dropped there.
pub struct Engine {
    session: Option<LiveSession>,
    analysis_tx: Option<Sender<AnalysisWindow>>,
    retired_tx: Option<Sender<LiveSession>>,
    scratch: [f32; MAX_CHANNELS],
}

impl Engine {
    pub fn new() -> Self {
        Self {
            session: None,
            analysis_tx: None,
            retired_tx: None,
            scratch: [0.0; MAX_CHANNELS],
        }
    }

    pub fn set_analysis_tx(&mut self, tx: Sender<AnalysisWindow>) {
        self.analysis_tx = Some(tx);
    }

    pub fn set_retired_tx(&mut self, tx: Sender<LiveSession>) {
        self.retired_tx = Some(tx);
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Start(params) => self.start_session(params),
            AudioCommand::Halt => self.retire(),
            AudioCommand::SetParams(effects) => {
                if let Some(session) = self.session.as_mut() {
                    session.graph.set_params(effects);
                }
            }
        }
    }

    fn start_session(&mut self, params: SessionParams) {
        // the old voice and graph are gone before the new ones make sound
        self.retire();
        let voice = Voice::new(params.buffer, params.start_frame);
        self.session = Some(LiveSession {
            voice,
            graph: params.graph,
        });
    }

    fn retire(&mut self) {
        if let (Some(session), Some(tx)) = (self.session.take(), self.retired_tx.as_ref()) {
            // channel full: the session drops here instead
            let _ = tx.try_send(session);
        }
    }

    // Fill an interleaved device buffer with `device_channels` per frame.
    // Silence with no session. The graph keeps running after the voice ends
    // so the echo tail rings; the controller decides when it's over.
    pub fn render_block(&mut self, out: &mut [f32], device_channels: usize) {
        let Some(session) = self.session.as_mut() else {
            out.fill(0.0);
            return;
        };
        let device_channels = device_channels.max(1);
        let src_channels = session.graph.channels().clamp(1, MAX_CHANNELS);
        let frame = &mut self.scratch[..src_channels];

        for dev_frame in out.chunks_mut(device_channels) {
            session.voice.next_frame(frame);
            session.graph.process_frame(frame);
            if device_channels < src_channels {
                // fewer speakers than channels: downmix
                let mixed = frame.iter().sum::<f32>() / src_channels as f32;
                dev_frame.fill(mixed);
            } else {
                for (i, slot) in dev_frame.iter_mut().enumerate() {
                    // mono fans out to every speaker, extra device channels repeat the last one
                    *slot = frame[i.min(src_channels - 1)];
                }
            }
        }

        if let (Some(tx), Some(tap)) = (self.analysis_tx.as_ref(), session.graph.tap()) {
            let _ = tx.try_send(tap.window());
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
