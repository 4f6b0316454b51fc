// sits between the tui and the pipeline: turns input events into transport,
// knob and export calls, and builds the DisplayState the view draws

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use crate::audio::{EffectParams, SampleBuffer};
use crate::encode::ExportFormat;
use crate::pipeline::{export_to_dir, StudioSettings};
use crate::playback::{AudioSink, Clock, PlaybackController};
use crate::shared::{DisplayState, InputEvent, MAX_EFFECT_LEVEL, SPECTRUM_BARS};
use crate::visualizer::Visualizer;

pub struct Middle<S: AudioSink, C: Clock> {
    controller: PlaybackController<S, C>,
    visualizer: Visualizer,
    pub settings: StudioSettings,
    export_dir: PathBuf,
    pending_export: Option<ExportFormat>,
    status: String,
}

impl<S: AudioSink, C: Clock> Middle<S, C> {
    pub fn new(sink: S, clock: C, settings: StudioSettings, export_dir: PathBuf) -> Self {
        let mut controller = PlaybackController::new(sink, clock);
        controller.set_effects(settings.effects());
        Self {
            controller,
            visualizer: Visualizer::new(),
            settings,
            export_dir,
            pending_export: None,
            status: String::new(),
        }
    }

    pub fn controller(&self) -> &PlaybackController<S, C> {
        &self.controller
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_processing(&self) -> bool {
        self.pending_export.is_some()
    }

    // New audio arrived; anything playing stops.
    pub fn load(&mut self, buffer: SampleBuffer) {
        self.controller.load(Arc::new(buffer));
        self.visualizer.clear();
        self.status = "Ready".into();
    }

    // Returns false once the user asked to quit.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Play => self.controller.play(),
            InputEvent::Pause => self.controller.pause(),
            InputEvent::Stop => self.controller.stop(),

            InputEvent::BassDown => self.adjust(-1, 0),
            InputEvent::BassUp => self.adjust(1, 0),
            InputEvent::EchoDown => self.adjust(0, -1),
            InputEvent::EchoUp => self.adjust(0, 1),

            InputEvent::ExportMp3 => self.request_export(ExportFormat::Mp3),
            InputEvent::ExportWav => self.request_export(ExportFormat::Wav),

            InputEvent::Quit => return false,
        }
        true
    }

    // knobs step by one and stay inside 0..=10
    fn adjust(&mut self, bass_delta: i8, echo_delta: i8) {
        let step = |level: u8, delta: i8| {
            (level as i16 + delta as i16).clamp(0, MAX_EFFECT_LEVEL as i16) as u8
        };
        let current = self.settings.effects();
        let next = EffectParams::new(
            step(current.bass_boost, bass_delta),
            step(current.echo, echo_delta),
        );
        self.settings.set_effects(next);
        self.controller.set_effects(next);
    }

    // Queue an export. The caller redraws first so the processing state is
    // visible, then calls `run_pending_export`.
    pub fn request_export(&mut self, format: ExportFormat) {
        if self.controller.buffer().is_none() {
            self.status = "Nothing to export".into();
            return;
        }
        self.settings.export_format = format;
        self.pending_export = Some(format);
        self.status = format!("Rendering {}...", format.extension().to_uppercase());
    }

    // Run a queued export. Failures only change the status line; playback
    // is left exactly as it was.
    pub fn run_pending_export(&mut self) {
        let Some(format) = self.pending_export.take() else {
            return;
        };
        let Some(buffer) = self.controller.buffer().cloned() else {
            return;
        };
        let dir = self
            .settings
            .export_dir
            .clone()
            .unwrap_or_else(|| self.export_dir.clone());

        match export_to_dir(&buffer, self.settings.effects(), format, &dir) {
            Ok(outcome) => {
                info!(path = %outcome.path.display(), "export finished");
                self.status = format!("Saved {}", outcome.path.display());
            }
            Err(e) => {
                error!("export failed: {e}");
                self.status = format!("Render failed: {e}");
            }
        }
    }

    // One UI frame: completion check, then the spectrum.
    pub fn tick(&mut self) {
        if self.controller.tick() {
            self.status = "Finished".into();
        }
        let playing = self.controller.is_playing();
        self.visualizer.tick(playing, self.controller.sink_mut());
    }

    pub fn display_state(&self) -> DisplayState {
        let effects = self.controller.effects();
        let (sample_rate, channels) = self
            .controller
            .buffer()
            .map_or((0, 0), |b| (b.sample_rate(), b.num_channels()));
        DisplayState {
            transport: self.controller.transport().label(),
            playing: self.controller.is_playing(),
            position_secs: self.controller.position_secs(),
            duration_secs: self.controller.duration_secs(),
            sample_rate,
            channels,
            bass_level: effects.bass_boost,
            echo_level: effects.echo,
            bass_gain_db: effects.bass_gain_db(),
            echo_feedback: effects.feedback_gain(),
            spectrum: self.visualizer.bars(SPECTRUM_BARS),
            status: self.status.clone(),
            processing: self.is_processing(),
        }
    }
}
