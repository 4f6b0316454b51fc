// The current key plan for the studio screen:
//
// Transport:
//   Space         //  Play (when stopped/paused) or Pause (when playing)
//   s             //  Stop
//
// Effect knobs (0-10 each):
//   [ / ]         //  bass boost down / up
//   - / =         //  echo down / up
//
// Export:
//   m             //  render + export MP3
//   w             //  render + export WAV
//
// Quit:
//   Esc / q       //  Quit
//
// Only the middle layer owns transport and effect state, the TUI just draws
// the DisplayState every frame.

pub const DEFAULT_SAMPLE_RATE: u32 = 24_000; // what the speech service hands us
pub const DEFAULT_CHANNELS: u16 = 1;

pub const MAX_EFFECT_LEVEL: u8 = 10;

pub const BASS_SHELF_HZ: f32 = 200.0;
pub const BASS_DB_PER_LEVEL: f32 = 1.5;

pub const ECHO_DELAY_SECS: f32 = 0.25;
pub const ECHO_FEEDBACK_PER_LEVEL: f32 = 0.05;
pub const ECHO_WET_PER_LEVEL: f32 = 0.08;
pub const ECHO_TAIL_SECS: f64 = 2.0; // let the feedback ring out before we cut

pub const SMOOTHING_TIME_CONSTANT_SECS: f32 = 0.1;

pub const ANALYSIS_WINDOW: usize = 512;
pub const ANALYSIS_BINS: usize = ANALYSIS_WINDOW / 2;
pub const SPECTRUM_BARS: usize = 64;

pub const MP3_BLOCK_SAMPLES: usize = 1152; // one MPEG-1 layer III frame
pub const MP3_BITRATE_KBPS: u32 = 128;

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    Play,
    Pause,
    Stop,

    BassDown,
    BassUp,
    EchoDown,
    EchoUp,

    ExportMp3,
    ExportWav,

    Quit,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub transport: &'static str, // "STOPPED", "PLAYING", "PAUSED"
    pub playing: bool,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bass_level: u8,
    pub echo_level: u8,
    pub bass_gain_db: f32,
    pub echo_feedback: f32,
    pub spectrum: Vec<u64>, // already faded, 0..=255 per bar
    pub status: String, // last export / error line
    pub processing: bool, // an export is pending, show "RENDERING"
}
