use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use crossterm::terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use voxtty::audio::{self, offline::rendered_frames, EffectParams, SampleBuffer};
use voxtty::encode::ExportFormat;
use voxtty::loader::sample_loader;
use voxtty::middle::Middle;
use voxtty::pipeline::{export_to_dir, persistence, StudioSettings};
use voxtty::tui;

#[derive(Parser)]
#[command(name = "voxtty")]
#[command(about = "Terminal studio for generated speech: effects, playback, export", long_about = None)]
struct Cli {
    /// Where .voxtty/ settings live and exports land by default
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive player
    Play(InputArgs),
    /// Render with effects and write an MP3 or WAV
    Export {
        #[command(flatten)]
        input: InputArgs,
        /// mp3 or wav
        #[arg(long)]
        format: Option<ExportFormat>,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print what the input decodes to
    Info(InputArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Base64 PCM text, a speech service JSON response, or a WAV file
    input: PathBuf,
    /// Bass boost level, 0-10
    #[arg(long)]
    bass: Option<u8>,
    /// Echo level, 0-10
    #[arg(long)]
    echo: Option<u8>,
    /// Sample rate of raw PCM input
    #[arg(long)]
    sample_rate: Option<u32>,
    /// Channel count of raw PCM input
    #[arg(long)]
    channels: Option<u16>,
}

impl InputArgs {
    // flags win over saved settings; levels are clamped here, not in the DSP
    fn apply_to(&self, settings: &mut StudioSettings) {
        let bass = self.bass.unwrap_or(settings.bass_boost);
        let echo = self.echo.unwrap_or(settings.echo);
        settings.set_effects(EffectParams::new(bass, echo));
        if let Some(rate) = self.sample_rate {
            settings.sample_rate = rate;
        }
        if let Some(channels) = self.channels {
            settings.channels = channels;
        }
    }

    fn load(&self, settings: &StudioSettings) -> anyhow::Result<SampleBuffer> {
        sample_loader::load(&self.input, settings.pcm_format())
            .with_context(|| format!("failed to load {}", self.input.display()))
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut settings = persistence::load_settings(&project_dir).unwrap_or_default();

    match cli.command {
        Commands::Play(input) => {
            init_file_logging(&project_dir)?;
            input.apply_to(&mut settings);
            let buffer = input.load(&settings)?;
            play(buffer, settings, &project_dir)
        }
        Commands::Export { input, format, out } => {
            init_stderr_logging();
            input.apply_to(&mut settings);
            let buffer = input.load(&settings)?;
            let format = format.unwrap_or(settings.export_format);
            let dir = out
                .or_else(|| settings.export_dir.clone())
                .unwrap_or_else(|| project_dir.clone());
            let outcome = export_to_dir(&buffer, settings.effects(), format, &dir)?;
            if outcome.format != format {
                eprintln!("note: {format} encoder unavailable, wrote {} instead", outcome.format);
            }
            println!("{}", outcome.path.display());
            Ok(())
        }
        Commands::Info(input) => {
            init_stderr_logging();
            input.apply_to(&mut settings);
            let buffer = input.load(&settings)?;
            print_info(&buffer, settings.effects());
            Ok(())
        }
    }
}

fn print_info(buffer: &SampleBuffer, effects: EffectParams) {
    let out_frames = rendered_frames(buffer.frames(), buffer.sample_rate(), effects);
    println!("sample rate : {} Hz", buffer.sample_rate());
    println!("channels    : {}", buffer.num_channels());
    println!("frames      : {}", buffer.frames());
    println!("duration    : {:.3} s", buffer.duration_secs());
    println!("effects     : {}", effects.label());
    println!(
        "render      : {} frames ({:.3} s)",
        out_frames,
        out_frames as f64 / buffer.sample_rate() as f64
    );
}

// ── Logging ───────────────────────────────────────────────────────

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "voxtty=info".into())
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// the tui owns the terminal, so the player logs to a file
fn init_file_logging(project_dir: &Path) -> anyhow::Result<()> {
    let path = persistence::log_file_path(project_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

// ── Interactive player ────────────────────────────────────────────

fn play(buffer: SampleBuffer, settings: StudioSettings, project_dir: &Path) -> anyhow::Result<()> {
    let audio = audio::start_audio()?;
    let clock = audio.clock();
    let mut middle = Middle::new(audio, clock, settings, project_dir.to_path_buf());
    middle.load(buffer);

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = std::time::Duration::from_millis(16); // ~60fps
    let mut tui_state = tui::mode::TuiState::default();

    loop {
        let ds = middle.display_state();
        tui_state.playing = ds.playing;
        tui_state.processing = ds.processing;

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds);
        })?;

        // the processing state has been drawn, now do the blocking work
        if ds.processing {
            middle.run_pending_export();
            continue;
        }

        let events = tui::input::poll_input(tick_rate, &tui_state)?;
        for event in events {
            if !middle.handle_input(event) {
                // save before quitting
                if let Err(e) = persistence::save_settings(project_dir, &middle.settings) {
                    tracing::warn!("failed to save settings: {e}");
                }
                info!("quit");
                return Ok(());
            }
        }

        middle.tick();
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
