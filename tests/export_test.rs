use voxtty::encode::{encode_mp3_with, encode_wav};
use voxtty::pipeline::export_to_dir;
use voxtty::{EffectParams, ExportFormat, SampleBuffer};

fn tone(secs: f32, rate: u32) -> SampleBuffer {
    let frames = (secs * rate as f32) as usize;
    let samples = (0..frames)
        .map(|n| 0.25 * (std::f32::consts::TAU * 220.0 * n as f32 / rate as f32).sin())
        .collect();
    SampleBuffer::mono(rate, samples).unwrap()
}

#[test]
fn silent_second_wav_header() {
    let buffer = SampleBuffer::silent(24_000, 1, 24_000).unwrap();
    let bytes = encode_wav(&buffer).unwrap();
    assert_eq!(bytes.len(), 44 + 24_000 * 2);

    let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 24_000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len(), 24_000);
}

#[test]
fn fallback_without_mp3_backend_is_a_valid_wav() {
    let buffer = tone(0.1, 24_000);
    let encoded = encode_mp3_with(&buffer, None).unwrap();
    assert!(!encoded.bytes.is_empty());
    assert_eq!(encoded.format, ExportFormat::Wav);
    assert_eq!(encoded.mime(), "audio/wav");

    let reader = hound::WavReader::new(std::io::Cursor::new(encoded.bytes)).unwrap();
    assert_eq!(reader.spec().sample_rate, 24_000);
    assert_eq!(reader.len() as usize, buffer.frames());
}

#[test]
fn wav_export_with_echo_includes_tail() {
    let dir = tempfile::tempdir().unwrap();
    let buffer = tone(0.5, 24_000);
    let outcome = export_to_dir(&buffer, EffectParams::new(4, 6), ExportFormat::Wav, dir.path()).unwrap();

    assert_eq!(outcome.format, ExportFormat::Wav);
    assert_eq!(outcome.frames, buffer.frames() + 48_000);
    let name = outcome.path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("voxtty_render_") && name.ends_with(".wav"));

    let reader = hound::WavReader::open(&outcome.path).unwrap();
    assert_eq!(reader.len() as usize, outcome.frames);
}

#[test]
fn mp3_export_writes_frames() {
    let dir = tempfile::tempdir().unwrap();
    let buffer = tone(1.0, 24_000);
    let outcome = export_to_dir(&buffer, EffectParams::new(2, 0), ExportFormat::Mp3, dir.path()).unwrap();

    assert_eq!(outcome.format, ExportFormat::Mp3);
    assert!(outcome.path.extension().is_some_and(|e| e == "mp3"));
    let bytes = std::fs::read(&outcome.path).unwrap();
    assert_eq!(bytes.len(), outcome.bytes);
    assert!(bytes.len() > 1_000);
}

#[test]
fn empty_input_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let buffer = SampleBuffer::mono(24_000, Vec::new()).unwrap();
    let result = export_to_dir(&buffer, EffectParams::new(0, 0), ExportFormat::Wav, dir.path());
    assert!(result.is_err());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
