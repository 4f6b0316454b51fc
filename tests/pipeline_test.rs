use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use proptest::prelude::*;

use voxtty::audio::offline::rendered_frames;
use voxtty::encode::encode_wav;
use voxtty::{decode_base64_pcm, render_offline, EffectParams, PcmFormat, SampleBuffer};

fn speechlike(frames: usize, rate: u32) -> SampleBuffer {
    let samples = (0..frames)
        .map(|n| {
            let t = n as f32 / rate as f32;
            0.4 * (std::f32::consts::TAU * 140.0 * t).sin()
                + 0.2 * (std::f32::consts::TAU * 900.0 * t).sin()
        })
        .collect();
    SampleBuffer::mono(rate, samples).unwrap()
}

#[test]
fn decode_one_second() {
    let b64 = STANDARD.encode(vec![0u8; 48_000]);
    let buffer = decode_base64_pcm(&b64, PcmFormat::default()).unwrap();
    assert_eq!(buffer.frames(), 24_000);
    assert_eq!(buffer.sample_rate(), 24_000);
    assert_eq!(buffer.duration_secs(), 1.0);
}

#[test]
fn neutral_render_is_passthrough() {
    let input = speechlike(12_000, 24_000);
    let out = render_offline(&input, EffectParams::default()).unwrap();
    assert_eq!(out.frames(), input.frames());
    for (a, b) in input.channel(0).iter().zip(out.channel(0)) {
        assert!((a - b).abs() <= 1e-4);
    }
}

#[test]
fn bass_only_keeps_length() {
    let input = speechlike(4_800, 24_000);
    let out = render_offline(&input, EffectParams::new(10, 0)).unwrap();
    assert_eq!(out.frames(), input.frames());
    assert_ne!(out.channel(0), input.channel(0));
}

#[test]
fn max_feedback_echoes_decay() {
    let rate = 8_000;
    let mut impulse = vec![0.0; rate as usize];
    impulse[0] = 1.0;
    let input = SampleBuffer::mono(rate, impulse).unwrap();
    let out = render_offline(&input, EffectParams::new(0, 10)).unwrap();

    let delay = rate as usize / 4;
    let peaks: Vec<f32> = (1..)
        .map(|k| k * delay)
        .take_while(|&i| i < out.frames())
        .map(|i| out.channel(0)[i].abs())
        .collect();
    assert!(peaks.len() >= 8);
    assert!(peaks[0] > 0.0);
    for pair in peaks.windows(2) {
        assert!(pair[1] < pair[0], "echo grew: {pair:?}");
    }
}

#[test]
fn wav_round_trip_through_hound() {
    let input = speechlike(2_400, 24_000);
    let bytes = encode_wav(&input).unwrap();
    let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).unwrap();
    let back: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(back.len(), input.frames());
    for (a, &q) in input.channel(0).iter().zip(&back) {
        let scale = if q < 0 { 32768.0 } else { 32767.0 };
        assert!((a - q as f32 / scale).abs() < 1.0 / 32767.0);
    }
}

proptest! {
    #[test]
    fn echo_adds_two_seconds(echo in 1u8..=10, frames in 1usize..4_000, rate in prop::sample::select(vec![8_000u32, 16_000, 24_000])) {
        let input = SampleBuffer::silent(rate, 1, frames).unwrap();
        let out = render_offline(&input, EffectParams::new(0, echo)).unwrap();
        prop_assert_eq!(out.frames(), frames + 2 * rate as usize);
        prop_assert_eq!(rendered_frames(frames, rate, EffectParams::new(3, echo)), out.frames());
    }

    #[test]
    fn no_echo_no_tail(bass in 0u8..=10, frames in 1usize..4_000) {
        let input = SampleBuffer::silent(24_000, 1, frames).unwrap();
        let out = render_offline(&input, EffectParams::new(bass, 0)).unwrap();
        prop_assert_eq!(out.frames(), frames);
    }

    #[test]
    fn decode_is_exact(samples in prop::collection::vec(any::<i16>(), 0..512)) {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let buffer = decode_base64_pcm(&STANDARD.encode(bytes), PcmFormat::default()).unwrap();
        prop_assert_eq!(buffer.frames(), samples.len());
        for (s, x) in samples.iter().zip(buffer.channel(0)) {
            prop_assert_eq!(*s as f32 / 32768.0, *x);
        }
    }
}
