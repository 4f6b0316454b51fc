use serde::{Deserialize, Serialize};

use crate::shared::{
    BASS_DB_PER_LEVEL, ECHO_FEEDBACK_PER_LEVEL, ECHO_TAIL_SECS, ECHO_WET_PER_LEVEL,
    MAX_EFFECT_LEVEL,
};

// The two user knobs. Levels are expected in 0..=10; callers clamp, the DSP
// doesn't check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectParams {
    pub bass_boost: u8,
    pub echo: u8,
}

impl EffectParams {
    pub fn new(bass_boost: u8, echo: u8) -> Self {
        Self { bass_boost, echo }
    }

    pub fn clamped(self) -> Self {
        Self {
            bass_boost: self.bass_boost.min(MAX_EFFECT_LEVEL),
            echo: self.echo.min(MAX_EFFECT_LEVEL),
        }
    }

    pub fn bass_gain_db(&self) -> f32 {
        self.bass_boost as f32 * BASS_DB_PER_LEVEL
    }

    // stays below unity for every legal level so the loop always decays
    pub fn feedback_gain(&self) -> f32 {
        self.echo as f32 * ECHO_FEEDBACK_PER_LEVEL
    }

    pub fn wet_gain(&self) -> f32 {
        if self.echo > 0 {
            self.echo as f32 * ECHO_WET_PER_LEVEL
        } else {
            0.0
        }
    }

    pub fn echo_active(&self) -> bool {
        self.echo > 0
    }

    pub fn echo_tail_secs(&self) -> f64 {
        if self.echo_active() { ECHO_TAIL_SECS } else { 0.0 }
    }

    pub fn is_neutral(&self) -> bool {
        self.bass_boost == 0 && self.echo == 0
    }

    pub fn label(&self) -> String {
        format!("Bass({}) Echo({})", self.bass_boost, self.echo)
    }
}

// ── Parameter smoothing ──────────────────────────────────────────

// One-pole glide toward a target, the same curve as an exponential
// approach with time constant `tau`. Snaps once it's close enough so that a
// zero target really becomes 0.0.
#[derive(Clone, Debug)]
pub struct Smoothed {
    current: f32,
    target: f32,
    coeff: f32, // fraction of the remaining distance covered per sample
}

const SNAP_EPSILON: f32 = 1e-5;

impl Smoothed {
    pub fn new(value: f32, tau_secs: f32, sample_rate: f32) -> Self {
        let coeff = if tau_secs <= 0.0 {
            1.0
        } else {
            1.0 - (-1.0 / (tau_secs * sample_rate)).exp()
        };
        Self {
            current: value,
            target: value,
            coeff,
        }
    }

    // No glide: every `set_target` lands immediately.
    pub fn fixed(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            coeff: 1.0,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
        if self.coeff >= 1.0 {
            self.current = target;
        }
    }

    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.current != self.target {
            self.current += (self.target - self.current) * self.coeff;
            if (self.target - self.current).abs() < SNAP_EPSILON {
                self.current = self.target;
            }
        }
        self.current
    }

    pub fn value(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }
}

// ── Low shelf ────────────────────────────────────────────────────

// RBJ cookbook low shelf (shelf slope 1), one state set per channel.
#[derive(Clone, Debug)]
pub struct LowShelf {
    sin_w: f32,
    cos_w: f32,
    gain_db: f32,
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    state: Vec<BiquadState>,
}

#[derive(Clone, Copy, Debug, Default)]
struct BiquadState {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl LowShelf {
    pub fn new(sample_rate: f32, frequency: f32, gain_db: f32, channels: usize) -> Self {
        // keep away from Nyquist on very low rates
        let freq = frequency.min(sample_rate * 0.45);
        let w = std::f32::consts::TAU * freq / sample_rate;
        let mut shelf = Self {
            sin_w: w.sin(),
            cos_w: w.cos(),
            gain_db: f32::NAN,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            state: vec![BiquadState::default(); channels],
        };
        shelf.set_gain_db(gain_db);
        shelf
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    // A flat shelf is an identity; the graph skips it entirely.
    pub fn is_flat(&self) -> bool {
        self.gain_db == 0.0
    }

    pub fn set_gain_db(&mut self, gain_db: f32) {
        if gain_db == self.gain_db {
            return;
        }
        self.gain_db = gain_db;

        let a = 10.0_f32.powf(gain_db / 40.0);
        let alpha = self.sin_w / 2.0 * std::f32::consts::SQRT_2; // S = 1
        let beta = 2.0 * a.sqrt() * alpha;
        let cos_w = self.cos_w;

        let b0 = a * ((a + 1.0) - (a - 1.0) * cos_w + beta);
        let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w);
        let b2 = a * ((a + 1.0) - (a - 1.0) * cos_w - beta);
        let a0 = (a + 1.0) + (a - 1.0) * cos_w + beta;
        let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cos_w);
        let a2 = (a + 1.0) + (a - 1.0) * cos_w - beta;

        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
    }

    #[inline]
    pub fn process(&mut self, channel: usize, x: f32) -> f32 {
        let s = &mut self.state[channel];
        let y = self.b0 * x + self.b1 * s.x1 + self.b2 * s.x2 - self.a1 * s.y1 - self.a2 * s.y2;
        s.x2 = s.x1;
        s.x1 = x;
        s.y2 = s.y1;
        s.y1 = y;
        y
    }

    // Keep the filter history in step while bypassed so re-engaging is seamless.
    #[inline]
    pub fn track(&mut self, channel: usize, x: f32) {
        let s = &mut self.state[channel];
        s.x2 = s.x1;
        s.x1 = x;
        s.y2 = s.y1;
        s.y1 = x;
    }
}

// ── Feedback delay ───────────────────────────────────────────────

// Fixed-length delay line whose input is `x + feedback * output`.
// Output at sample n is the line input at n - len.
#[derive(Clone, Debug)]
pub struct FeedbackDelay {
    lines: Vec<Vec<f32>>, // per channel ring buffers
    pos: usize,
}

impl FeedbackDelay {
    pub fn new(delay_samples: usize, channels: usize) -> Self {
        let len = delay_samples.max(1);
        Self {
            lines: vec![vec![0.0; len]; channels],
            pos: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.first().map_or(0, |l| l.len())
    }

    // Read the delayed sample for `channel` and push `x + feedback * delayed`.
    // Call `advance` once per frame after every channel.
    #[inline]
    pub fn process(&mut self, channel: usize, x: f32, feedback: f32) -> f32 {
        let line = &mut self.lines[channel];
        let delayed = line[self.pos];
        line[self.pos] = x + feedback * delayed;
        delayed
    }

    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
        if self.pos >= self.len() {
            self.pos = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_mapping() {
        let p = EffectParams::new(10, 10);
        assert_eq!(p.bass_gain_db(), 15.0);
        assert!((p.feedback_gain() - 0.5).abs() < 1e-6);
        assert!((p.wet_gain() - 0.8).abs() < 1e-6);
        assert_eq!(p.echo_tail_secs(), 2.0);

        let off = EffectParams::default();
        assert_eq!(off.wet_gain(), 0.0);
        assert_eq!(off.echo_tail_secs(), 0.0);
        assert!(off.is_neutral());
    }

    #[test]
    fn clamp_caps_levels() {
        assert_eq!(EffectParams::new(42, 11).clamped(), EffectParams::new(10, 10));
    }

    #[test]
    fn flat_shelf_passes_through() {
        let mut shelf = LowShelf::new(24_000.0, 200.0, 0.0, 1);
        assert!(shelf.is_flat());
        for i in 0..64 {
            let x = ((i as f32) * 0.3).sin() * 0.5;
            let y = shelf.process(0, x);
            // f32 coefficients at 0 dB cancel only to within rounding
            assert!((y - x).abs() < 1e-5, "sample {i}: {y} vs {x}");
        }
    }

    #[test]
    fn shelf_boosts_dc_by_gain() {
        let mut shelf = LowShelf::new(24_000.0, 200.0, 12.0, 1);
        let mut y = 0.0;
        for _ in 0..24_000 {
            y = shelf.process(0, 0.1);
        }
        let expected = 0.1 * 10.0_f32.powf(12.0 / 20.0);
        assert!((y - expected).abs() < 1e-3, "dc gain {y} vs {expected}");
    }

    #[test]
    fn shelf_leaves_highs_alone() {
        let mut shelf = LowShelf::new(24_000.0, 200.0, 15.0, 1);
        // alternating +/- is Nyquist
        let mut peak: f32 = 0.0;
        for i in 0..4_000 {
            let x = if i % 2 == 0 { 0.5 } else { -0.5 };
            let y = shelf.process(0, x);
            if i > 3_000 {
                peak = peak.max(y.abs());
            }
        }
        assert!((peak - 0.5).abs() < 0.01, "nyquist peak {peak}");
    }

    #[test]
    fn delay_repeats_with_feedback() {
        let mut delay = FeedbackDelay::new(4, 1);
        let mut out = Vec::new();
        for i in 0..13 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            out.push(delay.process(0, x, 0.5));
            delay.advance();
        }
        assert_eq!(out[4], 1.0);
        assert_eq!(out[8], 0.5);
        assert_eq!(out[12], 0.25);
        assert_eq!(out[5], 0.0);
    }

    #[test]
    fn smoother_reaches_target_and_snaps() {
        let mut s = Smoothed::new(0.0, 0.1, 1_000.0);
        s.set_target(1.0);
        let after_tau = (0..100).map(|_| s.next()).last().unwrap();
        // one time constant covers ~63%
        assert!((after_tau - 0.632).abs() < 0.01, "{after_tau}");
        for _ in 0..10_000 {
            s.next();
        }
        assert!(s.is_settled());
        assert_eq!(s.value(), 1.0);

        s.set_target(0.0);
        for _ in 0..10_000 {
            s.next();
        }
        assert_eq!(s.value(), 0.0);
    }

    #[test]
    fn fixed_smoother_jumps() {
        let mut s = Smoothed::fixed(0.2);
        s.set_target(0.7);
        assert_eq!(s.value(), 0.7);
        assert!(s.is_settled());
    }
}
