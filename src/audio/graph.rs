// source -> bass shelf -+--------------------------> (+) -+-> out
//                        |                             ^    +-> analysis tap
//                        +-> delay -+-> wet gain ------+
//                             ^     |
//                             +-fb--+
//
// live and offline drivers share this graph; only the glide and the tap differ

use crate::shared::{
    ANALYSIS_WINDOW, BASS_SHELF_HZ, ECHO_DELAY_SECS, SMOOTHING_TIME_CONSTANT_SECS,
};

use super::effect::{EffectParams, FeedbackDelay, LowShelf, Smoothed};

pub struct EffectsGraph {
    channels: usize,
    params: EffectParams,
    shelf: LowShelf,
    bass_db: Smoothed,
    delay: Option<FeedbackDelay>, // None = wet path not built at all
    feedback: Smoothed,
    wet: Smoothed,
    tap: Option<AnalysisTap>,
}

impl EffectsGraph {
    // knobs glide over ~0.1 s; the delay line always exists so echo can be
    // dialed in mid-play
    pub fn live(params: EffectParams, sample_rate: u32, channels: usize) -> Self {
        let sr = sample_rate as f32;
        let tau = SMOOTHING_TIME_CONSTANT_SECS;
        Self {
            channels,
            params,
            shelf: LowShelf::new(sr, BASS_SHELF_HZ, params.bass_gain_db(), channels),
            bass_db: Smoothed::new(params.bass_gain_db(), tau, sr),
            delay: Some(FeedbackDelay::new(delay_samples(sample_rate), channels)),
            feedback: Smoothed::new(params.feedback_gain(), tau, sr),
            wet: Smoothed::new(params.wet_gain(), tau, sr),
            tap: Some(AnalysisTap::new()),
        }
    }

    // frozen params, and no wet path at all with echo off
    pub fn offline(params: EffectParams, sample_rate: u32, channels: usize) -> Self {
        let sr = sample_rate as f32;
        let delay = params
            .echo_active()
            .then(|| FeedbackDelay::new(delay_samples(sample_rate), channels));
        Self {
            channels,
            params,
            shelf: LowShelf::new(sr, BASS_SHELF_HZ, params.bass_gain_db(), channels),
            bass_db: Smoothed::fixed(params.bass_gain_db()),
            delay,
            feedback: Smoothed::fixed(params.feedback_gain()),
            wet: Smoothed::fixed(params.wet_gain()),
            tap: None,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn params(&self) -> EffectParams {
        self.params
    }

    pub fn set_params(&mut self, params: EffectParams) {
        self.params = params;
        self.bass_db.set_target(params.bass_gain_db());
        self.feedback.set_target(params.feedback_gain());
        self.wet.set_target(params.wet_gain());
    }

    pub fn tap(&self) -> Option<&AnalysisTap> {
        self.tap.as_ref()
    }

    // one sample per channel, in place
    #[inline]
    pub fn process_frame(&mut self, frame: &mut [f32]) {
        let gain_db = self.bass_db.next();
        if gain_db != self.shelf.gain_db() {
            self.shelf.set_gain_db(gain_db);
        }
        let feedback = self.feedback.next();
        let wet = self.wet.next();

        let mut mono = 0.0;
        for (ch, sample) in frame.iter_mut().enumerate().take(self.channels) {
            let dry = if self.shelf.is_flat() {
                self.shelf.track(ch, *sample);
                *sample
            } else {
                self.shelf.process(ch, *sample)
            };

            let mut out = dry;
            if let Some(delay) = self.delay.as_mut() {
                let delayed = delay.process(ch, dry, feedback);
                // a zero wet gain contributes nothing, so skip the sum
                if wet != 0.0 {
                    out += wet * delayed;
                }
            }
            *sample = out;
            mono += out;
        }
        if let Some(delay) = self.delay.as_mut() {
            delay.advance();
        }
        if let Some(tap) = self.tap.as_mut() {
            tap.push(mono / self.channels.max(1) as f32);
        }
    }
}

fn delay_samples(sample_rate: u32) -> usize {
    (ECHO_DELAY_SECS * sample_rate as f32).round() as usize
}

pub type AnalysisWindow = [f32; ANALYSIS_WINDOW];

// rolling window of the newest output, mixed to mono; never feeds back
#[derive(Clone, Debug)]
pub struct AnalysisTap {
    ring: Box<AnalysisWindow>,
    pos: usize,
}

impl AnalysisTap {
    pub fn new() -> Self {
        Self {
            ring: Box::new([0.0; ANALYSIS_WINDOW]),
            pos: 0,
        }
    }

    #[inline]
    fn push(&mut self, x: f32) {
        self.ring[self.pos] = x;
        self.pos = (self.pos + 1) % ANALYSIS_WINDOW;
    }

    // oldest to newest, by value so the audio thread never allocates for it
    pub fn window(&self) -> AnalysisWindow {
        let mut out = [0.0; ANALYSIS_WINDOW];
        let split = ANALYSIS_WINDOW - self.pos;
        out[..split].copy_from_slice(&self.ring[self.pos..]);
        out[split..].copy_from_slice(&self.ring[..self.pos]);
        out
    }
}

impl Default for AnalysisTap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(graph: &mut EffectsGraph, input: &[f32], total: usize) -> Vec<f32> {
        (0..total)
            .map(|i| {
                let mut frame = [input.get(i).copied().unwrap_or(0.0)];
                graph.process_frame(&mut frame);
                frame[0]
            })
            .collect()
    }

    #[test]
    fn neutral_offline_graph_is_identity() {
        let mut graph = EffectsGraph::offline(EffectParams::default(), 24_000, 1);
        let input: Vec<f32> = (0..2_000).map(|i| ((i as f32) * 0.01).sin()).collect();
        let out = run(&mut graph, &input, input.len());
        assert_eq!(out, input);
    }

    #[test]
    fn echo_lands_after_quarter_second() {
        let params = EffectParams::new(0, 5);
        let mut graph = EffectsGraph::offline(params, 1_000, 1);
        let out = run(&mut graph, &[1.0], 1_000);
        assert_eq!(out[0], 1.0);
        assert!((out[250] - params.wet_gain()).abs() < 1e-6);
        assert!((out[500] - params.wet_gain() * params.feedback_gain()).abs() < 1e-6);
        assert_eq!(out[100], 0.0);
    }

    #[test]
    fn live_graph_glides_to_new_wet_gain() {
        let mut graph = EffectsGraph::live(EffectParams::default(), 1_000, 1);
        graph.set_params(EffectParams::new(0, 10));
        let mut frame = [0.0];
        graph.process_frame(&mut frame);
        assert!(graph.wet.value() > 0.0 && graph.wet.value() < 0.1);
        for _ in 0..5_000 {
            graph.process_frame(&mut frame);
        }
        assert!((graph.wet.value() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn tap_keeps_latest_window_in_order() {
        let mut graph = EffectsGraph::live(EffectParams::default(), 24_000, 1);
        for i in 0..(ANALYSIS_WINDOW + 10) {
            let mut frame = [i as f32];
            graph.process_frame(&mut frame);
        }
        let snap = graph.tap().unwrap().window();
        assert_eq!(snap.len(), ANALYSIS_WINDOW);
        assert_eq!(snap[0], 10.0);
        assert_eq!(*snap.last().unwrap(), (ANALYSIS_WINDOW + 9) as f32);
    }

    #[test]
    fn stereo_channels_are_independent() {
        let mut graph = EffectsGraph::offline(EffectParams::new(0, 4), 1_000, 2);
        let mut echoes = Vec::new();
        for i in 0..300 {
            let mut frame = if i == 0 { [1.0, 0.0] } else { [0.0, 0.0] };
            graph.process_frame(&mut frame);
            echoes.push(frame);
        }
        assert!(echoes[250][0] > 0.0);
        assert_eq!(echoes[250][1], 0.0);
    }
}
