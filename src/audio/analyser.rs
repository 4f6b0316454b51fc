// behaves like a browser analyser node: blackman window, 1/N magnitude,
// 0.8 smoothing across snapshots, -100..-30 dB mapped onto 0..=255

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::shared::ANALYSIS_WINDOW;

const SMOOTHING: f32 = 0.8;
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

pub struct Analyser {
    size: usize,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl Analyser {
    pub fn new() -> Self {
        Self::with_size(ANALYSIS_WINDOW)
    }

    pub fn with_size(size: usize) -> Self {
        let size = size.max(2);
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let window = (0..size)
            .map(|n| {
                let x = std::f32::consts::TAU * n as f32 / size as f32;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect();
        Self {
            size,
            fft,
            window,
            smoothed: vec![0.0; size / 2],
            scratch: vec![Complex::new(0.0, 0.0); size],
        }
    }

    pub fn bins(&self) -> usize {
        self.size / 2
    }

    // One snapshot of byte magnitudes (`size / 2` bins) from the newest
    // `size` samples of `samples`. Shorter input is zero-padded at the front.
    pub fn byte_frequency_data(&mut self, samples: &[f32]) -> Vec<u8> {
        let take = samples.len().min(self.size);
        let pad = self.size - take;
        let recent = &samples[samples.len() - take..];

        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let x = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(x * self.window[i], 0.0);
        }
        self.fft.process(&mut self.scratch);

        let scale = 1.0 / self.size as f32;
        let range = MAX_DB - MIN_DB;
        self.smoothed
            .iter_mut()
            .zip(self.scratch.iter())
            .map(|(prev, bin)| {
                let magnitude = bin.norm() * scale;
                *prev = SMOOTHING * *prev + (1.0 - SMOOTHING) * magnitude;
                let db = 20.0 * prev.max(f32::MIN_POSITIVE).log10();
                (255.0 * (db - MIN_DB) / range).clamp(0.0, 255.0) as u8
            })
            .collect()
    }
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ANALYSIS_BINS;

    #[test]
    fn silence_is_all_zero() {
        let mut analyser = Analyser::new();
        let bins = analyser.byte_frequency_data(&[0.0; ANALYSIS_WINDOW]);
        assert_eq!(bins.len(), ANALYSIS_BINS);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn sine_peaks_at_its_bin() {
        let mut analyser = Analyser::new();
        let bin = 32;
        let tone: Vec<f32> = (0..ANALYSIS_WINDOW)
            .map(|n| 0.01 * (std::f32::consts::TAU * bin as f32 * n as f32 / ANALYSIS_WINDOW as f32).sin())
            .collect();
        let mut bins = Vec::new();
        for _ in 0..20 {
            bins = analyser.byte_frequency_data(&tone);
        }
        let peak = bins
            .iter()
            .enumerate()
            .max_by_key(|(_, b)| **b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, bin);
        assert!(bins[bin] > 150 && bins[bin] < 255);
        assert!(bins[200] < bins[bin]);
    }

    #[test]
    fn short_input_is_padded() {
        let mut analyser = Analyser::new();
        let bins = analyser.byte_frequency_data(&[0.5; 10]);
        assert_eq!(bins.len(), analyser.bins());
    }
}
