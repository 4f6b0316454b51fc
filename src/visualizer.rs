use crate::audio::Analyser;
use crate::playback::AudioSink;

// share of the previous frame that survives each redraw
const FADE: f32 = 0.7;

// Spectrum display state. Reads analysis windows from the sink while
// playing and never writes anything back into the audio path.
pub struct Visualizer {
    analyser: Analyser,
    levels: Vec<f32>, // 0..=255 per bin, with the fade trail applied
}

impl Visualizer {
    pub fn new() -> Self {
        let analyser = Analyser::new();
        let levels = vec![0.0; analyser.bins()];
        Self { analyser, levels }
    }

    // One animation tick. Returns whether a fresh snapshot was consumed.
    pub fn tick<S: AudioSink>(&mut self, playing: bool, sink: &mut S) -> bool {
        if !playing {
            return false;
        }
        let Some(window) = sink.latest_analysis() else {
            return false;
        };
        self.update(&window);
        true
    }

    pub fn update(&mut self, window: &[f32]) {
        let bins = self.analyser.byte_frequency_data(window);
        for (level, &fresh) in self.levels.iter_mut().zip(bins.iter()) {
            // new peaks draw over the old frame, otherwise it fades
            *level = (fresh as f32).max(*level * FADE);
        }
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    // Bar heights for `columns` bars, each the max of its group of bins.
    pub fn bars(&self, columns: usize) -> Vec<u64> {
        if columns == 0 || self.levels.is_empty() {
            return Vec::new();
        }
        let per_bar = self.levels.len().div_ceil(columns).max(1);
        self.levels
            .chunks(per_bar)
            .map(|group| group.iter().copied().fold(0.0f32, f32::max) as u64)
            .collect()
    }

    pub fn clear(&mut self) {
        self.levels.iter_mut().for_each(|l| *l = 0.0);
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}
