use std::sync::Arc;

use super::sample_buffer::SampleBuffer;

// Single-use reader over a buffer, the live engine's "source node".
// Starts at a frame offset, hands out one frame at a time and goes inactive
// at the end of the buffer. It can't be rewound: a new session gets a new
// voice.
#[derive(Clone, Debug)]
pub struct Voice {
    buffer: Arc<SampleBuffer>,
    pos: usize,
    pub active: bool,
}

impl Voice {
    pub fn new(buffer: Arc<SampleBuffer>, start_frame: usize) -> Self {
        let pos = start_frame.min(buffer.frames());
        let active = pos < buffer.frames();
        Self { buffer, pos, active }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn sample_rate(&self) -> u32 {
        self.buffer.sample_rate()
    }

    pub fn num_channels(&self) -> usize {
        self.buffer.num_channels() as usize
    }

    // Fill `frame` (one slot per buffer channel) and advance. Writes silence
    // once the voice has ended.
    pub fn next_frame(&mut self, frame: &mut [f32]) {
        if !self.active {
            frame.fill(0.0);
            return;
        }
        for (ch, slot) in frame.iter_mut().enumerate() {
            *slot = self
                .buffer
                .channels()
                .get(ch)
                .map_or(0.0, |c| c[self.pos]);
        }
        self.pos += 1;
        if self.pos >= self.buffer.frames() {
            self.active = false;
        }
    }

    pub fn stop(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_from_offset_then_goes_silent() {
        let buf = Arc::new(SampleBuffer::mono(10, vec![0.1, 0.2, 0.3, 0.4]).unwrap());
        let mut voice = Voice::new(buf, 2);
        let mut frame = [0.0];
        voice.next_frame(&mut frame);
        assert_eq!(frame[0], 0.3);
        voice.next_frame(&mut frame);
        assert_eq!(frame[0], 0.4);
        assert!(!voice.active);
        voice.next_frame(&mut frame);
        assert_eq!(frame[0], 0.0);
    }

    #[test]
    fn offset_past_end_starts_inactive() {
        let buf = Arc::new(SampleBuffer::mono(10, vec![0.5; 3]).unwrap());
        let voice = Voice::new(buf, 99);
        assert!(!voice.active);
        assert_eq!(voice.position(), 3);
    }
}
