// Batch driver for the effects graph, used for export.

use tracing::debug;

use crate::error::RenderError;

use super::effect::EffectParams;
use super::graph::EffectsGraph;
use super::sample_buffer::SampleBuffer;

// Output length for a render: the source plus a fixed tail when echo is on.
pub fn rendered_frames(source_frames: usize, sample_rate: u32, params: EffectParams) -> usize {
    let tail = (params.echo_tail_secs() * sample_rate as f64).round() as usize;
    source_frames + tail
}

// Render `source` through a freshly built graph with `params` frozen for the
// whole pass. Returns the complete buffer or nothing.
pub fn render_offline(source: &SampleBuffer, params: EffectParams) -> Result<SampleBuffer, RenderError> {
    let sample_rate = source.sample_rate();
    if sample_rate == 0 {
        return Err(RenderError::InvalidSampleRate(sample_rate));
    }
    let channels = source.num_channels() as usize;
    let in_frames = source.frames();
    let out_frames = rendered_frames(in_frames, sample_rate, params);
    if out_frames == 0 {
        return Err(RenderError::EmptyOutput);
    }

    let mut graph = EffectsGraph::offline(params, sample_rate, channels);
    let mut output = vec![vec![0.0f32; out_frames]; channels];
    let mut frame = vec![0.0f32; channels];

    for i in 0..out_frames {
        for (ch, slot) in frame.iter_mut().enumerate() {
            *slot = if i < in_frames { source.channel(ch)[i] } else { 0.0 };
        }
        graph.process_frame(&mut frame);
        for (ch, &s) in frame.iter().enumerate() {
            output[ch][i] = s;
        }
    }

    debug!(
        in_frames,
        out_frames,
        params = %params.label(),
        "offline render complete"
    );

    SampleBuffer::from_channels(sample_rate, output).map_err(|_| RenderError::ChannelMismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_only_when_echo_is_on() {
        assert_eq!(rendered_frames(1_000, 24_000, EffectParams::new(7, 0)), 1_000);
        assert_eq!(rendered_frames(1_000, 24_000, EffectParams::new(0, 1)), 49_000);
    }

    #[test]
    fn empty_source_without_tail_fails() {
        let empty = SampleBuffer::silent(24_000, 1, 0).unwrap();
        assert!(matches!(
            render_offline(&empty, EffectParams::default()),
            Err(RenderError::EmptyOutput)
        ));
    }

    #[test]
    fn empty_source_with_echo_renders_silence_tail() {
        let empty = SampleBuffer::silent(24_000, 1, 0).unwrap();
        let out = render_offline(&empty, EffectParams::new(0, 3)).unwrap();
        assert_eq!(out.frames(), 48_000);
        assert!(out.channel(0).iter().all(|&s| s == 0.0));
    }
}
