use tracing::debug;

use crate::audio::SampleBuffer;
use crate::error::EncodeError;

use super::to_i16;

pub const HEADER_LEN: usize = 44;

const FORMAT_PCM: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

// Canonical 44-byte RIFF/WAVE header followed by interleaved 16-bit LE
// samples. The field order is fixed; players depend on it.
pub fn encode_wav(buffer: &SampleBuffer) -> Result<Vec<u8>, EncodeError> {
    let channels = buffer.num_channels();
    let frames = buffer.frames();
    let block_align = channels as usize * 2;

    let data_len = frames
        .checked_mul(block_align)
        .filter(|&n| n <= (u32::MAX as usize) - 36)
        .ok_or(EncodeError::TooLarge)?;
    let sample_rate = buffer.sample_rate();
    let byte_rate = sample_rate
        .checked_mul(block_align as u32)
        .ok_or(EncodeError::TooLarge)?;

    let mut out = Vec::with_capacity(HEADER_LEN + data_len);

    // RIFF chunk
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&(block_align as u16).to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data sub-chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_len as u32).to_le_bytes());
    for i in 0..frames {
        for ch in buffer.channels() {
            out.extend_from_slice(&to_i16(ch[i]).to_le_bytes());
        }
    }

    debug!(bytes = out.len(), frames, channels, "wav encoded");
    Ok(out)
}
