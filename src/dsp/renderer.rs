//! WAV renderer: renders graphs to 16-bit stereo WAV bytes.

use super::graph::AudioGraph;
use super::mixer::StereoBuffer;

/// Render a graph to a WAV file as bytes (16-bit stereo PCM).
pub fn render_wav(graph: &AudioGraph, sample_rate: u32, master_gain: f64) -> Vec<u8> {
    encode_wav(&graph.render(sample_rate, master_gain))
}

/// Convert a float sample to 16-bit PCM.
pub fn to_i16(sample: f32) -> i16 {
    (sample as f64 * 32767.0).round().clamp(-32768.0, 32767.0) as i16
}

/// Encode a stereo buffer as a canonical 44-byte-header WAV.
pub fn encode_wav(buffer: &StereoBuffer) -> Vec<u8> {
    let channels: u16 = 2;
    let bits_per_sample: u16 = 16;
    let sample_rate = buffer.sample_rate;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (buffer.frames() * block_align as usize) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for sample in buffer.interleaved() {
        buf.extend_from_slice(&to_i16(sample).to_le_bytes());
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::graph::SourceNode;
    use crate::dsp::oscillator::Waveform;

    #[test]
    fn wav_header_valid() {
        let mut graph = AudioGraph::new("beep");
        graph.push(SourceNode::oscillator(Waveform::Square, 880.0, 0.0, 0.12));
        let wav = render_wav(&graph, 44100, 0.8);

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 44100);
        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 2);
    }

    #[test]
    fn wav_size_correct() {
        let buffer = StereoBuffer::silent(22050, 44100);
        let wav = encode_wav(&buffer);
        // 22050 frames * 2 channels * 2 bytes
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size, 88200);
        assert_eq!(wav.len(), 44 + 88200);
    }

    #[test]
    fn rendered_wav_not_silent() {
        let mut graph = AudioGraph::new("tone");
        graph.push(SourceNode::oscillator(Waveform::Triangle, 523.25, 0.0, 0.2));
        let wav = render_wav(&graph, 22050, 0.8);
        let has_nonzero = wav[44..]
            .chunks_exact(2)
            .any(|b| i16::from_le_bytes([b[0], b[1]]) != 0);
        assert!(has_nonzero, "Rendered WAV should contain non-silent audio");
    }

    #[test]
    fn i16_conversion_clamps() {
        assert_eq!(to_i16(0.0), 0);
        assert_eq!(to_i16(1.0), 32767);
        assert_eq!(to_i16(-2.0), -32768);
    }
}
