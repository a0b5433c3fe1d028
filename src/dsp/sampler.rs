//! Decoded sound assets and resampled buffer playback.

/// A mono sample buffer loaded into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Mono f64 samples.
    pub data: Vec<f64>,
    /// Native sample rate of the audio.
    pub sample_rate: u32,
}

impl SampleBuffer {
    pub fn new(data: Vec<f64>, sample_rate: u32) -> Self {
        SampleBuffer { data, sample_rate }
    }

    /// Create from interleaved 16-bit PCM, averaging channels down to mono.
    pub fn from_i16(pcm: &[i16], channels: u16, sample_rate: u32) -> Self {
        let channels = channels.max(1) as usize;
        let data = pcm
            .chunks(channels)
            .map(|frame| frame.iter().map(|&s| s as f64 / 32768.0).sum::<f64>() / frame.len() as f64)
            .collect();
        SampleBuffer { data, sample_rate }
    }

    /// Create from interleaved f32 samples, averaging channels down to mono.
    pub fn from_f32(samples: &[f32], channels: u16, sample_rate: u32) -> Self {
        let channels = channels.max(1) as usize;
        let data = samples
            .chunks(channels)
            .map(|frame| frame.iter().map(|&s| s as f64).sum::<f64>() / frame.len() as f64)
            .collect();
        SampleBuffer { data, sample_rate }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Length in seconds at the native rate.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.data.len() as f64 / self.sample_rate as f64
    }

    /// Read a sample with linear interpolation at a fractional position.
    pub fn read_interpolated(&self, position: f64) -> f64 {
        if self.data.is_empty() || position < 0.0 {
            return 0.0;
        }

        let idx = position as usize;
        if idx >= self.data.len() - 1 {
            return if idx < self.data.len() { self.data[idx] } else { 0.0 };
        }

        let frac = position - idx as f64;
        self.data[idx] * (1.0 - frac) + self.data[idx + 1] * frac
    }

    /// Read the sample heard `elapsed` seconds into playback, resampling from
    /// the native rate.
    pub fn sample_at(&self, elapsed: f64) -> f64 {
        self.read_interpolated(elapsed * self.sample_rate as f64)
    }
}
