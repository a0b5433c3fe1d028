//! White-noise buffers for unpitched sources (claps, breaths).

use rand::Rng;

/// A pre-filled buffer of uniform white noise in [-1, 1).
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseBuffer {
    data: Vec<f64>,
}

impl NoiseBuffer {
    /// Fill `duration` seconds of noise at `sample_rate` from `rng`.
    pub fn white<R: Rng>(duration: f64, sample_rate: f64, rng: &mut R) -> Self {
        let len = (duration.max(0.0) * sample_rate).round() as usize;
        let data = (0..len).map(|_| rng.random_range(-1.0..1.0)).collect();
        NoiseBuffer { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at `index`, silent past the end.
    pub fn sample(&self, index: usize) -> f64 {
        self.data.get(index).copied().unwrap_or(0.0)
    }
}
