//! Mixer: sums panned node outputs into a stereo buffer with master gain.

use std::f64::consts::FRAC_PI_2;

/// Rendered stereo audio.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoBuffer {
    pub sample_rate: u32,
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl StereoBuffer {
    pub fn silent(frames: usize, sample_rate: u32) -> Self {
        StereoBuffer {
            sample_rate,
            left: vec![0.0; frames],
            right: vec![0.0; frames],
        }
    }

    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn duration(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// L/R interleaved frames, the layout AudioWorklets and WAV expect.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frames() * 2);
        for (&l, &r) in self.left.iter().zip(&self.right) {
            out.push(l);
            out.push(r);
        }
        out
    }

    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(&self.right)
            .fold(0.0_f32, |m, &s| m.max(s.abs()))
    }

    /// Add `other` into this buffer starting at `offset` frames, growing as needed.
    pub fn mix_in(&mut self, other: &StereoBuffer, offset: usize) {
        let needed = offset + other.frames();
        if needed > self.frames() {
            self.left.resize(needed, 0.0);
            self.right.resize(needed, 0.0);
        }
        for i in 0..other.frames() {
            self.left[offset + i] += other.left[i];
            self.right[offset + i] += other.right[i];
        }
    }
}

/// Equal-power gains for a mono source at `pan` in [-1, 1], as in
/// WebAudio's StereoPannerNode.
pub fn pan_gains(pan: f64) -> (f64, f64) {
    let x = (pan.clamp(-1.0, 1.0) + 1.0) / 2.0;
    ((x * FRAC_PI_2).cos(), (x * FRAC_PI_2).sin())
}

/// A summing stereo mixer for one render block.
#[derive(Debug, Clone)]
pub struct Mixer {
    pub master_gain: f64,
    left: Vec<f64>,
    right: Vec<f64>,
}

impl Mixer {
    pub fn new(master_gain: f64) -> Self {
        Mixer {
            master_gain,
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    /// Prepare a block of `num_samples` zeros.
    pub fn clear(&mut self, num_samples: usize) {
        self.left.clear();
        self.left.resize(num_samples, 0.0);
        self.right.clear();
        self.right.resize(num_samples, 0.0);
    }

    /// Add a mono sample at `index`, spread by `pan`.
    pub fn add(&mut self, index: usize, sample: f64, pan: f64) {
        if index < self.left.len() {
            let (gl, gr) = pan_gains(pan);
            self.left[index] += sample * gl;
            self.right[index] += sample * gr;
        }
    }

    /// Append the block to `out` with master gain and soft clipping applied.
    pub fn drain_into(&self, out: &mut StereoBuffer) {
        out.left
            .extend(self.left.iter().map(|&s| soft_clip(s * self.master_gain) as f32));
        out.right
            .extend(self.right.iter().map(|&s| soft_clip(s * self.master_gain) as f32));
    }

    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Soft clipper using tanh to prevent harsh digital clipping.
fn soft_clip(x: f64) -> f64 {
    x.tanh()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pan_is_equal_power() {
        let (l, r) = pan_gains(0.0);
        assert!((l - r).abs() < 1e-12);
        assert!((l * l + r * r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn hard_pan() {
        let (l, r) = pan_gains(-1.0);
        assert!((l - 1.0).abs() < 1e-12 && r.abs() < 1e-12);
        let (l, r) = pan_gains(5.0);
        assert!(l.abs() < 1e-12 && (r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn accumulates_and_clips() {
        let mut m = Mixer::new(1.0);
        m.clear(3);
        m.add(0, 0.5, -1.0);
        m.add(0, 0.3, -1.0);
        m.add(1, 100.0, 0.0);
        let mut out = StereoBuffer::silent(0, 44100);
        m.drain_into(&mut out);
        assert_eq!(out.frames(), 3);
        assert!((out.left[0] - 0.8_f64.tanh() as f32).abs() < 1e-6);
        assert!(out.right[0].abs() < 1e-6);
        assert!(out.left[1] <= 1.0 && out.right[1] <= 1.0);
        assert_eq!(out.left[2], 0.0);
    }

    #[test]
    fn mix_in_grows_and_sums() {
        let mut a = StereoBuffer::silent(2, 10);
        a.left[0] = 0.25;
        let mut b = StereoBuffer::silent(3, 10);
        b.left = vec![0.5, 0.5, 0.5];
        a.mix_in(&b, 1);
        assert_eq!(a.frames(), 4);
        assert_eq!(a.left, vec![0.25, 0.5, 0.5, 0.5]);
        assert_eq!(a.interleaved().len(), 8);
        assert_eq!(a.peak(), 0.5);
    }
}
