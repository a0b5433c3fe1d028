//! ADSR envelopes expressed as gain automation.

use super::param::AudioParam;

/// ADSR envelope with linear segments, scaled by `peak`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    /// Attack time in seconds.
    pub attack: f64,
    /// Decay time in seconds.
    pub decay: f64,
    /// Sustain level [0, 1], relative to `peak`.
    pub sustain: f64,
    /// Release time in seconds.
    pub release: f64,
    /// Gain reached at the end of the attack.
    pub peak: f64,
}

impl Envelope {
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Envelope {
            attack,
            decay,
            sustain,
            release,
            peak: 1.0,
        }
    }

    /// Attack then decay to silence, no sustain or release.
    pub fn percussive(attack: f64, decay: f64) -> Self {
        Envelope::new(attack, decay, 0.0, 0.0)
    }

    pub fn with_peak(mut self, peak: f64) -> Self {
        self.peak = peak;
        self
    }

    /// Write the envelope into `param` for a note starting at `start` and
    /// released at `release_at`. Release never begins before the decay ends.
    pub fn schedule(&self, param: &mut AudioParam, start: f64, release_at: f64) {
        let attack_end = start + self.attack;
        let decay_end = attack_end + self.decay;
        let sustain_level = self.peak * self.sustain;
        let release_start = release_at.max(decay_end);

        param
            .set_value_at_time(0.0, start)
            .linear_ramp_to(self.peak, attack_end)
            .linear_ramp_to(sustain_level, decay_end)
            .set_value_at_time(sustain_level, release_start)
            .linear_ramp_to(0.0, release_start + self.release);
    }

    /// Time at which a note scheduled with [`Envelope::schedule`] falls silent.
    pub fn end_time(&self, start: f64, release_at: f64) -> f64 {
        release_at.max(start + self.attack + self.decay) + self.release
    }
}
