//! The six stock sound effects.
//!
//! Each effect is a plain function from an [`EffectContext`] and a freshly
//! seeded RNG to an [`AudioGraph`]. Effects hold no state, so invoking one
//! twice yields two unrelated graphs.

use std::ops::RangeInclusive;

use rand::Rng;
use rand_pcg::Pcg32;

use crate::dsp::envelope::Envelope;
use crate::dsp::filter::FilterType;
use crate::dsp::graph::{AudioGraph, FilterStage, Lfo, SourceNode};
use crate::dsp::noise::NoiseBuffer;
use crate::dsp::oscillator::Waveform;
use crate::dsp::param::AudioParam;
use crate::dsp::pitch::note_to_frequency;
use crate::sound::SoundName;

/// Where and how fast an effect is rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectContext {
    pub sample_rate: u32,
    /// Context time at which the effect begins.
    pub start: f64,
}

pub type EffectFn = fn(&EffectContext, &mut Pcg32) -> AudioGraph;

#[derive(Clone, Copy)]
pub struct EffectDefinition {
    pub name: SoundName,
    pub synthesize: EffectFn,
}

impl std::fmt::Debug for EffectDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectDefinition").field("name", &self.name).finish()
    }
}

impl EffectDefinition {
    pub fn synthesize(&self, ctx: &EffectContext, rng: &mut Pcg32) -> AudioGraph {
        (self.synthesize)(ctx, rng)
    }
}

pub fn definition(name: SoundName) -> EffectDefinition {
    let synthesize: EffectFn = match name {
        SoundName::Applause => applause,
        SoundName::Boo => boo,
        SoundName::Gasp => gasp,
        SoundName::Tada => tada,
        SoundName::Victory => victory,
        SoundName::Wrong => wrong,
    };
    EffectDefinition { name, synthesize }
}

/// Definitions for every stock effect.
pub fn stock() -> Vec<EffectDefinition> {
    SoundName::ALL.into_iter().map(definition).collect()
}

// ── applause ────────────────────────────────────────────────

pub const APPLAUSE_GRAINS: RangeInclusive<usize> = 30..=70;
pub const APPLAUSE_WINDOW: RangeInclusive<f64> = 1.0..=1.5;
pub const APPLAUSE_GRAIN_LENGTH: RangeInclusive<f64> = 0.02..=0.05;

/// Stochastic clapping: many short bandpassed noise grains scattered over
/// the window, each with its own gain and stereo position.
pub fn applause(ctx: &EffectContext, rng: &mut Pcg32) -> AudioGraph {
    let sr = ctx.sample_rate as f64;
    let mut graph = AudioGraph::new(SoundName::Applause.as_str());

    let grains = rng.random_range(APPLAUSE_GRAINS);
    let window = rng.random_range(APPLAUSE_WINDOW);
    for _ in 0..grains {
        let start = ctx.start + rng.random_range(0.0..window);
        let length = rng.random_range(APPLAUSE_GRAIN_LENGTH);
        let peak = rng.random_range(0.15..=0.5);
        let center = rng.random_range(1200.0..=2400.0);
        let pan = rng.random_range(-0.8..=0.8);

        let mut gain = AudioParam::new(0.0);
        gain.set_value_at_time(peak, start)
            .exponential_ramp_to(0.001, start + length);

        let noise = NoiseBuffer::white(length, sr, rng);
        graph.push(
            SourceNode::noise(noise, start, start + length)
                .with_filter(FilterStage::new(FilterType::Bandpass, center).with_q(0.9))
                .with_gain(gain)
                .with_pan(pan),
        );
    }
    graph
}

// ── gasp ────────────────────────────────────────────────────

const GASP_LENGTH: f64 = 0.22;

/// A breath intake: noise through a highpass whose cutoff sweeps upward.
pub fn gasp(ctx: &EffectContext, rng: &mut Pcg32) -> AudioGraph {
    let start = ctx.start;
    let end = start + GASP_LENGTH;

    let mut highpass = FilterStage::new(FilterType::Highpass, 400.0);
    highpass
        .frequency
        .set_value_at_time(400.0, start)
        .exponential_ramp_to(2500.0, end);

    let mut gain = AudioParam::new(0.0);
    Envelope::percussive(0.08, GASP_LENGTH - 0.08)
        .with_peak(0.5)
        .schedule(&mut gain, start, start);

    let noise = NoiseBuffer::white(GASP_LENGTH, ctx.sample_rate as f64, rng);
    let mut graph = AudioGraph::new(SoundName::Gasp.as_str());
    graph.push(
        SourceNode::noise(noise, start, end)
            .with_filter(highpass)
            .with_gain(gain),
    );
    graph
}

// ── boo ─────────────────────────────────────────────────────

const BOO_FREQUENCY: f64 = 160.0;
const BOO_LENGTH: f64 = 0.7;

/// A low square tone with a slow pitch wobble.
pub fn boo(ctx: &EffectContext, _rng: &mut Pcg32) -> AudioGraph {
    let start = ctx.start;
    let env = Envelope::new(0.05, 0.1, 0.8, 0.2).with_peak(0.25);
    let mut gain = AudioParam::new(0.0);
    env.schedule(&mut gain, start, start + BOO_LENGTH - env.release);

    let mut graph = AudioGraph::new(SoundName::Boo.as_str());
    graph.push(
        SourceNode::oscillator(Waveform::Square, BOO_FREQUENCY, start, start + BOO_LENGTH)
            .with_lfo(Lfo {
                waveform: Waveform::Sine,
                rate: 5.0,
                depth: 12.0,
            })
            .with_filter(FilterStage::new(FilterType::Lowpass, 900.0))
            .with_gain(gain),
    );
    graph
}

// ── tada ────────────────────────────────────────────────────

const TADA_NOTES: [&str; 3] = ["C5", "E5", "G5"];
pub const TADA_SPACING: f64 = 0.14;

/// Ascending major triad in triangle timbre.
pub fn tada(ctx: &EffectContext, _rng: &mut Pcg32) -> AudioGraph {
    let env = Envelope::new(0.01, 0.08, 0.6, 0.2).with_peak(0.35);
    let mut graph = AudioGraph::new(SoundName::Tada.as_str());

    for (i, freq) in TADA_NOTES.iter().filter_map(|n| note_to_frequency(n)).enumerate() {
        let start = ctx.start + i as f64 * TADA_SPACING;
        let release_at = start + 0.15;
        let mut gain = AudioParam::new(0.0);
        env.schedule(&mut gain, start, release_at);
        graph.push(
            SourceNode::oscillator(Waveform::Triangle, freq, start, env.end_time(start, release_at))
                .with_gain(gain),
        );
    }
    graph
}

// ── victory ─────────────────────────────────────────────────

const VICTORY_NOTES: [(&str, f64); 5] = [
    ("C5", 0.12),
    ("E5", 0.12),
    ("G5", 0.12),
    ("C6", 0.24),
    ("E6", 0.45),
];
/// Gap to the next note as a multiple of the current note's length.
pub const VICTORY_SPACING: f64 = 1.1;

/// Five-note square-wave fanfare; longer notes push the next one later.
pub fn victory(ctx: &EffectContext, _rng: &mut Pcg32) -> AudioGraph {
    let mut graph = AudioGraph::new(SoundName::Victory.as_str());
    let mut start = ctx.start;

    for (note, length) in VICTORY_NOTES {
        if let Some(freq) = note_to_frequency(note) {
            let env = Envelope::new(0.01, 0.04, 0.7, length * 0.3).with_peak(0.2);
            let release_at = start + length * 0.7;
            let mut gain = AudioParam::new(0.0);
            env.schedule(&mut gain, start, release_at);
            graph.push(
                SourceNode::oscillator(Waveform::Square, freq, start, env.end_time(start, release_at))
                    .with_gain(gain),
            );
        }
        start += length * VICTORY_SPACING;
    }
    graph
}

// ── wrong ───────────────────────────────────────────────────

const WRONG_FREQUENCY: f64 = 196.0;
pub const WRONG_DETUNE_RATIO: f64 = 1.01;

/// Buzzer: two slightly detuned sawtooths beating through a lowpass.
pub fn wrong(ctx: &EffectContext, _rng: &mut Pcg32) -> AudioGraph {
    let start = ctx.start;
    let env = Envelope::new(0.01, 0.05, 0.8, 0.15).with_peak(0.25);
    let release_at = start + 0.35;
    let end = env.end_time(start, release_at);

    let mut graph = AudioGraph::new(SoundName::Wrong.as_str());
    for freq in [WRONG_FREQUENCY, WRONG_FREQUENCY * WRONG_DETUNE_RATIO] {
        let mut gain = AudioParam::new(0.0);
        env.schedule(&mut gain, start, release_at);
        graph.push(
            SourceNode::oscillator(Waveform::Sawtooth, freq, start, end)
                .with_filter(FilterStage::new(FilterType::Lowpass, 1100.0))
                .with_gain(gain),
        );
    }
    graph
}
