//! DSP: pure Rust rendering of short sound-effect graphs.
//!
//! Effects are described as WebAudio-style node graphs (sources, gain
//! automation, biquad filters, stereo panning) and rendered offline to PCM,
//! so the same code backs the browser build and native hosts.

pub mod envelope;
pub mod filter;
pub mod graph;
pub mod mixer;
pub mod noise;
pub mod oscillator;
pub mod param;
pub mod pitch;
pub mod renderer;
pub mod sampler;
