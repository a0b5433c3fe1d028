pub mod assets;
pub mod board;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod dsp;
pub mod effects;
pub mod error;
pub mod fallback;
pub mod output;
pub mod sound;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use wasm_bindgen::prelude::*;

use crate::board::{Soundboard, TriggerOutcome};
use crate::config::SoundboardConfig;
use crate::dsp::graph::AudioGraph;
use crate::dsp::mixer::StereoBuffer;
use crate::effects::EffectContext;
use crate::error::SoundboardError;
use crate::output::{MemoryOutput, RenderedSound};
use crate::sound::SoundName;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the soundboard-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: the closed set of sound identifiers.
#[wasm_bindgen]
pub fn sound_names() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&SoundName::ALL).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// Synthesize one stock effect starting at time zero.
pub fn synthesize_effect(name: &str, sample_rate: u32, seed: u64) -> Result<AudioGraph, SoundboardError> {
    let name: SoundName = name.parse().map_err(|e: sound::UnknownSoundName| {
        SoundboardError::UnknownSound { name: e.0 }
    })?;
    let ctx = EffectContext {
        sample_rate,
        start: 0.0,
    };
    let mut rng = Pcg32::seed_from_u64(seed);
    Ok(effects::definition(name).synthesize(&ctx, &mut rng))
}

/// WASM-exposed: render an effect to interleaved stereo f32 samples.
#[wasm_bindgen]
pub fn render_effect_samples(name: &str, sample_rate: u32, seed: u64) -> Result<Vec<f32>, JsValue> {
    let graph = synthesize_effect(name, sample_rate, seed).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(graph.render(sample_rate, 1.0).interleaved())
}

/// WASM-exposed: render an effect to a WAV byte array.
#[wasm_bindgen]
pub fn render_effect_wav(name: &str, sample_rate: u32, seed: u64) -> Result<Vec<u8>, JsValue> {
    let graph = synthesize_effect(name, sample_rate, seed).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(dsp::renderer::render_wav(&graph, sample_rate, 1.0))
}

/// WASM-exposed synthesis soundboard. Each trigger returns the interleaved
/// stereo samples to play from the current context time, or an empty vector
/// when nothing could be played.
#[wasm_bindgen]
pub struct WebSoundboard {
    inner: Soundboard<MemoryOutput>,
}

#[wasm_bindgen]
impl WebSoundboard {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WebSoundboard, JsValue> {
        let config = if config_json.trim().is_empty() {
            SoundboardConfig::default()
        } else {
            SoundboardConfig::from_json(config_json).map_err(|e| JsValue::from_str(&format!("{e}")))?
        };
        let inner = Soundboard::synthesis(config, MemoryOutput::new())
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        Ok(WebSoundboard { inner })
    }

    /// Bring the context up from a user gesture.
    pub fn resume(&mut self) -> Result<(), JsValue> {
        self.inner
            .context_mut()
            .ensure_running()
            .map(|_| ())
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    #[wasm_bindgen(getter, js_name = sampleRate)]
    pub fn sample_rate(&self) -> u32 {
        self.inner.config().sample_rate
    }

    /// Advance the context clock by the time the host has played.
    pub fn advance(&mut self, seconds: f64) {
        if let Some(ctx) = self.inner.context_mut().get_mut() {
            ctx.advance(seconds);
        }
    }

    pub fn trigger(&mut self, name: &str) -> Vec<f32> {
        let outcome = self.inner.trigger(name);
        if let TriggerOutcome::Fallback { reason, .. } = &outcome {
            log::info!("'{name}' fell back to the beep: {reason:?}");
        }
        let now = self.inner.context().get().map_or(0.0, |ctx| ctx.current_time());
        self.inner
            .output_mut()
            .take()
            .first()
            .map(|sound| samples_from(now, sound))
            .unwrap_or_default()
    }
}

/// Interleaved samples of `sound` as heard from context time `now`, with
/// leading silence up to its start time.
fn samples_from(now: f64, sound: &RenderedSound) -> Vec<f32> {
    let sample_rate = sound.buffer.sample_rate;
    let lead = ((sound.start_time - now).max(0.0) * sample_rate as f64).round() as usize;
    let mut padded = StereoBuffer::silent(0, sample_rate);
    padded.mix_in(&sound.buffer, lead);
    padded.interleaved()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_matches_cargo() {
        assert_eq!(core_version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn synthesize_effect_by_name() {
        let graph = synthesize_effect("victory", 8000, 1).unwrap();
        assert_eq!(graph.label(), "victory");
        assert_eq!(graph.len(), 5);
        assert!(matches!(
            synthesize_effect("ufo", 8000, 1),
            Err(SoundboardError::UnknownSound { .. })
        ));
    }

    #[test]
    fn same_seed_same_samples() {
        let a = synthesize_effect("applause", 8000, 9).unwrap().render(8000, 1.0);
        let b = synthesize_effect("applause", 8000, 9).unwrap().render(8000, 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn web_soundboard_returns_one_buffer_per_trigger() {
        let mut board = WebSoundboard::new(r#"{"sampleRate": 8000, "seed": 3}"#).unwrap();
        assert_eq!(board.sample_rate(), 8000);
        let tada = board.trigger("tada");
        assert!(!tada.is_empty());
        assert_eq!(tada.len() % 2, 0);

        let beep = board.trigger("ufo");
        assert_eq!(beep.len(), 2 * 960);
    }

    #[test]
    fn late_start_is_padded_with_silence() {
        let mut buffer = StereoBuffer::silent(4, 1000);
        buffer.left.iter_mut().for_each(|s| *s = 0.5);
        let sound = RenderedSound {
            label: "applause".to_string(),
            start_time: 2.003,
            buffer,
        };
        let samples = samples_from(2.0, &sound);
        assert_eq!(samples.len(), 2 * 7);
        assert!(samples[..6].iter().all(|&s| s == 0.0));
        assert_eq!(samples[6], 0.5);
        assert_eq!(samples[7], 0.0);

        assert_eq!(samples_from(2.003, &sound).len(), 2 * 4);
    }

    #[test]
    fn samples_are_relative_to_the_context_clock() {
        let mut fresh = WebSoundboard::new(r#"{"sampleRate": 8000}"#).unwrap();
        let mut later = WebSoundboard::new(r#"{"sampleRate": 8000}"#).unwrap();
        later.resume().unwrap();
        later.advance(1.0);
        let a = fresh.trigger("tada");
        let b = later.trigger("tada");
        assert_eq!(a.len(), b.len());
        assert!(b[..2].iter().all(|s| s.is_finite()));
    }
}
