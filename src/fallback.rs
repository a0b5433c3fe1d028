//! The fallback beep played whenever the intended sound cannot be.

use crate::config::BeepConfig;
use crate::context::ContextHandle;
use crate::dsp::graph::{AudioGraph, SourceNode};
use crate::dsp::oscillator::Waveform;
use crate::dsp::param::AudioParam;
use crate::output::{AudioOutput, RenderedSound};

pub const BEEP_LABEL: &str = "beep";

/// Why a beep produced no sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilentReason {
    ContextUnavailable,
    OutputRejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeepOutcome {
    Played,
    Silent(SilentReason),
}

/// A short fixed tone at constant gain.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackTone {
    pub waveform: Waveform,
    pub frequency: f64,
    pub duration: f64,
    pub gain: f64,
}

impl Default for FallbackTone {
    fn default() -> Self {
        FallbackTone::from_config(&BeepConfig::default())
    }
}

impl FallbackTone {
    pub fn from_config(config: &BeepConfig) -> Self {
        FallbackTone {
            waveform: config.waveform,
            frequency: config.frequency,
            duration: config.duration,
            gain: config.gain,
        }
    }

    pub fn graph(&self, start: f64) -> AudioGraph {
        let mut gain = AudioParam::new(0.0);
        gain.set_value_at_time(self.gain, start);

        let mut graph = AudioGraph::new(BEEP_LABEL);
        graph.push(
            SourceNode::oscillator(self.waveform, self.frequency, start, start + self.duration)
                .with_gain(gain),
        );
        graph
    }

    /// Bring up the shared context if needed and play the beep. Failures are
    /// logged and reported, never propagated.
    pub fn play(
        &self,
        context: &mut ContextHandle,
        output: &mut dyn AudioOutput,
        master_gain: f64,
    ) -> BeepOutcome {
        let ctx = match context.ensure_running() {
            Ok(ctx) => ctx,
            Err(e) => {
                log::warn!("Fallback beep unavailable: {e}");
                return BeepOutcome::Silent(SilentReason::ContextUnavailable);
            }
        };

        let start = ctx.current_time();
        let buffer = self.graph(start).render(ctx.sample_rate(), master_gain);
        let sound = RenderedSound {
            label: BEEP_LABEL.to_string(),
            start_time: start,
            buffer,
        };
        match output.play(sound) {
            Ok(()) => BeepOutcome::Played,
            Err(e) => {
                log::warn!("Fallback beep rejected: {e}");
                BeepOutcome::Silent(SilentReason::OutputRejected)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SoundboardConfig;
    use crate::context::AudioContext;
    use crate::error::SoundboardError;
    use crate::output::MemoryOutput;

    #[test]
    fn default_is_880hz_square_for_120ms() {
        let tone = FallbackTone::default();
        assert_eq!(tone.waveform, Waveform::Square);
        assert_eq!(tone.frequency, 880.0);
        let graph = tone.graph(0.0);
        assert_eq!(graph.len(), 1);
        assert!((graph.end_time() - 0.12).abs() < 1e-12);
    }

    #[test]
    fn play_renders_into_output() {
        let mut context = ContextHandle::from_config(&SoundboardConfig::default());
        let mut output = MemoryOutput::new();
        let outcome = FallbackTone::default().play(&mut context, &mut output, 1.0);
        assert_eq!(outcome, BeepOutcome::Played);
        assert_eq!(output.labels(), vec![BEEP_LABEL]);

        let buffer = &output.sounds()[0].buffer;
        assert_eq!(buffer.frames(), 5292);
        assert!(buffer.peak() > 0.1);
    }

    #[test]
    fn missing_context_is_silent() {
        let mut context = ContextHandle::new(|| -> Result<AudioContext, SoundboardError> {
            Err(SoundboardError::ContextUnavailable {
                reason: "headless".to_string(),
            })
        });
        let mut output = MemoryOutput::new();
        let outcome = FallbackTone::default().play(&mut context, &mut output, 1.0);
        assert_eq!(outcome, BeepOutcome::Silent(SilentReason::ContextUnavailable));
        assert!(output.is_empty());
    }

    #[test]
    fn rejected_output_is_silent() {
        struct Blocked;
        impl AudioOutput for Blocked {
            fn play(&mut self, sound: RenderedSound) -> Result<(), SoundboardError> {
                Err(SoundboardError::Playback {
                    label: sound.label,
                    reason: "autoplay blocked".to_string(),
                })
            }
        }
        let mut context = ContextHandle::from_config(&SoundboardConfig::default());
        let outcome = FallbackTone::default().play(&mut context, &mut Blocked, 1.0);
        assert_eq!(outcome, BeepOutcome::Silent(SilentReason::OutputRejected));
    }
}
