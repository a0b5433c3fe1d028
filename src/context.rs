//! The shared audio context and its lazily-created handle.
//!
//! Lifecycle: `Uninitialized -> Suspended <-> Running`. Platforms only let a
//! context produce sound after a user gesture, so a fresh context starts
//! suspended and every trigger goes through [`ContextHandle::ensure_running`].

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::SoundboardConfig;
use crate::error::SoundboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Uninitialized,
    Suspended,
    Running,
}

/// The audio graph host: sample rate, clock and effect seed stream.
#[derive(Debug, Clone)]
pub struct AudioContext {
    sample_rate: u32,
    running: bool,
    current_time: f64,
    seeds: Pcg32,
}

impl AudioContext {
    pub fn new(sample_rate: u32, seed: u64) -> Self {
        AudioContext {
            sample_rate,
            running: false,
            current_time: 0.0,
            seeds: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn state(&self) -> ContextState {
        if self.running {
            ContextState::Running
        } else {
            ContextState::Suspended
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn suspend(&mut self) {
        self.running = false;
    }

    /// Seconds since the context was created, as advanced by the host.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn advance(&mut self, seconds: f64) {
        self.current_time += seconds.max(0.0);
    }

    /// Seed for one effect invocation.
    pub fn next_seed(&mut self) -> u64 {
        self.seeds.next_u64()
    }
}

/// Creates the platform context. Fails when no audio backend is available.
pub trait ContextFactory {
    fn create(&mut self) -> Result<AudioContext, SoundboardError>;
}

impl<F> ContextFactory for F
where
    F: FnMut() -> Result<AudioContext, SoundboardError>,
{
    fn create(&mut self) -> Result<AudioContext, SoundboardError> {
        self()
    }
}

/// Always succeeds with the configured sample rate and seed.
#[derive(Debug, Clone)]
pub struct DefaultContextFactory {
    pub sample_rate: u32,
    pub seed: u64,
}

impl ContextFactory for DefaultContextFactory {
    fn create(&mut self) -> Result<AudioContext, SoundboardError> {
        Ok(AudioContext::new(self.sample_rate, self.seed))
    }
}

/// Lazily creates the shared context on first use and never destroys it.
pub struct ContextHandle {
    factory: Box<dyn ContextFactory>,
    context: Option<AudioContext>,
}

impl ContextHandle {
    pub fn new(factory: impl ContextFactory + 'static) -> Self {
        ContextHandle {
            factory: Box::new(factory),
            context: None,
        }
    }

    pub fn from_config(config: &SoundboardConfig) -> Self {
        ContextHandle::new(DefaultContextFactory {
            sample_rate: config.sample_rate,
            seed: config.seed(),
        })
    }

    pub fn state(&self) -> ContextState {
        self.context
            .as_ref()
            .map_or(ContextState::Uninitialized, AudioContext::state)
    }

    pub fn get(&self) -> Option<&AudioContext> {
        self.context.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut AudioContext> {
        self.context.as_mut()
    }

    /// Create the context if needed and resume it. Idempotent.
    ///
    /// A failed creation stores nothing, so the next gesture tries again.
    pub fn ensure_running(&mut self) -> Result<&mut AudioContext, SoundboardError> {
        if self.context.is_none() {
            let created = self.factory.create()?;
            log::debug!("audio context created at {} Hz", created.sample_rate());
            self.context = Some(created);
        }
        let context = self.context.as_mut().ok_or_else(|| SoundboardError::ContextUnavailable {
            reason: "context missing after creation".to_string(),
        })?;
        if !context.is_running() {
            context.resume();
            log::debug!("audio context resumed");
        }
        Ok(context)
    }
}

impl std::fmt::Debug for ContextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextHandle")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
