//! Click dispatcher: element -> identifier -> effect, asset or beep.

use std::sync::Arc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::assets::AssetLoader;
use crate::config::SoundboardConfig;
use crate::context::{ContextFactory, ContextHandle};
use crate::dispatch::{Availability, DispatchEntry, DispatchTable};
use crate::dsp::graph::{AudioGraph, SourceNode};
use crate::effects::{EffectContext, EffectDefinition};
use crate::error::SoundboardError;
use crate::fallback::{BeepOutcome, FallbackTone, SilentReason};
use crate::output::{AudioOutput, RenderedSound};
use crate::sound::SoundName;

// ── Elements ────────────────────────────────────────────────

/// The minimal view of a UI element the dispatcher needs.
pub trait UiElement {
    fn attribute(&self, name: &str) -> Option<&str>;
    fn parent(&self) -> Option<&dyn UiElement>;
}

/// Nearest ancestor-or-self carrying `attribute`.
pub fn closest<'a>(element: &'a dyn UiElement, attribute: &str) -> Option<&'a dyn UiElement> {
    let mut current = Some(element);
    while let Some(el) = current {
        if el.attribute(attribute).is_some() {
            return Some(el);
        }
        current = el.parent();
    }
    None
}

/// An element and its ancestor chain, as reported with a click.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementNode {
    pub tag: String,
    attributes: Vec<(String, String)>,
    parent: Option<Box<ElementNode>>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        ElementNode {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Place this element inside `parent`.
    pub fn inside(mut self, parent: ElementNode) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }
}

impl UiElement for ElementNode {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn parent(&self) -> Option<&dyn UiElement> {
        self.parent.as_deref().map(|p| p as &dyn UiElement)
    }
}

// ── Outcomes ────────────────────────────────────────────────

/// Why the beep was played instead of the requested sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    UnknownSound(String),
    /// Loading failed on this trigger; the resource is now missing.
    AssetLoadFailed(SoundName),
    /// Loading failed on an earlier trigger; no new attempt was made.
    AssetMissing(SoundName),
    PlaybackRejected(SoundName),
}

/// What a click or trigger did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// No element in the chain carried the sound attribute.
    Ignored,
    Played(SoundName),
    Synthesized(SoundName),
    Fallback {
        reason: FallbackReason,
        beep: BeepOutcome,
    },
    Silent(SilentReason),
}

// ── Soundboard ──────────────────────────────────────────────

pub struct Soundboard<O: AudioOutput> {
    config: SoundboardConfig,
    table: DispatchTable,
    context: ContextHandle,
    loader: Option<Box<dyn AssetLoader>>,
    beep: FallbackTone,
    output: O,
}

impl<O: AudioOutput> Soundboard<O> {
    /// Synthesis variant: every stock effect registered.
    pub fn synthesis(config: SoundboardConfig, output: O) -> Result<Self, SoundboardError> {
        config.validate()?;
        Ok(Soundboard::with_table(config, DispatchTable::synthesis(), None, output))
    }

    /// File-playback variant: one asset per configured name.
    pub fn file_playback(
        config: SoundboardConfig,
        loader: impl AssetLoader + 'static,
        output: O,
    ) -> Result<Self, SoundboardError> {
        config.validate()?;
        let table = DispatchTable::file_playback(&config)?;
        Ok(Soundboard::with_table(config, table, Some(Box::new(loader)), output))
    }

    fn with_table(
        config: SoundboardConfig,
        table: DispatchTable,
        loader: Option<Box<dyn AssetLoader>>,
        output: O,
    ) -> Self {
        Soundboard {
            context: ContextHandle::from_config(&config),
            beep: FallbackTone::from_config(&config.beep),
            config,
            table,
            loader,
            output,
        }
    }

    /// Replace how the shared audio context is created.
    pub fn with_context_factory(mut self, factory: impl ContextFactory + 'static) -> Self {
        self.context = ContextHandle::new(factory);
        self
    }

    pub fn config(&self) -> &SoundboardConfig {
        &self.config
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn context(&self) -> &ContextHandle {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ContextHandle {
        &mut self.context
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Handle a click on `target`.
    pub fn click(&mut self, target: &dyn UiElement) -> TriggerOutcome {
        let attribute = self.config.attribute.as_str();
        let identifier = closest(target, attribute).and_then(|el| el.attribute(attribute));
        match identifier {
            Some(identifier) => {
                let identifier = identifier.to_string();
                self.trigger(&identifier)
            }
            None => TriggerOutcome::Ignored,
        }
    }

    /// Play whatever `identifier` maps to.
    pub fn trigger(&mut self, identifier: &str) -> TriggerOutcome {
        let Some((name, entry)) = self.table.resolve(identifier) else {
            log::error!(
                "Unknown sound name: {identifier}. Register it and provide {identifier}.{}",
                self.config.asset_extension
            );
            return self.fallback(FallbackReason::UnknownSound(identifier.to_string()));
        };
        log::debug!("dispatching '{name}'");

        match entry {
            DispatchEntry::Effect(def) => {
                let def = *def;
                self.synthesize(def)
            }
            DispatchEntry::Resource(_) => self.play_resource(name),
        }
    }

    fn synthesize(&mut self, def: EffectDefinition) -> TriggerOutcome {
        let ctx = match self.context.ensure_running() {
            Ok(ctx) => ctx,
            Err(e) => {
                log::warn!("Cannot synthesize '{}': {e}", def.name);
                return TriggerOutcome::Silent(SilentReason::ContextUnavailable);
            }
        };
        let effect_ctx = EffectContext {
            sample_rate: ctx.sample_rate(),
            start: ctx.current_time(),
        };
        let mut rng = Pcg32::seed_from_u64(ctx.next_seed());
        let graph = def.synthesize(&effect_ctx, &mut rng);

        match self.render_and_play(graph) {
            Ok(()) => TriggerOutcome::Synthesized(def.name),
            Err(e) => {
                log::error!("{e}");
                self.fallback(FallbackReason::PlaybackRejected(def.name))
            }
        }
    }

    fn play_resource(&mut self, name: SoundName) -> TriggerOutcome {
        let Some(resource) = self.table.resource_mut(name) else {
            return self.fallback(FallbackReason::UnknownSound(name.to_string()));
        };

        let buffer = match resource.availability() {
            Availability::Missing => None,
            Availability::Loaded(buffer) => Some(Ok(buffer.clone())),
            Availability::Unknown => {
                let loaded = match self.loader.as_mut() {
                    Some(loader) => loader.load(name, resource.path()),
                    None => Err(SoundboardError::AssetLoad {
                        name,
                        path: resource.path().to_path_buf(),
                        reason: "no asset loader configured".to_string(),
                    }),
                };
                match loaded {
                    Ok(buffer) => {
                        let buffer = Arc::new(buffer);
                        resource.mark_loaded(buffer.clone());
                        Some(Ok(buffer))
                    }
                    Err(e) => {
                        log::error!("Missing or unreachable: {} ({e})", resource.path().display());
                        resource.mark_missing();
                        Some(Err(()))
                    }
                }
            }
        };

        let buffer = match buffer {
            Some(Ok(buffer)) => buffer,
            Some(Err(())) => return self.fallback(FallbackReason::AssetLoadFailed(name)),
            None => return self.fallback(FallbackReason::AssetMissing(name)),
        };

        let start = match self.context.ensure_running() {
            Ok(ctx) => ctx.current_time(),
            Err(e) => {
                log::warn!("Cannot play '{name}': {e}");
                return TriggerOutcome::Silent(SilentReason::ContextUnavailable);
            }
        };
        let mut graph = AudioGraph::new(name.as_str());
        graph.push(SourceNode::buffer(buffer, start));

        match self.render_and_play(graph) {
            Ok(()) => TriggerOutcome::Played(name),
            Err(e) => {
                log::error!("{e}");
                self.fallback(FallbackReason::PlaybackRejected(name))
            }
        }
    }

    fn render_and_play(&mut self, graph: AudioGraph) -> Result<(), SoundboardError> {
        let sample_rate = self
            .context
            .get()
            .map_or(self.config.sample_rate, |ctx| ctx.sample_rate());
        let sound = RenderedSound {
            label: graph.label().to_string(),
            start_time: graph.start_time(),
            buffer: graph.render(sample_rate, self.config.master_gain),
        };
        self.output.play(sound)
    }

    fn fallback(&mut self, reason: FallbackReason) -> TriggerOutcome {
        let beep = self
            .beep
            .play(&mut self.context, &mut self.output, self.config.master_gain);
        TriggerOutcome::Fallback { reason, beep }
    }
}

impl<O: AudioOutput + std::fmt::Debug> std::fmt::Debug for Soundboard<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Soundboard")
            .field("config", &self.config)
            .field("table", &self.table)
            .field("context", &self.context)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AudioContext;
    use crate::dsp::sampler::SampleBuffer;
    use crate::output::MemoryOutput;
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;

    fn config() -> SoundboardConfig {
        SoundboardConfig {
            sample_rate: 8000,
            seed: Some(11),
            ..SoundboardConfig::default()
        }
    }

    fn synth_board() -> Soundboard<MemoryOutput> {
        Soundboard::synthesis(config(), MemoryOutput::new()).unwrap()
    }

    #[test]
    fn closest_walks_ancestors() {
        let icon = ElementNode::new("span")
            .inside(ElementNode::new("button").with_attribute("data-sound", "tada").inside(ElementNode::new("body")));
        let found = closest(&icon, "data-sound").unwrap();
        assert_eq!(found.attribute("data-sound"), Some("tada"));
        assert!(closest(&ElementNode::new("div"), "data-sound").is_none());
    }

    #[test]
    fn click_without_attribute_is_ignored() {
        let mut board = synth_board();
        let outcome = board.click(&ElementNode::new("p").inside(ElementNode::new("body")));
        assert_eq!(outcome, TriggerOutcome::Ignored);
        assert!(board.output().is_empty());
        assert_eq!(board.context().state(), crate::context::ContextState::Uninitialized);
    }

    #[test]
    fn click_on_nested_child_dispatches() {
        let mut board = synth_board();
        let target = ElementNode::new("img").inside(ElementNode::new("button").with_attribute("data-sound", "boo"));
        assert_eq!(board.click(&target), TriggerOutcome::Synthesized(SoundName::Boo));
        assert_eq!(board.output().labels(), vec!["boo"]);
    }

    #[test]
    fn custom_attribute_name() {
        let mut board = Soundboard::synthesis(
            SoundboardConfig {
                attribute: "data-effect".to_string(),
                ..config()
            },
            MemoryOutput::new(),
        )
        .unwrap();
        let button = ElementNode::new("button").with_attribute("data-effect", "gasp");
        assert_eq!(board.click(&button), TriggerOutcome::Synthesized(SoundName::Gasp));
        let other = ElementNode::new("button").with_attribute("data-sound", "gasp");
        assert_eq!(board.click(&other), TriggerOutcome::Ignored);
    }

    #[test]
    fn one_invocation_per_trigger() {
        let mut board = synth_board();
        for name in SoundName::ALL {
            assert_eq!(board.trigger(name.as_str()), TriggerOutcome::Synthesized(name));
        }
        assert_eq!(board.output().len(), 6);
    }

    #[test]
    fn unknown_identifier_beeps() {
        let mut board = synth_board();
        let outcome = board.trigger("ufo");
        assert_eq!(
            outcome,
            TriggerOutcome::Fallback {
                reason: FallbackReason::UnknownSound("ufo".to_string()),
                beep: BeepOutcome::Played,
            }
        );
        assert_eq!(board.output().labels(), vec!["beep"]);
    }

    #[test]
    fn headless_synthesis_is_silent() {
        let mut board = synth_board().with_context_factory(|| -> Result<AudioContext, SoundboardError> {
            Err(SoundboardError::ContextUnavailable {
                reason: "no audio backend".to_string(),
            })
        });
        assert_eq!(
            board.trigger("tada"),
            TriggerOutcome::Silent(SilentReason::ContextUnavailable)
        );
        assert_eq!(
            board.trigger("ufo"),
            TriggerOutcome::Fallback {
                reason: FallbackReason::UnknownSound("ufo".to_string()),
                beep: BeepOutcome::Silent(SilentReason::ContextUnavailable),
            }
        );
        assert!(board.output().is_empty());
    }

    #[test]
    fn rejected_playback_falls_back() {
        #[derive(Default)]
        struct RejectEffects {
            beeps: usize,
        }
        impl AudioOutput for RejectEffects {
            fn play(&mut self, sound: RenderedSound) -> Result<(), SoundboardError> {
                if sound.label == crate::fallback::BEEP_LABEL {
                    self.beeps += 1;
                    Ok(())
                } else {
                    Err(SoundboardError::Playback {
                        label: sound.label,
                        reason: "NotAllowedError".to_string(),
                    })
                }
            }
        }

        let mut board = Soundboard::synthesis(config(), RejectEffects::default()).unwrap();
        assert_eq!(
            board.trigger("wrong"),
            TriggerOutcome::Fallback {
                reason: FallbackReason::PlaybackRejected(SoundName::Wrong),
                beep: BeepOutcome::Played,
            }
        );
        assert_eq!(board.output().beeps, 1);
    }

    #[test]
    fn rejected_asset_playback_falls_back() {
        struct AssetsBlocked {
            labels: Vec<String>,
        }
        impl AudioOutput for AssetsBlocked {
            fn play(&mut self, sound: RenderedSound) -> Result<(), SoundboardError> {
                if sound.label == crate::fallback::BEEP_LABEL {
                    self.labels.push(sound.label);
                    Ok(())
                } else {
                    Err(SoundboardError::Playback {
                        label: sound.label,
                        reason: "NotAllowedError".to_string(),
                    })
                }
            }
        }

        let loads = Rc::new(Cell::new(0));
        let counter = loads.clone();
        let loader = move |_: SoundName, _: &Path| -> Result<SampleBuffer, SoundboardError> {
            counter.set(counter.get() + 1);
            Ok(SampleBuffer::new(vec![0.5; 400], 8000))
        };
        let output = AssetsBlocked { labels: Vec::new() };
        let mut board = Soundboard::file_playback(config(), loader, output).unwrap();

        for _ in 0..2 {
            assert_eq!(
                board.trigger("applause"),
                TriggerOutcome::Fallback {
                    reason: FallbackReason::PlaybackRejected(SoundName::Applause),
                    beep: BeepOutcome::Played,
                }
            );
        }
        // A rejected play keeps the asset loaded.
        assert_eq!(loads.get(), 1);
        assert!(matches!(
            board.table().get(SoundName::Applause),
            Some(DispatchEntry::Resource(res)) if matches!(res.availability(), Availability::Loaded(_))
        ));
        assert_eq!(board.output().labels, vec!["beep", "beep"]);
    }

    #[test]
    fn asset_loaded_once_and_reused() {
        let loads = Rc::new(Cell::new(0));
        let counter = loads.clone();
        let loader = move |_: SoundName, _: &Path| -> Result<SampleBuffer, SoundboardError> {
            counter.set(counter.get() + 1);
            Ok(SampleBuffer::new(vec![0.5; 800], 8000))
        };
        let mut board = Soundboard::file_playback(config(), loader, MemoryOutput::new()).unwrap();
        assert_eq!(board.trigger("tada"), TriggerOutcome::Played(SoundName::Tada));
        assert_eq!(board.trigger("tada"), TriggerOutcome::Played(SoundName::Tada));
        assert_eq!(loads.get(), 1);
        assert_eq!(board.output().sounds()[0].buffer.frames(), 800);
    }

    #[test]
    fn missing_asset_is_never_reloaded() {
        let loads = Rc::new(Cell::new(0));
        let counter = loads.clone();
        let loader = move |name: SoundName, path: &Path| -> Result<SampleBuffer, SoundboardError> {
            counter.set(counter.get() + 1);
            Err(SoundboardError::AssetLoad {
                name,
                path: path.to_path_buf(),
                reason: "404".to_string(),
            })
        };
        let mut board = Soundboard::file_playback(config(), loader, MemoryOutput::new()).unwrap();

        assert!(matches!(
            board.trigger("boo"),
            TriggerOutcome::Fallback { reason: FallbackReason::AssetLoadFailed(SoundName::Boo), .. }
        ));
        for _ in 0..3 {
            assert!(matches!(
                board.trigger("boo"),
                TriggerOutcome::Fallback { reason: FallbackReason::AssetMissing(SoundName::Boo), .. }
            ));
        }
        assert_eq!(loads.get(), 1);
        assert_eq!(board.output().labels(), vec!["beep"; 4]);
    }

    #[test]
    fn file_board_rejects_unregistered_names() {
        let loader = |_: SoundName, _: &Path| -> Result<SampleBuffer, SoundboardError> {
            Ok(SampleBuffer::new(vec![0.1; 10], 8000))
        };
        let config = SoundboardConfig {
            sound_names: vec!["tada".to_string()],
            ..config()
        };
        let mut board = Soundboard::file_playback(config, loader, MemoryOutput::new()).unwrap();
        assert!(matches!(
            board.trigger("boo"),
            TriggerOutcome::Fallback { reason: FallbackReason::UnknownSound(_), .. }
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let bad = SoundboardConfig {
            sample_rate: 0,
            ..SoundboardConfig::default()
        };
        assert!(matches!(
            Soundboard::synthesis(bad, MemoryOutput::new()),
            Err(SoundboardError::Config(_))
        ));
    }

    #[test]
    fn effects_start_at_context_time() {
        let mut board = synth_board();
        board.trigger("tada");
        board.context_mut().get_mut().unwrap().advance(2.0);
        board.trigger("tada");
        let starts: Vec<f64> = board.output().sounds().iter().map(|s| s.start_time).collect();
        assert_eq!(starts, vec![0.0, 2.0]);
    }
}
