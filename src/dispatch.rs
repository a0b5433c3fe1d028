//! The dispatch table: sound identifier to effect or asset.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::SoundboardConfig;
use crate::dsp::sampler::SampleBuffer;
use crate::effects::{self, EffectDefinition};
use crate::error::ConfigError;
use crate::sound::SoundName;

/// Load state of an asset. `Missing` is terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    Unknown,
    Loaded(Arc<SampleBuffer>),
    Missing,
}

#[derive(Debug, Clone)]
pub struct SoundResource {
    name: SoundName,
    path: PathBuf,
    availability: Availability,
}

impl SoundResource {
    pub fn new(name: SoundName, path: impl Into<PathBuf>) -> Self {
        SoundResource {
            name,
            path: path.into(),
            availability: Availability::Unknown,
        }
    }

    pub fn name(&self) -> SoundName {
        self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    pub fn is_missing(&self) -> bool {
        self.availability == Availability::Missing
    }

    /// Record a successful load. Ignored once the resource is missing.
    pub fn mark_loaded(&mut self, buffer: Arc<SampleBuffer>) {
        if !self.is_missing() {
            self.availability = Availability::Loaded(buffer);
        }
    }

    pub fn mark_missing(&mut self) {
        self.availability = Availability::Missing;
    }
}

#[derive(Debug, Clone)]
pub enum DispatchEntry {
    Effect(EffectDefinition),
    Resource(SoundResource),
}

/// Built once at startup; only resource availability changes afterwards.
#[derive(Debug, Clone, Default)]
pub struct DispatchTable {
    entries: HashMap<SoundName, DispatchEntry>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// All six stock effects.
    pub fn synthesis() -> Self {
        let mut table = DispatchTable::new();
        for def in effects::stock() {
            table.register_effect(def);
        }
        table
    }

    /// One resource per configured name at `<soundsDir>/<name>.<ext>`.
    pub fn file_playback(config: &SoundboardConfig) -> Result<Self, ConfigError> {
        let mut table = DispatchTable::new();
        for name in config.registered_names()? {
            let path = name.asset_path(&config.sounds_dir, &config.asset_extension);
            table.register_resource(SoundResource::new(name, path));
        }
        Ok(table)
    }

    pub fn register_effect(&mut self, def: EffectDefinition) {
        self.entries.insert(def.name, DispatchEntry::Effect(def));
    }

    pub fn register_resource(&mut self, resource: SoundResource) {
        self.entries
            .insert(resource.name(), DispatchEntry::Resource(resource));
    }

    /// Resolve an attribute value. `None` for identifiers outside the closed
    /// set or not registered in this table.
    pub fn resolve(&self, identifier: &str) -> Option<(SoundName, &DispatchEntry)> {
        let name: SoundName = identifier.parse().ok()?;
        self.entries.get(&name).map(|entry| (name, entry))
    }

    pub fn get(&self, name: SoundName) -> Option<&DispatchEntry> {
        self.entries.get(&name)
    }

    pub fn resource_mut(&mut self, name: SoundName) -> Option<&mut SoundResource> {
        match self.entries.get_mut(&name)? {
            DispatchEntry::Resource(resource) => Some(resource),
            DispatchEntry::Effect(_) => None,
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<SoundName> {
        let mut names: Vec<SoundName> = self.entries.keys().copied().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
