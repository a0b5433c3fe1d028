use std::fmt;
use std::path::PathBuf;

use crate::sound::SoundName;

#[derive(Debug)]
pub enum SoundboardError {
    /// An identifier that is not registered in the dispatch table.
    UnknownSound { name: String },
    /// A sound asset could not be read or decoded.
    AssetLoad { name: SoundName, path: PathBuf, reason: String },
    /// The output refused to play a rendered buffer.
    Playback { label: String, reason: String },
    /// The platform could not provide an audio context.
    ContextUnavailable { reason: String },
    Config(ConfigError),
    Decode(DecodeError),
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    InvalidSampleRate(u32),
    InvalidBeep { field: &'static str, value: f64 },
    InvalidGain(f64),
    EmptyExtension,
    UnknownSoundName(String),
}

#[derive(Debug)]
pub enum DecodeError {
    UnsupportedFormat { extension: String },
    Malformed { reason: String },
    Empty,
}

impl fmt::Display for SoundboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundboardError::UnknownSound { name } => write!(f, "Unknown sound name: {name}"),
            SoundboardError::AssetLoad { name, path, reason } => {
                write!(f, "Could not load '{name}' from {}: {reason}", path.display())
            }
            SoundboardError::Playback { label, reason } => {
                write!(f, "Could not play '{label}': {reason}")
            }
            SoundboardError::ContextUnavailable { reason } => {
                write!(f, "Audio context unavailable: {reason}")
            }
            SoundboardError::Config(e) => write!(f, "Config error: {e}"),
            SoundboardError::Decode(e) => write!(f, "Decode error: {e}"),
        }
    }
}

impl std::error::Error for SoundboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SoundboardError::Config(e) => Some(e),
            SoundboardError::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "invalid JSON: {e}"),
            ConfigError::InvalidSampleRate(sr) => write!(f, "sample rate must be positive, got {sr}"),
            ConfigError::InvalidBeep { field, value } => {
                write!(f, "beep.{field} must be positive, got {value}")
            }
            ConfigError::InvalidGain(g) => write!(f, "gain must be within [0, 1], got {g}"),
            ConfigError::EmptyExtension => write!(f, "asset extension must not be empty"),
            ConfigError::UnknownSoundName(name) => write!(f, "'{name}' is not a known sound name"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnsupportedFormat { extension } => {
                write!(f, "unsupported asset format '.{extension}'")
            }
            DecodeError::Malformed { reason } => write!(f, "malformed audio data: {reason}"),
            DecodeError::Empty => write!(f, "audio data contains no samples"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<ConfigError> for SoundboardError {
    fn from(e: ConfigError) -> Self {
        SoundboardError::Config(e)
    }
}

impl From<DecodeError> for SoundboardError {
    fn from(e: DecodeError) -> Self {
        SoundboardError::Decode(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}
