//! The closed set of sound identifiers a soundboard element can carry.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A registered sound identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundName {
    Applause,
    Boo,
    Gasp,
    Tada,
    Victory,
    Wrong,
}

impl SoundName {
    /// Every sound name, in identifier order.
    pub const ALL: [SoundName; 6] = [
        SoundName::Applause,
        SoundName::Boo,
        SoundName::Gasp,
        SoundName::Tada,
        SoundName::Victory,
        SoundName::Wrong,
    ];

    /// The identifier as it appears in a `data-sound` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundName::Applause => "applause",
            SoundName::Boo => "boo",
            SoundName::Gasp => "gasp",
            SoundName::Tada => "tada",
            SoundName::Victory => "victory",
            SoundName::Wrong => "wrong",
        }
    }

    /// Asset location for this sound, e.g. `./sounds/boo.mp3`.
    pub fn asset_path(&self, sounds_dir: &Path, extension: &str) -> PathBuf {
        sounds_dir.join(format!("{}.{extension}", self.as_str()))
    }
}

impl fmt::Display for SoundName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when an identifier is outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSoundName(pub String);

impl fmt::Display for UnknownSoundName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sound name '{}'", self.0)
    }
}

impl std::error::Error for UnknownSoundName {}

impl FromStr for SoundName {
    type Err = UnknownSoundName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoundName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownSoundName(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_identifier() {
        for name in SoundName::ALL {
            assert_eq!(name.as_str().parse::<SoundName>().unwrap(), name);
        }
    }

    #[test]
    fn identifiers_are_case_sensitive() {
        assert!("Tada".parse::<SoundName>().is_err());
        assert_eq!(
            "ufo".parse::<SoundName>().unwrap_err(),
            UnknownSoundName("ufo".to_string())
        );
    }

    #[test]
    fn asset_path_joins_dir_and_extension() {
        let path = SoundName::Boo.asset_path(Path::new("./sounds"), "mp3");
        assert_eq!(path, Path::new("./sounds/boo.mp3"));
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&SoundName::Victory).unwrap();
        assert_eq!(json, "\"victory\"");
        let back: SoundName = serde_json::from_str("\"gasp\"").unwrap();
        assert_eq!(back, SoundName::Gasp);
    }
}
