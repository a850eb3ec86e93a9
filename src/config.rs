use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::render::transition::TransitionStyle;
use crate::sequence::Sequence;

/// One raw slot of the playback sequence as written in the config file.
///
/// Legacy camelCase playlists (`type`, `src`, `duration`) are accepted too.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MediaItemConfig {
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(alias = "src", alias = "sourceURI")]
    pub source_uri: String,
    #[serde(default, alias = "duration", alias = "dwellSeconds")]
    pub dwell_seconds: Option<f64>,
    #[serde(default, alias = "transition", alias = "transitionStyle")]
    pub transition_style: Option<TransitionStyle>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct HeadlessOptions {
    /// Simulated playback length of every video on the headless stage.
    #[serde(with = "humantime_serde")]
    pub video_duration: Duration,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            video_duration: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Informational playlist title.
    pub title: Option<String>,
    /// Base directory for relative media sources.
    #[serde(alias = "media-url")]
    pub media_root: PathBuf,
    /// Display identity used to look up the overlay record.
    #[serde(alias = "storeNumber")]
    pub store_number: Option<String>,
    /// YAML file holding the overlay records.
    pub store_directory: Option<PathBuf>,
    /// Length of the image entrance animation.
    #[serde(with = "humantime_serde")]
    pub transition_duration: Duration,
    /// Pause after a full lap in which every item failed; zero disables it.
    #[serde(with = "humantime_serde")]
    pub failed_lap_backoff: Duration,
    pub headless: HeadlessOptions,
    #[serde(alias = "playbackSequenece", alias = "playback-sequence")]
    pub sequence: Option<Vec<MediaItemConfig>>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            title: None,
            media_root: PathBuf::new(),
            store_number: None,
            store_directory: None,
            transition_duration: Duration::from_millis(800),
            failed_lap_backoff: Duration::from_secs(1),
            headless: HeadlessOptions::default(),
            sequence: None,
        }
    }
}

impl Configuration {
    /// Reads the YAML file and resolves relative paths against its directory.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let mut cfg = Self::from_yaml_str(&raw)?;
        if let Some(base) = path.parent() {
            cfg.resolve_relative_to(base);
        }
        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.media_root.is_relative() {
            self.media_root = base.join(&self.media_root);
        }
        if let Some(dir) = self.store_directory.as_mut() {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.headless.video_duration.is_zero() {
            return Err(ConfigError::Invalid(
                "headless.video-duration must be greater than zero".into(),
            ));
        }
        if let Some(number) = &self.store_number {
            if number.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "store-number must not be blank when provided".into(),
                ));
            }
        }
        if self.store_directory.is_some() && self.store_number.is_none() {
            return Err(ConfigError::Invalid(
                "store-directory requires a store-number".into(),
            ));
        }
        Ok(self)
    }

    /// Builds the immutable playback sequence.
    pub fn sequence(&self) -> Result<Sequence, ConfigError> {
        Sequence::load(self.sequence.clone())
    }
}
