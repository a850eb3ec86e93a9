use thiserror::Error;

use crate::render::surface::SurfaceId;
use crate::sequence::MediaKind;

/// Fatal startup errors: the configuration cannot produce a playable session.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration has no sequence")]
    MissingSequence,

    #[error("sequence must contain at least one item")]
    EmptySequence,

    #[error("sequence[{index}] has an empty source-uri")]
    MissingSource { index: usize },

    #[error("sequence[{index}] is an image without dwell-seconds")]
    MissingDwell { index: usize },

    #[error("sequence[{index}] has a non-finite dwell-seconds")]
    InvalidDwell { index: usize },

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Why a single asset could not be shown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadFailure {
    #[error("not found")]
    NotFound,

    #[error("file is empty")]
    Empty,

    #[error("unreadable: {0}")]
    Unreadable(String),

    #[error("undecodable: {0}")]
    Undecodable(String),

    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("playback failed: {0}")]
    Playback(String),
}

/// A per-item failure; recovered by skipping to the next item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load {kind} '{source_uri}': {reason}")]
pub struct LoadError {
    pub source_uri: String,
    pub kind: MediaKind,
    pub reason: LoadFailure,
}

impl LoadError {
    pub fn new(source_uri: impl Into<String>, kind: MediaKind, reason: LoadFailure) -> Self {
        Self {
            source_uri: source_uri.into(),
            kind,
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sequence[{index}] has unrecognized kind '{kind}'")]
pub struct UnknownKindError {
    pub index: usize,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no overlay record for display '{display_id}'")]
pub struct OverlayLookupMiss {
    pub display_id: String,
}

/// Raised by a stage that cannot start playback on a surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("surface {0} has no source")]
    NoSource(SurfaceId),

    #[error("surface {surface} rejected playback: {reason}")]
    Rejected { surface: SurfaceId, reason: String },
}
