use std::fmt;

use crate::error::{LoadError, UnknownKindError};
use crate::render::surface::SurfaceId;
use crate::sequence::MediaKind;

/// Identifies one armed completion; stale signals carry an older token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackToken(pub u64);

impl fmt::Display for PlaybackToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Signals raised by a stage about its video surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Ended {
        surface: SurfaceId,
        token: PlaybackToken,
    },
    Failed {
        surface: SurfaceId,
        token: PlaybackToken,
        reason: String,
    },
}

impl SurfaceEvent {
    pub fn surface(&self) -> SurfaceId {
        match self {
            Self::Ended { surface, .. } | Self::Failed { surface, .. } => *surface,
        }
    }

    pub fn token(&self) -> PlaybackToken {
        match self {
            Self::Ended { token, .. } | Self::Failed { token, .. } => *token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Load(LoadError),
    UnknownKind(UnknownKindError),
    Rejected(LoadError),
}

/// Emitted by the engine as the loop progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Showing {
        index: usize,
        kind: MediaKind,
        source_uri: String,
    },
    Skipped {
        index: usize,
        reason: SkipReason,
    },
}
