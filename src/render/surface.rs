use std::fmt;

use store_directory::OverlayPanel;

use crate::error::PlaybackError;
use crate::events::PlaybackToken;
use crate::render::transition::{Entrance, TransitionStyle};

/// One of the two pre-allocated video surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    A,
    B,
}

impl SurfaceId {
    pub const BOTH: [Self; 2] = [Self::A, Self::B];

    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::A => "A",
            Self::B => "B",
        })
    }
}


/// The image itself, drawn at natural size with its top-left corner at the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLayer {
    pub source_uri: String,
}

/// Everything visible in image mode: the image, an optional overlay, and how it enters.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRegion {
    pub image: ImageLayer,
    pub overlay: Option<OverlayPanel>,
    pub entrance: Option<Entrance>,
}

impl ImageRegion {
    pub fn transition(&self) -> Option<TransitionStyle> {
        self.entrance.map(|entrance| entrance.style)
    }
}

/// Full-viewport mount point, implemented per target platform.
///
/// The stage shows exactly one top-level child: either one video surface or one
/// image region. Mounting replaces whatever was visible. Video completion is
/// reported asynchronously as a [`crate::events::SurfaceEvent`] carrying the
/// token passed to [`Stage::play`].
pub trait Stage: Send {
    fn mount_video(&mut self, surface: SurfaceId);

    fn mount_image(&mut self, region: ImageRegion);

    /// Sets or clears the source of `surface` without starting playback.
    fn set_source(&mut self, surface: SurfaceId, source_uri: Option<&str>);

    /// Sets the source and starts loading it in the background. Must not block.
    fn preload(&mut self, surface: SurfaceId, source_uri: &str);

    fn play(&mut self, surface: SurfaceId, token: PlaybackToken) -> Result<(), PlaybackError>;

    fn stop(&mut self, surface: SurfaceId);
}
