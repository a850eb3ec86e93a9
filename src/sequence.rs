use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::MediaItemConfig;
use crate::error::ConfigError;
use crate::render::transition::TransitionStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    const ALL: &'static [Self] = &[Self::Video, Self::Image];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared kind of a slot. Unrecognized kinds load fine and are skipped at playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Known(MediaKind),
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub kind: ItemKind,
    pub source_uri: String,
    /// Only set for images; non-positive dwell times are stored as zero.
    pub dwell: Option<Duration>,
    pub transition: Option<TransitionStyle>,
}

impl MediaItem {
    pub fn video(source_uri: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Known(MediaKind::Video),
            source_uri: source_uri.into(),
            dwell: None,
            transition: None,
        }
    }

    pub fn image(source_uri: impl Into<String>, dwell: Duration) -> Self {
        Self {
            kind: ItemKind::Known(MediaKind::Image),
            source_uri: source_uri.into(),
            dwell: Some(dwell),
            transition: None,
        }
    }

    pub fn with_transition(mut self, style: TransitionStyle) -> Self {
        self.transition = Some(style);
        self
    }

    pub fn is_video(&self) -> bool {
        self.kind == ItemKind::Known(MediaKind::Video)
    }

    pub fn dwell(&self) -> Duration {
        self.dwell.unwrap_or(Duration::ZERO)
    }

    fn from_config(index: usize, raw: MediaItemConfig) -> Result<Self, ConfigError> {
        let source_uri = raw.source_uri.trim().to_string();
        if source_uri.is_empty() {
            return Err(ConfigError::MissingSource { index });
        }

        let kind = match MediaKind::parse(&raw.kind) {
            Some(kind) => ItemKind::Known(kind),
            None => ItemKind::Unrecognized(raw.kind),
        };

        let (dwell, transition) = match kind {
            ItemKind::Known(MediaKind::Image) => {
                let seconds = raw
                    .dwell_seconds
                    .ok_or(ConfigError::MissingDwell { index })?;
                if !seconds.is_finite() {
                    return Err(ConfigError::InvalidDwell { index });
                }
                if seconds <= 0.0 {
                    warn!(
                        index,
                        seconds, "non-positive dwell-seconds; image advances on the next tick"
                    );
                }
                let dwell = Duration::try_from_secs_f64(seconds.max(0.0))
                    .map_err(|_| ConfigError::InvalidDwell { index })?;
                (Some(dwell), raw.transition_style)
            }
            _ => {
                if raw.transition_style.is_some() {
                    debug!(index, "transition-style ignored for non-image item");
                }
                (None, None)
            }
        };

        Ok(Self {
            kind,
            source_uri,
            dwell,
            transition,
        })
    }
}

/// Ordered, cyclic, non-empty list of media items.
#[derive(Debug, Clone)]
pub struct Sequence {
    items: Vec<MediaItem>,
}

impl Sequence {
    pub fn load(items: Option<Vec<MediaItemConfig>>) -> Result<Self, ConfigError> {
        let items = items.ok_or(ConfigError::MissingSequence)?;
        if items.is_empty() {
            return Err(ConfigError::EmptySequence);
        }
        let items = items
            .into_iter()
            .enumerate()
            .map(|(index, raw)| MediaItem::from_config(index, raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { items })
    }

    pub fn from_items(items: Vec<MediaItem>) -> Result<Self, ConfigError> {
        if items.is_empty() {
            return Err(ConfigError::EmptySequence);
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept alongside `len`.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`, wrapping around the end of the sequence.
    pub fn item_at(&self, index: usize) -> &MediaItem {
        &self.items[index % self.items.len()]
    }

    /// The first `iterations` slots of the loop starting at `start`.
    pub fn plan(&self, start: usize, iterations: usize) -> Vec<(usize, &MediaItem)> {
        let mut cursor = PlaybackCursor::starting_at(start, self.len());
        let mut plan = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            let index = cursor.index();
            plan.push((index, self.item_at(index)));
            cursor.advance();
        }
        plan
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCursor {
    index: usize,
    len: usize,
}

impl PlaybackCursor {
    pub fn new(len: usize) -> Self {
        Self::starting_at(0, len)
    }

    pub fn starting_at(index: usize, len: usize) -> Self {
        let len = len.max(1);
        Self {
            index: index % len,
            len,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next_index(&self) -> usize {
        (self.index + 1) % self.len
    }

    pub fn advance(&mut self) -> usize {
        self.index = self.next_index();
        self.index
    }
}
