use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::de::{self, Deserializer};

/// Entrance animation applied when an image region is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionStyle {
    Fade,
    SlideRight,
    SlideUp,
    None,
}

impl TransitionStyle {
    const ALL: &'static [Self] = &[Self::Fade, Self::SlideRight, Self::SlideUp, Self::None];
    const NAMES: &'static [&'static str] = &["fade", "slide-right", "slide-up", "none"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::SlideRight => "slide-right",
            Self::SlideUp => "slide-up",
            Self::None => "none",
        }
    }
}

impl fmt::Display for TransitionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransitionStyle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let normalized = raw.trim().to_ascii_lowercase();
        for style in Self::ALL {
            if normalized == style.as_str() {
                return Ok(*style);
            }
        }
        Err(de::Error::unknown_variant(&raw, Self::NAMES))
    }
}

/// Visual state of an entering region at one instant.
///
/// Offsets are fractions of the viewport; `1.0` is one full width/height away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntranceFrame {
    pub opacity: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl EntranceFrame {
    pub const SETTLED: Self = Self {
        opacity: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entrance {
    pub style: TransitionStyle,
    pub duration: Duration,
}

impl Entrance {
    /// `None` for an absent style, `TransitionStyle::None`, or a zero duration.
    pub fn for_style(style: Option<TransitionStyle>, duration: Duration) -> Option<Self> {
        match style {
            Some(TransitionStyle::None) | None => None,
            Some(_) if duration.is_zero() => None,
            Some(style) => Some(Self { style, duration }),
        }
    }

    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    pub fn frame_at(&self, elapsed: Duration) -> EntranceFrame {
        let t = ease_out_cubic(self.progress(elapsed));
        let remaining = 1.0 - t;
        match self.style {
            TransitionStyle::Fade => EntranceFrame {
                opacity: t,
                offset_x: 0.0,
                offset_y: 0.0,
            },
            TransitionStyle::SlideRight => EntranceFrame {
                opacity: t,
                offset_x: remaining,
                offset_y: 0.0,
            },
            TransitionStyle::SlideUp => EntranceFrame {
                opacity: t,
                offset_x: 0.0,
                offset_y: remaining,
            },
            TransitionStyle::None => EntranceFrame::SETTLED,
        }
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_400: Duration = Duration::from_millis(400);

    #[test]
    fn none_and_absent_mount_immediately() {
        assert!(Entrance::for_style(None, MS_400).is_none());
        assert!(Entrance::for_style(Some(TransitionStyle::None), MS_400).is_none());
        assert!(Entrance::for_style(Some(TransitionStyle::Fade), Duration::ZERO).is_none());
    }

    #[test]
    fn fade_goes_from_transparent_to_opaque() {
        let fade = Entrance::for_style(Some(TransitionStyle::Fade), MS_400).unwrap();
        let start = fade.frame_at(Duration::ZERO);
        assert_eq!(start.opacity, 0.0);
        assert_eq!((start.offset_x, start.offset_y), (0.0, 0.0));
        let mid = fade.frame_at(Duration::from_millis(200));
        assert!(mid.opacity > 0.5 && mid.opacity < 1.0);
        assert_eq!(fade.frame_at(MS_400), EntranceFrame::SETTLED);
        assert_eq!(fade.frame_at(Duration::from_secs(5)), EntranceFrame::SETTLED);
    }

    #[test]
    fn slide_right_starts_one_width_to_the_right() {
        let slide = Entrance::for_style(Some(TransitionStyle::SlideRight), MS_400).unwrap();
        let start = slide.frame_at(Duration::ZERO);
        assert_eq!(start.offset_x, 1.0);
        assert_eq!(start.offset_y, 0.0);
        assert_eq!(start.opacity, 0.0);
        let mid = slide.frame_at(Duration::from_millis(100));
        assert!(mid.offset_x > 0.0 && mid.offset_x < 1.0);
        assert_eq!(slide.frame_at(MS_400), EntranceFrame::SETTLED);
    }

    #[test]
    fn slide_up_moves_vertically() {
        let slide = Entrance::for_style(Some(TransitionStyle::SlideUp), MS_400).unwrap();
        let start = slide.frame_at(Duration::ZERO);
        assert_eq!((start.offset_x, start.offset_y), (0.0, 1.0));
        assert!(slide.is_finished(MS_400));
        assert!(!slide.is_finished(Duration::from_millis(399)));
    }

    #[test]
    fn parses_kebab_names() {
        let style: TransitionStyle = serde_yaml::from_str("slide-right").unwrap();
        assert_eq!(style, TransitionStyle::SlideRight);
        let style: TransitionStyle = serde_yaml::from_str("Fade").unwrap();
        assert_eq!(style, TransitionStyle::Fade);
        let err = serde_yaml::from_str::<TransitionStyle>("spin").unwrap_err();
        assert!(err.to_string().contains("unknown variant"));
    }
}
