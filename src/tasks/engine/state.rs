use crate::render::surface::SurfaceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    /// Probing the item at `index` before anything is mounted.
    Validating { index: usize },
    PlayingVideo { index: usize, surface: SurfaceId },
    ShowingImage { index: usize },
}

impl EngineState {
    pub fn index(&self) -> Option<usize> {
        match *self {
            EngineState::Idle => None,
            EngineState::Validating { index }
            | EngineState::PlayingVideo { index, .. }
            | EngineState::ShowingImage { index } => Some(index),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EngineStateChange {
    pub from: EngineState,
    pub to: EngineState,
}

/// Engine lifecycle. Every method returns `None` when the event is not allowed
/// in the current state, and the state is left untouched.
pub struct EngineSM {
    state: EngineState,
}

impl Default for EngineSM {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineSM {
    pub fn new() -> Self {
        Self {
            state: EngineState::Idle,
        }
    }

    pub fn current(&self) -> EngineState {
        self.state
    }

    pub fn on_start(&mut self, index: usize) -> Option<EngineStateChange> {
        match self.state {
            EngineState::Idle => self.goto(EngineState::Validating { index }),
            _ => None,
        }
    }

    /// Only an item that passed validation may be shown.
    pub fn on_video_started(&mut self, surface: SurfaceId) -> Option<EngineStateChange> {
        match self.state {
            EngineState::Validating { index } => {
                self.goto(EngineState::PlayingVideo { index, surface })
            }
            _ => None,
        }
    }

    pub fn on_image_shown(&mut self) -> Option<EngineStateChange> {
        match self.state {
            EngineState::Validating { index } => self.goto(EngineState::ShowingImage { index }),
            _ => None,
        }
    }

    /// The item failed validation, or its video refused to start.
    pub fn on_skipped(&mut self, next: usize) -> Option<EngineStateChange> {
        match self.state {
            EngineState::Validating { .. } | EngineState::PlayingVideo { .. } => {
                self.goto(EngineState::Validating { index: next })
            }
            _ => None,
        }
    }

    /// The active surface ended or failed mid-playback.
    pub fn on_video_done(&mut self, next: usize) -> Option<EngineStateChange> {
        match self.state {
            EngineState::PlayingVideo { .. } => self.goto(EngineState::Validating { index: next }),
            _ => None,
        }
    }

    pub fn on_dwell_elapsed(&mut self, next: usize) -> Option<EngineStateChange> {
        match self.state {
            EngineState::ShowingImage { .. } => self.goto(EngineState::Validating { index: next }),
            _ => None,
        }
    }

    pub fn on_stop(&mut self) -> Option<EngineStateChange> {
        match self.state {
            EngineState::Idle => None,
            _ => self.goto(EngineState::Idle),
        }
    }

    // Self-loops are recorded; a one-item sequence revalidates the same index.
    fn goto(&mut self, to: EngineState) -> Option<EngineStateChange> {
        let ch = EngineStateChange {
            from: self.state,
            to,
        };
        self.state = to;
        Some(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_then_play() {
        let mut sm = EngineSM::new();
        assert_eq!(sm.current(), EngineState::Idle);
        sm.on_start(0).unwrap();
        let ch = sm.on_video_started(SurfaceId::A).unwrap();
        assert_eq!(ch.from, EngineState::Validating { index: 0 });
        assert_eq!(
            ch.to,
            EngineState::PlayingVideo {
                index: 0,
                surface: SurfaceId::A
            }
        );
        assert_eq!(sm.current().index(), Some(0));

        let ch = sm.on_video_done(1).unwrap();
        assert_eq!(ch.to, EngineState::Validating { index: 1 });
    }

    #[test]
    fn nothing_is_shown_without_validation() {
        let mut sm = EngineSM::new();
        assert!(sm.on_image_shown().is_none());
        assert!(sm.on_video_started(SurfaceId::B).is_none());
        assert_eq!(sm.current(), EngineState::Idle);

        sm.on_start(1).unwrap();
        sm.on_image_shown().unwrap();
        assert!(sm.on_video_started(SurfaceId::A).is_none());
        assert!(sm.on_image_shown().is_none());
        assert_eq!(sm.current(), EngineState::ShowingImage { index: 1 });
    }

    #[test]
    fn completions_only_leave_their_own_state() {
        let mut sm = EngineSM::new();
        sm.on_start(0).unwrap();
        assert!(sm.on_video_done(1).is_none());
        assert!(sm.on_dwell_elapsed(1).is_none());

        sm.on_image_shown().unwrap();
        assert!(sm.on_video_done(1).is_none());
        assert!(sm.on_skipped(1).is_none());
        sm.on_dwell_elapsed(1).unwrap();

        sm.on_video_started(SurfaceId::B).unwrap();
        assert!(sm.on_dwell_elapsed(0).is_none());
        assert!(sm.on_start(0).is_none());
        assert_eq!(
            sm.current(),
            EngineState::PlayingVideo {
                index: 1,
                surface: SurfaceId::B
            }
        );
    }

    #[test]
    fn skips_revalidate_even_the_same_index() {
        let mut sm = EngineSM::new();
        sm.on_start(0).unwrap();
        let ch = sm.on_skipped(0).unwrap();
        assert_eq!(ch.from, ch.to);

        sm.on_video_started(SurfaceId::A).unwrap();
        sm.on_skipped(0).unwrap();
        assert_eq!(sm.current(), EngineState::Validating { index: 0 });
    }

    #[test]
    fn stop_returns_to_idle() {
        let mut sm = EngineSM::new();
        sm.on_start(2).unwrap();
        sm.on_stop().unwrap();
        assert_eq!(sm.current(), EngineState::Idle);
        assert!(sm.on_stop().is_none());
    }
}
