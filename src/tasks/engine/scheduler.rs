use std::pin::Pin;
use std::time::Duration;

use tokio::sync::mpsc::Receiver;
use tokio::time::{Sleep, sleep};
use tracing::{debug, trace};

use crate::events::{PlaybackToken, SurfaceEvent};
use crate::render::surface::SurfaceId;

/// What ended the current item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    TimerExpired(PlaybackToken),
    VideoEnded {
        surface: SurfaceId,
        token: PlaybackToken,
    },
    VideoFailed {
        surface: SurfaceId,
        token: PlaybackToken,
        reason: String,
    },
    /// The stage dropped its event sender; no video end can ever arrive.
    EventsClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmedKind {
    Timer,
    NextTick,
    VideoEnd(SurfaceId),
}

enum Trigger {
    Timer(Pin<Box<Sleep>>),
    NextTick,
    VideoEnd(SurfaceId),
}

struct Armed {
    token: PlaybackToken,
    trigger: Trigger,
}

/// Holds the single pending completion for the item on screen.
///
/// Arming always replaces what was armed before, so at most one timer or
/// video-end listener exists at any time. Signals carrying another token are
/// dropped.
#[derive(Default)]
pub struct Scheduler {
    armed: Option<Armed>,
    next_token: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self) -> PlaybackToken {
        self.next_token += 1;
        PlaybackToken(self.next_token)
    }

    /// Arms a dwell timer; a zero duration fires on the next scheduler tick.
    pub fn arm_timer(&mut self, duration: Duration) -> PlaybackToken {
        self.disarm();
        let token = self.issue();
        let trigger = if duration.is_zero() {
            Trigger::NextTick
        } else {
            Trigger::Timer(Box::pin(sleep(duration)))
        };
        trace!(%token, ?duration, "armed dwell timer");
        self.armed = Some(Armed { token, trigger });
        token
    }

    /// Arms a listener for the end of playback on `surface`.
    pub fn arm_video_end(&mut self, surface: SurfaceId) -> PlaybackToken {
        self.disarm();
        let token = self.issue();
        trace!(%token, %surface, "armed video end listener");
        self.armed = Some(Armed {
            token,
            trigger: Trigger::VideoEnd(surface),
        });
        token
    }

    pub fn disarm(&mut self) {
        if let Some(armed) = self.armed.take() {
            trace!(token = %armed.token, "disarmed");
        }
    }

    pub fn armed(&self) -> Option<ArmedKind> {
        self.armed.as_ref().map(|armed| match armed.trigger {
            Trigger::Timer(_) => ArmedKind::Timer,
            Trigger::NextTick => ArmedKind::NextTick,
            Trigger::VideoEnd(surface) => ArmedKind::VideoEnd(surface),
        })
    }

    pub fn armed_count(&self) -> usize {
        usize::from(self.armed.is_some())
    }

    /// Resolves once the armed completion fires, consuming it.
    ///
    /// Cancel safe: dropping the future leaves the completion armed. With
    /// nothing armed this never resolves.
    pub async fn wait(&mut self, events: &mut Receiver<SurfaceEvent>) -> Completion {
        loop {
            let Some(armed) = self.armed.as_mut() else {
                return std::future::pending().await;
            };
            let token = armed.token;
            let received = match &mut armed.trigger {
                Trigger::NextTick => {
                    tokio::task::yield_now().await;
                    self.armed = None;
                    return Completion::TimerExpired(token);
                }
                Trigger::Timer(timer) => {
                    let fired = tokio::select! {
                        _ = timer.as_mut() => None,
                        event = events.recv() => Some(event),
                    };
                    match fired {
                        None => {
                            self.armed = None;
                            return Completion::TimerExpired(token);
                        }
                        Some(event) => event,
                    }
                }
                Trigger::VideoEnd(_) => events.recv().await,
            };

            let Some(event) = received else {
                return Completion::EventsClosed;
            };
            if let Some(completion) = self.accept(event) {
                return completion;
            }
        }
    }

    fn accept(&mut self, event: SurfaceEvent) -> Option<Completion> {
        let expected = match self.armed.as_ref() {
            Some(Armed {
                token,
                trigger: Trigger::VideoEnd(surface),
            }) => Some((*surface, *token)),
            _ => None,
        };
        if expected != Some((event.surface(), event.token())) {
            debug!(
                surface = %event.surface(),
                token = %event.token(),
                "ignoring stale surface event"
            );
            return None;
        }
        self.armed = None;
        Some(match event {
            SurfaceEvent::Ended { surface, token } => Completion::VideoEnded { surface, token },
            SurfaceEvent::Failed {
                surface,
                token,
                reason,
            } => Completion::VideoFailed {
                surface,
                token,
                reason,
            },
        })
    }
}
