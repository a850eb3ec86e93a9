//! The playback loop.
//!
//! Exactly one item is on screen at a time. Each item is probed before it is
//! mounted, so a broken asset never reaches the display; it is logged and the
//! loop moves on. Videos end on their own, images end when their dwell timer
//! fires, and the loop wraps at the end of the sequence forever.

pub mod scheduler;
pub mod state;

use std::time::Duration;

use anyhow::{Result, anyhow};
use tokio::select;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Configuration;
use crate::error::{LoadError, LoadFailure, UnknownKindError};
use crate::events::{PlaybackEvent, SkipReason, SurfaceEvent};
use crate::overlay::OverlayPanel;
use crate::probe::MediaProbe;
use crate::render::dual_buffer::{DualBufferRenderer, Handoff};
use crate::render::presenter::ImagePresenter;
use crate::render::surface::Stage;
use crate::sequence::{ItemKind, MediaItem, MediaKind, PlaybackCursor, Sequence};

use scheduler::{Completion, Scheduler};
use state::{EngineSM, EngineState, EngineStateChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackOptions {
    pub transition_duration: Duration,
    /// Pause after a full lap in which every item failed; zero disables it.
    pub failed_lap_backoff: Duration,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self::from(&Configuration::default())
    }
}

impl From<&Configuration> for PlaybackOptions {
    fn from(cfg: &Configuration) -> Self {
        Self {
            transition_duration: cfg.transition_duration,
            failed_lap_backoff: cfg.failed_lap_backoff,
        }
    }
}

enum Shown {
    Yes,
    Skipped,
    Cancelled,
}

pub struct Engine<S: Stage, P: MediaProbe> {
    sequence: Sequence,
    cursor: PlaybackCursor,
    stage: S,
    probe: P,
    renderer: DualBufferRenderer,
    presenter: ImagePresenter,
    scheduler: Scheduler,
    sm: EngineSM,
    state_tx: watch::Sender<EngineState>,
    surface_events: Receiver<SurfaceEvent>,
    notify: Option<Sender<PlaybackEvent>>,
    options: PlaybackOptions,
    consecutive_failures: usize,
}

impl<S: Stage, P: MediaProbe> Engine<S, P> {
    /// `surface_events` must be the receiving end of the channel the stage reports on.
    pub fn new(
        sequence: Sequence,
        stage: S,
        probe: P,
        overlay: Option<OverlayPanel>,
        surface_events: Receiver<SurfaceEvent>,
        options: PlaybackOptions,
    ) -> Self {
        Self {
            cursor: PlaybackCursor::new(sequence.len()),
            sequence,
            stage,
            probe,
            renderer: DualBufferRenderer::new(),
            presenter: ImagePresenter::new(overlay, options.transition_duration),
            scheduler: Scheduler::new(),
            sm: EngineSM::new(),
            state_tx: watch::Sender::new(EngineState::Idle),
            surface_events,
            notify: None,
            options,
            consecutive_failures: 0,
        }
    }

    /// Reports each shown or skipped item; events are dropped when the receiver lags.
    pub fn with_notifications(mut self, tx: Sender<PlaybackEvent>) -> Self {
        self.notify = Some(tx);
        self
    }

    /// Follows the engine's lifecycle; the receiver always holds the latest state.
    pub fn subscribe_state(&self) -> watch::Receiver<EngineState> {
        self.state_tx.subscribe()
    }

    /// Plays the sequence from the first item until `cancel` fires.
    ///
    /// Fails only if the engine's own lifecycle is violated.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        info!(items = self.sequence.len(), "playback started");
        let started = self.sm.on_start(self.cursor.index());
        self.commit(started, "start");

        let outcome = loop {
            if cancel.is_cancelled() {
                break Ok(());
            }
            let index = self.cursor.index();
            let next_index = self.cursor.next_index();
            let item = self.sequence.item_at(index).clone();
            let next = self.sequence.item_at(next_index).clone();

            match self.show(index, &item, &next, &cancel).await {
                Shown::Cancelled => break Ok(()),
                Shown::Skipped => {
                    let skipped = self.sm.on_skipped(next_index);
                    if !self.commit(skipped, "skip") {
                        break Err(anyhow!("item {index} skipped outside validation"));
                    }
                    self.cursor.advance();
                    if !self.after_failure(&cancel).await {
                        break Ok(());
                    }
                    continue;
                }
                Shown::Yes => self.consecutive_failures = 0,
            }

            let completion = select! {
                _ = cancel.cancelled() => break Ok(()),
                done = self.scheduler.wait(&mut self.surface_events) => done,
            };
            let change = match completion {
                Completion::TimerExpired(token) => {
                    debug!(index, %token, "dwell elapsed");
                    self.sm.on_dwell_elapsed(next_index)
                }
                Completion::VideoEnded { surface, token } => {
                    debug!(index, %surface, %token, "video ended");
                    self.hand_off(&next);
                    self.sm.on_video_done(next_index)
                }
                Completion::VideoFailed {
                    surface, reason, ..
                } => {
                    let err = LoadError::new(
                        &item.source_uri,
                        MediaKind::Video,
                        LoadFailure::Playback(reason),
                    );
                    warn!(index, %surface, error = %err, "video failed during playback; moving on");
                    self.hand_off(&next);
                    self.sm.on_video_done(next_index)
                }
                Completion::EventsClosed => {
                    warn!("stage event channel closed; stopping playback");
                    break Ok(());
                }
            };
            if !self.commit(change, "completion") {
                break Err(anyhow!("completion for item {index} did not match engine state"));
            }
            self.cursor.advance();
        };

        self.scheduler.disarm();
        self.renderer.release(&mut self.stage);
        let stopped = self.sm.on_stop();
        self.commit(stopped, "stop");
        info!("playback stopped");
        outcome
    }

    async fn show(
        &mut self,
        index: usize,
        item: &MediaItem,
        next: &MediaItem,
        cancel: &CancellationToken,
    ) -> Shown {
        let kind = match &item.kind {
            ItemKind::Known(kind) => *kind,
            ItemKind::Unrecognized(name) => {
                let err = UnknownKindError {
                    index,
                    kind: name.clone(),
                };
                error!(source = %item.source_uri, error = %err, "skipping item");
                self.emit(PlaybackEvent::Skipped {
                    index,
                    reason: SkipReason::UnknownKind(err),
                });
                return Shown::Skipped;
            }
        };

        let probed = select! {
            _ = cancel.cancelled() => return Shown::Cancelled,
            res = self.probe.probe(&item.source_uri, kind) => res,
        };
        if let Err(err) = probed {
            warn!(index, error = %err, "skipping item");
            self.emit(PlaybackEvent::Skipped {
                index,
                reason: SkipReason::Load(err),
            });
            return Shown::Skipped;
        }

        match kind {
            MediaKind::Video => {
                let surface = self.renderer.activate(item);
                let entered = self.sm.on_video_started(surface);
                if !self.commit(entered, "video") {
                    return Shown::Skipped;
                }
                let token = self.scheduler.arm_video_end(surface);
                match self.renderer.start(&mut self.stage, item, next, token) {
                    Ok(surface) => {
                        info!(index, source = %item.source_uri, %surface, "playing video");
                    }
                    Err(reason) => {
                        self.scheduler.disarm();
                        let err = LoadError::new(
                            &item.source_uri,
                            kind,
                            LoadFailure::Playback(reason.to_string()),
                        );
                        warn!(index, error = %err, "playback rejected; skipping item");
                        self.emit(PlaybackEvent::Skipped {
                            index,
                            reason: SkipReason::Rejected(err),
                        });
                        self.hand_off(next);
                        return Shown::Skipped;
                    }
                }
            }
            MediaKind::Image => {
                let entered = self.sm.on_image_shown();
                if !self.commit(entered, "image") {
                    return Shown::Skipped;
                }
                if self.renderer.is_engaged() {
                    self.renderer.release(&mut self.stage);
                }
                let dwell =
                    self.presenter
                        .present(&mut self.stage, &mut self.renderer, item, next);
                info!(index, source = %item.source_uri, ?dwell, "displaying image");
                self.scheduler.arm_timer(dwell);
            }
        }
        self.emit(PlaybackEvent::Showing {
            index,
            kind,
            source_uri: item.source_uri.clone(),
        });
        Shown::Yes
    }

    fn hand_off(&mut self, next: &MediaItem) {
        match self.renderer.finish(&mut self.stage, next) {
            Handoff::Swapped { active } => debug!(%active, "next video already loaded"),
            Handoff::Released => debug!("leaving video mode"),
        }
    }

    /// Returns false when cancelled during the back-off.
    async fn after_failure(&mut self, cancel: &CancellationToken) -> bool {
        self.consecutive_failures += 1;
        if self.consecutive_failures < self.sequence.len() {
            return true;
        }
        self.consecutive_failures = 0;
        let backoff = self.options.failed_lap_backoff;
        if backoff.is_zero() {
            tokio::task::yield_now().await;
            return true;
        }
        warn!(
            items = self.sequence.len(),
            ?backoff,
            "every item in the sequence failed; retrying after back-off"
        );
        select! {
            _ = cancel.cancelled() => false,
            _ = sleep(backoff) => true,
        }
    }

    /// Publishes an allowed transition; a refused one is logged and reported as false.
    fn commit(&self, change: Option<EngineStateChange>, event: &'static str) -> bool {
        match change {
            Some(ch) => {
                debug!(from = ?ch.from, to = ?ch.to, event, "engine state");
                self.state_tx.send_replace(ch.to);
                true
            }
            None => {
                error!(state = ?self.sm.current(), event, "engine transition refused");
                false
            }
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        let Some(tx) = &self.notify else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => debug!(?event, "notification dropped"),
            Err(TrySendError::Closed(_)) => {}
        }
    }
}
