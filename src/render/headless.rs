use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::PlaybackError;
use crate::events::{PlaybackToken, SurfaceEvent};
use crate::render::surface::{ImageRegion, Stage, SurfaceId};
use crate::render::transition::TransitionStyle;

/// One call made against the stage, or one completion it raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOp {
    MountVideo(SurfaceId),
    MountImage {
        source_uri: String,
        overlay: bool,
        transition: Option<TransitionStyle>,
    },
    SetSource(SurfaceId, Option<String>),
    Preload(SurfaceId, String),
    Play(SurfaceId, PlaybackToken),
    Stop(SurfaceId),
    Ended(SurfaceId, PlaybackToken),
    Failed(SurfaceId, PlaybackToken),
}

/// Shared, append-only log of stage operations.
#[derive(Debug, Clone, Default)]
pub struct StageJournal(Arc<Mutex<Vec<StageOp>>>);

impl StageJournal {
    fn push(&self, op: StageOp) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
    }

    pub fn snapshot(&self) -> Vec<StageOp> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mounted {
    Video(SurfaceId),
    Image(String),
}

/// Stage without a display: logs what would be shown and simulates video playback time.
pub struct HeadlessStage {
    events: Sender<SurfaceEvent>,
    video_duration: Duration,
    durations: HashMap<String, Duration>,
    failing: HashSet<String>,
    sources: [Option<String>; 2],
    playback: [Option<JoinHandle<()>>; 2],
    mounted: Option<Mounted>,
    journal: StageJournal,
}

impl HeadlessStage {
    pub fn new(events: Sender<SurfaceEvent>, video_duration: Duration) -> Self {
        debug!(?video_duration, "headless stage allocated two video surfaces");
        Self {
            events,
            video_duration,
            durations: HashMap::new(),
            failing: HashSet::new(),
            sources: [None, None],
            playback: [None, None],
            mounted: None,
            journal: StageJournal::default(),
        }
    }

    /// Overrides the simulated length of one video.
    pub fn with_video_duration(mut self, source_uri: impl Into<String>, duration: Duration) -> Self {
        self.durations.insert(source_uri.into(), duration);
        self
    }

    /// Makes playback of `source_uri` fail right after it starts.
    pub fn with_failing_playback(mut self, source_uri: impl Into<String>) -> Self {
        self.failing.insert(source_uri.into());
        self
    }

    pub fn journal(&self) -> StageJournal {
        self.journal.clone()
    }

    pub fn mounted(&self) -> Option<&Mounted> {
        self.mounted.as_ref()
    }

    fn cancel_playback(&mut self, surface: SurfaceId) {
        if let Some(handle) = self.playback[surface.slot()].take() {
            handle.abort();
        }
    }
}

impl Stage for HeadlessStage {
    fn mount_video(&mut self, surface: SurfaceId) {
        info!(
            surface = %surface,
            source = self.sources[surface.slot()].as_deref().unwrap_or("<none>"),
            "mounted video surface"
        );
        self.mounted = Some(Mounted::Video(surface));
        self.journal.push(StageOp::MountVideo(surface));
    }

    fn mount_image(&mut self, region: ImageRegion) {
        info!(
            source = %region.image.source_uri,
            transition = ?region.transition(),
            overlay = region.overlay.is_some(),
            "mounted image region"
        );
        if let Some(panel) = &region.overlay {
            for line in panel.lines() {
                debug!(%line, "overlay");
            }
        }
        self.journal.push(StageOp::MountImage {
            source_uri: region.image.source_uri.clone(),
            overlay: region.overlay.is_some(),
            transition: region.transition(),
        });
        self.mounted = Some(Mounted::Image(region.image.source_uri));
    }

    fn set_source(&mut self, surface: SurfaceId, source_uri: Option<&str>) {
        self.cancel_playback(surface);
        self.sources[surface.slot()] = source_uri.map(str::to_string);
        self.journal
            .push(StageOp::SetSource(surface, source_uri.map(str::to_string)));
    }

    fn preload(&mut self, surface: SurfaceId, source_uri: &str) {
        self.cancel_playback(surface);
        debug!(surface = %surface, source = source_uri, "preloading");
        self.sources[surface.slot()] = Some(source_uri.to_string());
        self.journal
            .push(StageOp::Preload(surface, source_uri.to_string()));
    }

    fn play(&mut self, surface: SurfaceId, token: PlaybackToken) -> Result<(), PlaybackError> {
        let source = self.sources[surface.slot()]
            .clone()
            .ok_or(PlaybackError::NoSource(surface))?;
        self.cancel_playback(surface);
        self.journal.push(StageOp::Play(surface, token));

        let events = self.events.clone();
        let journal = self.journal.clone();
        let handle = if self.failing.contains(&source) {
            tokio::spawn(async move {
                journal.push(StageOp::Failed(surface, token));
                let reason = format!("simulated decode failure for {source}");
                if events
                    .send(SurfaceEvent::Failed {
                        surface,
                        token,
                        reason,
                    })
                    .await
                    .is_err()
                {
                    warn!(surface = %surface, "surface event receiver dropped");
                }
            })
        } else {
            let duration = self
                .durations
                .get(&source)
                .copied()
                .unwrap_or(self.video_duration);
            tokio::spawn(async move {
                sleep(duration).await;
                journal.push(StageOp::Ended(surface, token));
                if events
                    .send(SurfaceEvent::Ended { surface, token })
                    .await
                    .is_err()
                {
                    warn!(surface = %surface, "surface event receiver dropped");
                }
            })
        };
        self.playback[surface.slot()] = Some(handle);
        Ok(())
    }

    fn stop(&mut self, surface: SurfaceId) {
        self.cancel_playback(surface);
        self.journal.push(StageOp::Stop(surface));
    }
}

impl Drop for HeadlessStage {
    fn drop(&mut self) {
        for surface in SurfaceId::BOTH {
            self.cancel_playback(surface);
        }
    }
}
