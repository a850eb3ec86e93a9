use tracing::{debug, trace};

use crate::error::PlaybackError;
use crate::events::PlaybackToken;
use crate::render::surface::{Stage, SurfaceId};
use crate::sequence::MediaItem;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Slot {
    source: Option<String>,
    /// Loaded ahead of time and not yet played.
    primed: bool,
}

impl Slot {
    fn primed_with(&self, source_uri: &str) -> bool {
        self.primed && self.source.as_deref() == Some(source_uri)
    }
}

/// What happened to video mode when the active surface finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handoff {
    /// Roles swapped; the primed surface is now active.
    Swapped { active: SurfaceId },
    /// Both surfaces stopped and cleared; video mode left.
    Released,
}

/// Double-buffered video playback over the two stage surfaces.
///
/// Surfaces are never created or destroyed here, only relabelled: `active` is
/// the one mounted and playing, the other one is idle or preloading the next
/// item.
#[derive(Debug, Default)]
pub struct DualBufferRenderer {
    active: Option<SurfaceId>,
    slots: [Slot; 2],
}

impl DualBufferRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once roles are assigned, either by playback or by a preload.
    pub fn is_engaged(&self) -> bool {
        self.active.is_some()
    }

    pub fn source_of(&self, surface: SurfaceId) -> Option<&str> {
        self.slots[surface.slot()].source.as_deref()
    }

    pub fn is_primed(&self, surface: SurfaceId, source_uri: &str) -> bool {
        self.slots[surface.slot()].primed_with(source_uri)
    }

    fn slot_mut(&mut self, surface: SurfaceId) -> &mut Slot {
        &mut self.slots[surface.slot()]
    }

    fn engage(&mut self) -> SurfaceId {
        *self.active.get_or_insert(SurfaceId::A)
    }

    fn swap(&mut self) -> SurfaceId {
        let next = self.engage().other();
        self.active = Some(next);
        next
    }

    /// Picks the surface that will play `item`, preferring one already primed with it.
    ///
    /// Touches no stage state; call before arming the completion for the surface.
    pub fn activate(&mut self, item: &MediaItem) -> SurfaceId {
        let active = self.engage();
        if !self.is_primed(active, &item.source_uri)
            && self.is_primed(active.other(), &item.source_uri)
        {
            let swapped = self.swap();
            debug!(surface = %swapped, source = %item.source_uri, "activating primed surface");
            return swapped;
        }
        active
    }

    /// Mounts and plays `item` on the active surface, then prepares the other one for `next`.
    pub fn start<S: Stage>(
        &mut self,
        stage: &mut S,
        item: &MediaItem,
        next: &MediaItem,
        token: PlaybackToken,
    ) -> Result<SurfaceId, PlaybackError> {
        let active = self.activate(item);
        if self.is_primed(active, &item.source_uri) {
            trace!(surface = %active, "source already primed; no reload");
        } else {
            stage.set_source(active, Some(&item.source_uri));
            self.slot_mut(active).source = Some(item.source_uri.clone());
        }
        self.slot_mut(active).primed = false;

        stage.mount_video(active);
        stage.play(active, token)?;
        self.prime(stage, next);
        Ok(active)
    }

    /// Preloads `next` into the inactive surface when it is a video, otherwise clears it.
    pub fn prime<S: Stage>(&mut self, stage: &mut S, next: &MediaItem) {
        let inactive = self.engage().other();
        if next.is_video() {
            stage.preload(inactive, &next.source_uri);
            *self.slot_mut(inactive) = Slot {
                source: Some(next.source_uri.clone()),
                primed: true,
            };
        } else if self.slots[inactive.slot()].source.is_some() {
            stage.set_source(inactive, None);
            *self.slot_mut(inactive) = Slot::default();
        }
    }

    /// Handles the end of the active surface's playback.
    ///
    /// A following video becomes active by relabelling only; the stage is not
    /// touched, so the swap performs no load.
    pub fn finish<S: Stage>(&mut self, stage: &mut S, next: &MediaItem) -> Handoff {
        if next.is_video() {
            let active = self.swap();
            debug!(surface = %active, source = %next.source_uri, "swapped video surfaces");
            Handoff::Swapped { active }
        } else {
            self.release(stage);
            Handoff::Released
        }
    }

    /// Stops and clears both surfaces and leaves video mode.
    pub fn release<S: Stage>(&mut self, stage: &mut S) {
        if self.active.take().is_none() {
            return;
        }
        for surface in SurfaceId::BOTH {
            stage.stop(surface);
            if self.slots[surface.slot()].source.is_some() {
                stage.set_source(surface, None);
            }
            *self.slot_mut(surface) = Slot::default();
        }
        debug!("video mode released");
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    use super::*;
    use crate::render::surface::ImageRegion;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Op {
        MountVideo(SurfaceId),
        MountImage(String),
        SetSource(SurfaceId, Option<String>),
        Preload(SurfaceId, String),
        Play(SurfaceId, PlaybackToken),
        Stop(SurfaceId),
    }

    /// Stage stub that records every call.
    #[derive(Debug, Default)]
    pub struct RecordingStage {
        pub ops: Vec<Op>,
        pub reject_play: bool,
    }

    impl Stage for RecordingStage {
        fn mount_video(&mut self, surface: SurfaceId) {
            self.ops.push(Op::MountVideo(surface));
        }

        fn mount_image(&mut self, region: ImageRegion) {
            self.ops.push(Op::MountImage(region.image.source_uri));
        }

        fn set_source(&mut self, surface: SurfaceId, source_uri: Option<&str>) {
            self.ops
                .push(Op::SetSource(surface, source_uri.map(str::to_string)));
        }

        fn preload(&mut self, surface: SurfaceId, source_uri: &str) {
            self.ops.push(Op::Preload(surface, source_uri.to_string()));
        }

        fn play(&mut self, surface: SurfaceId, token: PlaybackToken) -> Result<(), PlaybackError> {
            if self.reject_play {
                return Err(PlaybackError::Rejected {
                    surface,
                    reason: "autoplay blocked".into(),
                });
            }
            self.ops.push(Op::Play(surface, token));
            Ok(())
        }

        fn stop(&mut self, surface: SurfaceId) {
            self.ops.push(Op::Stop(surface));
        }
    }
}
