use std::time::Duration;

use store_directory::OverlayPanel;
use tracing::debug;

use crate::render::dual_buffer::DualBufferRenderer;
use crate::render::surface::{ImageLayer, ImageRegion, Stage};
use crate::render::transition::Entrance;
use crate::sequence::MediaItem;

/// Shows one image with the overlay panel and reports how long it should stay up.
#[derive(Debug, Clone)]
pub struct ImagePresenter {
    overlay: Option<OverlayPanel>,
    transition_duration: Duration,
}

impl ImagePresenter {
    pub fn new(overlay: Option<OverlayPanel>, transition_duration: Duration) -> Self {
        Self {
            overlay,
            transition_duration,
        }
    }

    pub fn overlay(&self) -> Option<&OverlayPanel> {
        self.overlay.as_ref()
    }

    /// Builds the region for `item`; every call gets its own copy of the overlay.
    pub fn compose(&self, item: &MediaItem) -> ImageRegion {
        ImageRegion {
            image: ImageLayer {
                source_uri: item.source_uri.clone(),
            },
            overlay: self.overlay.clone(),
            entrance: Entrance::for_style(item.transition, self.transition_duration),
        }
    }

    /// Mounts `item`, primes the dormant video surface when `next` is a video,
    /// and returns the dwell time to schedule.
    pub fn present<S: Stage>(
        &self,
        stage: &mut S,
        renderer: &mut DualBufferRenderer,
        item: &MediaItem,
        next: &MediaItem,
    ) -> Duration {
        stage.mount_image(self.compose(item));
        if next.is_video() {
            debug!(source = %next.source_uri, "preloading next video behind image");
            renderer.prime(stage, next);
        }
        item.dwell()
    }
}
