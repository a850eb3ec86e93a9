pub mod config;
pub mod error;
pub mod events;
pub mod overlay;
pub mod probe;
pub mod sequence;
pub mod render {
    pub mod dual_buffer;
    pub mod headless;
    pub mod presenter;
    pub mod surface;
    pub mod transition;
}
pub mod tasks {
    pub mod engine;
}

pub use overlay::OverlayPanel;
