use anyhow::{Context, Result};
use tracing::{info, warn};

pub use store_directory::{OverlayPanel, StoreDirectory};

use crate::config::Configuration;
use crate::error::OverlayLookupMiss;

/// Source of the informational panel shown next to every image.
pub trait OverlayProvider {
    fn build_overlay(&self, display_id: &str) -> Option<OverlayPanel>;
}

impl OverlayProvider for StoreDirectory {
    fn build_overlay(&self, display_id: &str) -> Option<OverlayPanel> {
        StoreDirectory::build_overlay(self, display_id)
    }
}

/// Looks up the overlay once; a miss is logged and playback continues without it.
pub fn resolve_overlay<P>(provider: &P, display_id: &str) -> Option<OverlayPanel>
where
    P: OverlayProvider + ?Sized,
{
    match provider.build_overlay(display_id) {
        Some(panel) => {
            info!(display_id, location = %panel.location, "overlay panel ready");
            Some(panel)
        }
        None => {
            let miss = OverlayLookupMiss {
                display_id: display_id.to_string(),
            };
            warn!(%miss, "continuing without overlay");
            None
        }
    }
}

/// Loads the store directory named by the configuration and builds the overlay template.
///
/// An unreadable directory is a startup error; a missing record is not.
pub fn load_overlay(cfg: &Configuration) -> Result<Option<OverlayPanel>> {
    let (Some(path), Some(display_id)) = (&cfg.store_directory, &cfg.store_number) else {
        info!("no store directory configured; images show without overlay");
        return Ok(None);
    };
    let directory = StoreDirectory::from_yaml_file(path)
        .with_context(|| format!("failed to load store directory {}", path.display()))?;
    info!(stores = directory.len(), path = %path.display(), "store directory loaded");
    Ok(resolve_overlay(&directory, display_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const STORES: &str = r#"
stores:
  - store-number: "1042"
    address: "12 Main Street"
"#;

    #[test]
    fn miss_is_not_fatal() {
        let directory = StoreDirectory::from_yaml_str(STORES).unwrap();
        assert!(resolve_overlay(&directory, "1042").is_some());
        assert!(resolve_overlay(&directory, "0000").is_none());
    }

    #[test]
    fn loads_from_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stores.yaml");
        std::fs::write(&path, STORES).unwrap();
        let cfg = Configuration {
            store_directory: Some(path),
            store_number: Some("1042".into()),
            ..Configuration::default()
        };
        let panel = load_overlay(&cfg).unwrap().expect("overlay");
        assert_eq!(panel.location, "12 Main Street");
    }

    #[test]
    fn unreadable_directory_is_an_error() {
        let cfg = Configuration {
            store_directory: Some(PathBuf::from("/nonexistent/stores.yaml")),
            store_number: Some("1042".into()),
            ..Configuration::default()
        };
        assert!(load_overlay(&cfg).is_err());
    }

    #[test]
    fn unconfigured_overlay_is_none() {
        assert!(load_overlay(&Configuration::default()).unwrap().is_none());
    }
}
