//! Directory-backed debug frame store

use crate::drivers::{DebugSink, Frame};
use crate::error::Result;
use std::path::PathBuf;

/// Persists debug frames as PNG files under a fixed directory.
///
/// Write-only side channel for operator inspection; there is no defined
/// read-back format.
pub struct DebugStore {
    dir: PathBuf,
}

impl DebugStore {
    /// Create the store, creating the target directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        log::debug!("DebugStore: Saving frames under {:?}", dir);
        Ok(Self { dir })
    }
}

impl DebugSink for DebugStore {
    fn save(&mut self, image: &Frame, label: &str) {
        let path = self.dir.join(format!("{}.png", label));
        match image.save(&path) {
            Ok(()) => log::debug!("DebugStore: Saved {:?}", path),
            Err(e) => log::warn!("DebugStore: Failed to save {:?}: {}", path, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saves_png_under_label() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DebugStore::new(dir.path()).unwrap();

        let frame = Frame::from_pixel(16, 16, image::Luma([128u8]));
        store.save(&frame, "step_3");

        assert!(dir.path().join("step_3.png").exists());
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DebugStore::new(dir.path()).unwrap();

        // Zero-sized frames cannot be encoded; save must not panic
        let empty = Frame::new(0, 0);
        store.save(&empty, "degenerate");
    }
}
