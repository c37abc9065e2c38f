use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;

/// Scratch directory for intermediate frames and segments
///
/// The directory exists exactly as long as this guard: [`cleanup`](Self::cleanup)
/// removes it on the normal path and `Drop` removes it on every other one.
#[derive(Debug)]
pub struct ScratchWorkspace {
    root: PathBuf,
    removed: bool,
}

impl ScratchWorkspace {
    /// Create the directory, clearing leftovers of an interrupted run
    pub fn create<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();

        if root.exists() {
            warn!("Removing stale scratch directory {:?}", root);
            std::fs::remove_dir_all(&root)?;
        }
        std::fs::create_dir_all(&root)?;
        debug!("Created scratch directory {:?}", root);

        Ok(Self { root, removed: false })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Normalized photo `index`
    pub fn frame_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("frame_{:04}.jpg", index))
    }

    /// Raw composed title frame, before normalization
    pub fn title_card_path(&self) -> PathBuf {
        self.root.join("title_card.jpg")
    }

    /// Normalized title frame
    pub fn final_frame_path(&self) -> PathBuf {
        self.root.join("final_frame.jpg")
    }

    pub fn segment_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("segment_{:04}.mp4", index))
    }

    pub fn final_segment_path(&self) -> PathBuf {
        self.root.join("final_segment.mp4")
    }

    /// Delete the directory and report failures
    pub fn cleanup(mut self) -> Result<()> {
        self.removed = true;
        if self.root.exists() {
            std::fs::remove_dir_all(&self.root)?;
        }
        info!("Cleaned up temporary files");
        Ok(())
    }
}

impl Drop for ScratchWorkspace {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove temporary directory {:?}: {}", self.root, e);
            }
        }
    }
}
