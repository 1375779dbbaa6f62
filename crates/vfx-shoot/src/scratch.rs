//! Scratch area for renamed and filled frames.
//!
//! Layout under the configured root:
//!
//! ```text
//! <root>/combine/          re-indexed copies of combined sequences
//! <root>/frames/<index>/   materialized frames, one folder per sequence
//! <root>/placeholder/      generated missing-frame images
//! ```
//!
//! A single writer is assumed; two sessions sharing a root will clobber
//! each other.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Handle on the scratch directory tree.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    /// Uses `root` as the scratch directory. Nothing is created yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Scratch root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder holding the combined sequence.
    pub fn combine_dir(&self) -> PathBuf {
        self.root.join("combine")
    }

    /// Folder holding all materialized frames.
    pub fn frames_dir(&self) -> PathBuf {
        self.root.join("frames")
    }

    /// Folder holding materialized frames of sequence `index`.
    pub fn sequence_dir(&self, index: usize) -> PathBuf {
        self.frames_dir().join(index.to_string())
    }

    /// Folder holding generated placeholders.
    pub fn placeholder_dir(&self) -> PathBuf {
        self.root.join("placeholder")
    }

    /// Wipes `dir` and creates it empty.
    pub fn reset(&self, dir: &Path) -> io::Result<()> {
        remove_dir_if_present(dir)?;
        std::fs::create_dir_all(dir)?;
        debug!(dir = %dir.display(), "scratch reset");
        Ok(())
    }

    /// Removes the whole scratch tree. Absent trees are fine.
    pub fn cleanup(&self) -> io::Result<()> {
        remove_dir_if_present(&self.root)
    }
}

fn remove_dir_if_present(dir: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::new(dir.path().join("shoot"));
        let frames = scratch.sequence_dir(0);

        scratch.reset(&frames).unwrap();
        std::fs::write(frames.join("a.0001.exr"), b"x").unwrap();
        scratch.reset(&frames).unwrap();
        assert_eq!(std::fs::read_dir(&frames).unwrap().count(), 0);

        scratch.cleanup().unwrap();
        assert!(!scratch.root().exists());
        scratch.cleanup().unwrap();
    }
}
