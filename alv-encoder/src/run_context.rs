//! Directory layout of one pipeline run
//!
//! ```text
//! <root>/temp/imageDir/   frames extracted from a video
//! <root>/temp/source/     opaque copies
//! <root>/temp/mask/       alpha masks (raw and packed)
//! <root>/temp/output/     composed frames, 00000.jpg ...
//! <root>/output/video.mp4
//! ```
//!
//! Everything under `temp/` belongs to the run and is removed when it ends.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the final video inside `output/`
pub const VIDEO_FILE_NAME: &str = "video.mp4";

/// Input pattern matching [`canonical_name`]
pub const CANONICAL_PATTERN: &str = "%05d.jpg";

/// Canonical output name of frame `index`
pub fn canonical_name(index: usize) -> String {
    format!("{:05}.jpg", index)
}

/// Paths owned by one pipeline run
#[derive(Debug, Clone)]
pub struct RunContext {
    root: PathBuf,
    temp_root: PathBuf,
    image_dir: PathBuf,
    source_dir: PathBuf,
    mask_dir: PathBuf,
    output_frames_dir: PathBuf,
    video_path: PathBuf,
}

impl RunContext {
    /// Computes the layout below `root` without touching the filesystem
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let temp_root = root.join("temp");
        Self {
            image_dir: temp_root.join("imageDir"),
            source_dir: temp_root.join("source"),
            mask_dir: temp_root.join("mask"),
            output_frames_dir: temp_root.join("output"),
            video_path: root.join("output").join(VIDEO_FILE_NAME),
            temp_root,
            root,
        }
    }

    /// Creates the run directories below `root`.
    ///
    /// Leftovers from an earlier run under `temp/` are discarded first, so every
    /// run starts from an empty working set. Calling this again on the same
    /// root yields the same directories.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let ctx = Self::new(root);

        if ctx.temp_root.exists() {
            debug!(path = %ctx.temp_root.display(), "removing stale temp directory");
            std::fs::remove_dir_all(&ctx.temp_root).map_err(|source| Error::DirectoryCreation {
                path: ctx.temp_root.clone(),
                source,
            })?;
        }

        for dir in ctx.directories() {
            std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreation {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        Ok(ctx)
    }

    fn directories(&self) -> [&Path; 5] {
        [
            &self.image_dir,
            &self.source_dir,
            &self.mask_dir,
            &self.output_frames_dir,
            self.output_dir(),
        ]
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn mask_dir(&self) -> &Path {
        &self.mask_dir
    }

    pub fn output_frames_dir(&self) -> &Path {
        &self.output_frames_dir
    }

    /// Persistent output directory
    pub fn output_dir(&self) -> &Path {
        self.video_path.parent().unwrap_or(&self.root)
    }

    pub fn video_path(&self) -> &Path {
        &self.video_path
    }

    /// Removes the temp root. Failures are logged, never returned.
    pub fn cleanup(&self) {
        match std::fs::remove_dir_all(&self.temp_root) {
            Ok(()) => debug!(path = %self.temp_root.display(), "removed temp directory"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.temp_root.display(), error = %e, "failed to remove temp directory"),
        }
    }
}

/// Deletes a file, treating a missing file as success
pub fn remove_file_if_exists(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove temp file"),
    }
}
