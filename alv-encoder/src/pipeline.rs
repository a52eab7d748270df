//! Frame pipeline
//!
//! One run goes through `Init` (create the run directories), `Sequencing`
//! (list and naturally order the frames), one `PerFrame` step per frame, and
//! `Finalizing` (encode the composed frames and remove `temp/`).
//!
//! Per-frame failures never stop a run: they are collected into the
//! [`RunSummary`]. Failing to create directories, finding no frames, or a
//! failed final encode abort the run. The temp root is removed in every case.

use crate::bridge;
use crate::progress_tracker::ProgressTracker;
use crate::raster_io;
use crate::run_context::{canonical_name, remove_file_if_exists, RunContext, CANONICAL_PATTERN};
use crate::tools::{ChannelEditor, EditOp, FrameEncoder, FrameExtractor};
use crate::{Error, PipelineConfig, Result};
use alv_core::{natural_cmp, pack_mask};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

/// A source frame and the index that names all of its artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedFrame {
    pub index: usize,
    pub name: String,
    pub path: PathBuf,
}

/// A frame that could not be composed
#[derive(Debug)]
pub struct FrameFailure {
    pub index: usize,
    pub name: String,
    pub error: Error,
}

/// Outcome of a finished run
#[derive(Debug)]
pub struct RunSummary {
    /// Frames found during sequencing
    pub frames: usize,
    /// Frames that made it into the video
    pub encoded: usize,
    /// Frames skipped because a step failed, in index order
    pub failures: Vec<FrameFailure>,
    /// The encoded video
    pub output: PathBuf,
}

impl RunSummary {
    /// True when every frame was encoded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Lists the frames of `dir` in natural order.
///
/// Only regular files with a recognized extension are kept; anything else is
/// ignored. Names that are not valid UTF-8 are ordered by their lossy form
/// and still read through their original path.
pub fn sequence_frames(dir: &Path, config: &PipelineConfig) -> Result<Vec<SequencedFrame>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if config.accepts(&name) {
            entries.push((name, path));
        }
    }

    if entries.is_empty() {
        return Err(Error::EmptyInput(dir.to_path_buf()));
    }

    entries.sort_by(|(a, _), (b, _)| natural_cmp(a, b));
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(index, (name, path))| SequencedFrame { index, name, path })
        .collect())
}

/// Temp and output files of one frame, all named after its index
struct FramePaths {
    source: PathBuf,
    raw_mask: PathBuf,
    mask: PathBuf,
    output: PathBuf,
}

impl FramePaths {
    fn new(ctx: &RunContext, index: usize) -> Self {
        let stem = format!("{:05}", index);
        Self {
            source: ctx.source_dir().join(format!("{stem}.png")),
            raw_mask: ctx.mask_dir().join(format!("{stem}_temp.png")),
            mask: ctx.mask_dir().join(format!("{stem}.png")),
            output: ctx.output_frames_dir().join(canonical_name(index)),
        }
    }

    fn remove_temps(&self) {
        for path in [&self.source, &self.raw_mask, &self.mask] {
            remove_file_if_exists(path);
        }
    }
}

/// Converts frame directories and videos into alpha-strip videos
pub struct FramePipeline<X, C, E> {
    config: PipelineConfig,
    extractor: X,
    editor: C,
    encoder: E,
}

impl<X, C, E> FramePipeline<X, C, E>
where
    X: FrameExtractor,
    C: ChannelEditor,
    E: FrameEncoder,
{
    /// Creates a pipeline from its configuration and tool capabilities
    pub fn new(config: PipelineConfig, extractor: X, editor: C, encoder: E) -> Self {
        Self {
            config,
            extractor,
            editor,
            encoder,
        }
    }

    /// Converts the frames in `dir`. The run root is `dir` itself.
    pub fn run_dir(&self, dir: &Path) -> Result<RunSummary> {
        if !dir.is_dir() {
            return Err(Error::InputNotFound(dir.to_path_buf()));
        }
        info!(dir = %dir.display(), "converting image directory");

        let ctx = RunContext::init(dir)?;
        let result = self.process(&ctx, dir);
        ctx.cleanup();
        result
    }

    /// Converts `video`. The run root is `<work_dir>/<video stem>`.
    pub fn run_video(&self, video: &Path, work_dir: &Path) -> Result<RunSummary> {
        if !video.is_file() {
            return Err(Error::InputNotFound(video.to_path_buf()));
        }
        let stem = video_stem(video);
        info!(video = %video.display(), "converting video");

        let ctx = RunContext::init(work_dir.join(&stem))?;
        let result = bridge::video_to_frames(
            &self.extractor,
            video,
            ctx.image_dir(),
            Some(&stem),
            self.config.fps,
        )
        .and_then(|()| self.process(&ctx, ctx.image_dir()));
        ctx.cleanup();
        result
    }

    fn process(&self, ctx: &RunContext, frames_dir: &Path) -> Result<RunSummary> {
        let frames = sequence_frames(frames_dir, &self.config)?;
        info!(count = frames.len(), "found frames, processing");

        let tracker = ProgressTracker::new(frames.len() as u64, "progress");
        let mut failures = self.process_frames(ctx, &frames, &tracker);
        failures.sort_by_key(|f| f.index);

        let encoded = frames.len() - failures.len();
        if encoded == 0 {
            return Err(Error::AllFramesFailed(frames.len()));
        }
        if !failures.is_empty() {
            warn!(
                failed = failures.len(),
                "some frames failed, renumbering the remaining frames"
            );
            compact_outputs(ctx, frames.len(), &failures)?;
        }

        bridge::frames_to_video(
            &self.encoder,
            ctx.output_frames_dir(),
            CANONICAL_PATTERN,
            self.config.fps,
            self.config.bitrate_kbps,
            ctx.video_path(),
        )?;
        info!(output = %ctx.video_path().display(), encoded, "video written");

        Ok(RunSummary {
            frames: frames.len(),
            encoded,
            failures,
            output: ctx.video_path().to_path_buf(),
        })
    }

    /// Runs every frame, on scoped worker threads when more than one worker is
    /// configured. Returns once all frames are done.
    fn process_frames(
        &self,
        ctx: &RunContext,
        frames: &[SequencedFrame],
        tracker: &ProgressTracker,
    ) -> Vec<FrameFailure> {
        let workers = self.config.worker_count().min(frames.len());
        if workers <= 1 {
            return frames
                .iter()
                .filter_map(|frame| self.run_frame(ctx, frame, tracker))
                .collect();
        }

        let next = &AtomicUsize::new(0);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    s.spawn(move || {
                        let mut failures = Vec::new();
                        while let Some(frame) = frames.get(next.fetch_add(1, Ordering::Relaxed)) {
                            failures.extend(self.run_frame(ctx, frame, tracker));
                        }
                        failures
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
    }

    fn run_frame(
        &self,
        ctx: &RunContext,
        frame: &SequencedFrame,
        tracker: &ProgressTracker,
    ) -> Option<FrameFailure> {
        let paths = FramePaths::new(ctx, frame.index);
        let result = self.compose_frame(frame, &paths);
        paths.remove_temps();
        tracker.increment_and_report();

        match result {
            Ok(()) => None,
            Err(error) => {
                // a partial composite must not reach the encoder
                remove_file_if_exists(&paths.output);
                warn!(index = frame.index, name = %frame.name, error = %error, "frame failed");
                Some(FrameFailure {
                    index: frame.index,
                    name: frame.name.clone(),
                    error,
                })
            }
        }
    }

    fn compose_frame(&self, frame: &SequencedFrame, paths: &FramePaths) -> Result<()> {
        self.edit(EditOp::RemoveAlpha {
            input: frame.path.clone(),
            output: paths.source.clone(),
        })?;

        match self.config.pack {
            Some(mode) => {
                self.edit(EditOp::SeparateAlpha {
                    input: frame.path.clone(),
                    output: paths.raw_mask.clone(),
                })?;
                let alpha = raster_io::read_mask(&paths.raw_mask)?;
                let packed = pack_mask(&alpha, mode)?;
                raster_io::write_raster(&paths.mask, &packed)?;
            }
            None => self.edit(EditOp::SeparateAlpha {
                input: frame.path.clone(),
                output: paths.mask.clone(),
            })?,
        }

        self.edit(EditOp::Append {
            left: paths.mask.clone(),
            right: paths.source.clone(),
            output: paths.output.clone(),
        })
    }

    /// Applies one edit and checks that it produced its output file
    fn edit(&self, op: EditOp) -> Result<()> {
        self.editor.apply(&op)?;
        if !op.output().is_file() {
            return Err(Error::MissingOutput(op.output().to_path_buf()));
        }
        Ok(())
    }
}

/// Name of a video up to its first dot, used as run root and frame prefix
fn video_stem(video: &Path) -> String {
    let name = video
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => "video".to_string(),
    }
}

/// Renames the surviving composed frames so their indices are contiguous.
///
/// `failures` must be sorted by index. Renames go in ascending order, so a
/// target name is always free when it is written.
fn compact_outputs(ctx: &RunContext, total: usize, failures: &[FrameFailure]) -> Result<()> {
    let dir = ctx.output_frames_dir();
    let survivors = (0..total).filter(|i| failures.binary_search_by_key(i, |f| f.index).is_err());

    for (target, index) in survivors.enumerate() {
        if target != index {
            std::fs::rename(dir.join(canonical_name(index)), dir.join(canonical_name(target)))?;
        }
    }
    Ok(())
}
