//! Frame materialization.
//!
//! The encoder wants one file per integer frame. When a sequence has gaps,
//! when the requested range reaches past the frames on disk, or when frames
//! are stepped, the frames are first laid out in a scratch folder:
//!
//! 1. existing frames inside the range are copied concurrently
//! 2. absent frames are filled one by one, in ascending order, either by
//!    holding the previous frame or with a placeholder image; a fill may
//!    read the output of the fill before it, so this pass is sequential
//!    and stops at the first failure
//! 3. with `steps > 1`, every kept frame is copied over the `steps - 1`
//!    frames that follow it
//!
//! Output files are named `{sequence}_{base}.{frame}.{ext}`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};
use vfx_seq::{FrameRange, ImageSequence};

use crate::copy::{copy_batch, CopyJob};
use crate::{ShootError, ShootResult};

/// What stands in for an absent frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapPolicy {
    /// Repeat the nearest preceding frame (the first real frame before it).
    Hold,
    /// Copy this placeholder image.
    Placeholder(PathBuf),
}

/// Effective frame range for a sequence.
///
/// The union of the user range and the sequence's own range, so a user
/// range can extend a movie but never trim it. A still takes the user range
/// as given, or frame 1 without one.
pub fn resolve_range(seq: &ImageSequence, user: Option<FrameRange>) -> FrameRange {
    match (user, seq.range()) {
        (Some(u), Some(own)) => FrameRange::new(u.start().min(own.start()), u.end().max(own.end())),
        (Some(u), None) => u,
        (None, Some(own)) => own,
        (None, None) => FrameRange::single(1),
    }
}

/// True if `range` cannot be encoded straight from the files on disk.
pub fn needs_materialize(seq: &ImageSequence, range: FrameRange, steps: u64) -> bool {
    if steps > 1 || seq.is_still() || !seq.is_uniform_pad() {
        return true;
    }
    let Some(own) = seq.range() else {
        return true;
    };
    if !own.covers(&range) {
        return true;
    }
    seq.missing().iter().any(|f| range.contains(f.value()))
}

/// Counts from a completed materialization.
#[derive(Debug, Clone, Default)]
pub struct FillReport {
    /// Existing frames copied into place.
    pub copied: usize,
    /// Absent frames filled.
    pub filled: usize,
    /// Frames overwritten by step holds.
    pub stepped: usize,
    /// Non-fatal copy failures.
    pub warnings: Vec<String>,
}

/// Layout of the materialized frames for one sequence.
#[derive(Debug, Clone)]
pub struct FramePlan {
    range: FrameRange,
    steps: u64,
    pad: usize,
    dir: PathBuf,
    stem: String,
    ext: String,
    sources: BTreeMap<u64, PathBuf>,
}

impl FramePlan {
    /// Plans `range` of `seq` into `dir`.
    pub fn new(seq: &ImageSequence, range: FrameRange, steps: u64, dir: impl Into<PathBuf>) -> Self {
        let mut sources: BTreeMap<u64, PathBuf> = seq
            .images()
            .iter()
            .filter_map(|img| img.frame().map(|f| (f.value(), img.path().to_path_buf())))
            .collect();
        if sources.is_empty() {
            // A still stands at the start of the range.
            if let Some(still) = seq.images().first() {
                sources.insert(range.start(), still.path().to_path_buf());
            }
        }

        Self {
            range,
            steps: steps.max(1),
            pad: seq.pad_width().max(1),
            dir: dir.into(),
            stem: format!("{}_{}", seq.name(), seq.base_name()),
            ext: seq.ext().to_string(),
            sources,
        }
    }

    /// Frame range being laid out.
    pub fn range(&self) -> FrameRange {
        self.range
    }

    /// Output folder.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Output path of frame `value`.
    pub fn frame_path(&self, value: u64) -> PathBuf {
        self.dir.join(format!(
            "{}.{:0width$}.{}",
            self.stem,
            value,
            self.ext,
            width = self.pad
        ))
    }

    /// Printf-style input pattern for the encoder.
    pub fn pattern(&self) -> PathBuf {
        let token = if self.pad >= 2 {
            format!("%0{}d", self.pad)
        } else {
            "%d".to_string()
        };
        self.dir.join(format!("{}.{}.{}", self.stem, token, self.ext))
    }

    /// Copies of the existing frames inside the range.
    pub fn copies(&self) -> Vec<CopyJob> {
        self.sources
            .range(self.range.start()..=self.range.end())
            .map(|(&v, src)| CopyJob::new(src, self.frame_path(v)))
            .collect()
    }

    /// Frames in the range with no file on disk, ascending.
    pub fn fills(&self) -> Vec<u64> {
        self.range
            .iter()
            .filter(|v| !self.sources.contains_key(v))
            .collect()
    }

    /// Copies that spread each kept frame over the following `steps - 1`.
    pub fn step_holds(&self) -> Vec<CopyJob> {
        if self.steps < 2 {
            return Vec::new();
        }
        let end = self.range.end();
        self.range
            .iter()
            .step_by(self.steps as usize)
            .flat_map(|kept| {
                (kept + 1..kept + self.steps)
                    .filter(move |&v| v <= end)
                    .map(move |v| (kept, v))
            })
            .map(|(kept, v)| CopyJob::new(self.frame_path(kept), self.frame_path(v)))
            .collect()
    }

    /// Source used to hold frame `value`.
    ///
    /// Inside the range this is the frame just written before it. At the
    /// range start it is the nearest original at or before it, or the first
    /// original when the range starts ahead of the sequence.
    fn hold_source(&self, value: u64) -> Option<PathBuf> {
        if value > self.range.start() {
            return Some(self.frame_path(value - 1));
        }
        self.sources
            .range(..=value)
            .next_back()
            .or_else(|| self.sources.iter().next())
            .map(|(_, p)| p.clone())
    }

    /// Lays out every frame of the range in [`dir`](Self::dir).
    ///
    /// The folder must exist. Existing-frame and step copies follow the
    /// batch policy (`strict` turns failures into errors); fills stop the
    /// whole plan at the first failure.
    pub fn execute(&self, policy: &GapPolicy, workers: usize, strict: bool) -> ShootResult<FillReport> {
        trace!(range = %self.range, steps = self.steps, dir = %self.dir.display(), "FramePlan::execute");
        let mut report = FillReport::default();

        let copied = copy_batch(&self.copies(), workers)?.into_result(strict)?;
        report.copied = copied.copied;
        report.warnings.extend(copied.failures);

        for value in self.fills() {
            let src = match policy {
                GapPolicy::Hold => self.hold_source(value).ok_or_else(|| ShootError::Fill {
                    frame: value,
                    reason: "no frame to hold".into(),
                })?,
                GapPolicy::Placeholder(path) => path.clone(),
            };
            let dest = self.frame_path(value);
            std::fs::copy(&src, &dest).map_err(|e| ShootError::Fill {
                frame: value,
                reason: format!("{} -> {}: {}", src.display(), dest.display(), e),
            })?;
            report.filled += 1;
        }

        let stepped = copy_batch(&self.step_holds(), workers)?.into_result(strict)?;
        report.stepped = stepped.copied;
        report.warnings.extend(stepped.failures);

        debug!(
            copied = report.copied,
            filled = report.filled,
            stepped = report.stepped,
            "frames materialized"
        );
        Ok(report)
    }
}
