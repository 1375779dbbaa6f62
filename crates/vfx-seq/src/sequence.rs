//! Image sequences.
//!
//! An [`ImageSequence`] is an ordered collection of [`Image`]s that share one
//! naming pattern. Every insertion is checked with
//! [`ImageSequence::includes`]; frame-derived views are cached and rebuilt
//! lazily after each change.
//!
//! ```rust,no_run
//! use vfx_seq::{Image, ImageSequence};
//!
//! let mut seq = ImageSequence::new(true);
//! for name in ["shot.0001.exr", "shot.0002.exr", "shot.0004.exr"] {
//!     seq.append(Image::open(name)?)?;
//! }
//! assert_eq!(seq.frame_range(true), "[1-2, 4]");
//! assert_eq!(seq.missing().len(), 1);
//! # Ok::<(), vfx_seq::SeqError>(())
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use tracing::trace;

use crate::frame::Frame;
use crate::image::Image;
use crate::range::{self, FrameRange};
use crate::{SeqError, SeqResult};

/// A frame-consistent collection of images.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    images: Vec<Image>,
    strict_pad: bool,
    frames: OnceLock<Vec<Frame>>,
    missing: OnceLock<Vec<Frame>>,
}

impl ImageSequence {
    /// Creates an empty sequence.
    ///
    /// With `strict_pad`, members must share the frame padding width.
    pub fn new(strict_pad: bool) -> Self {
        Self {
            images: Vec::new(),
            strict_pad,
            frames: OnceLock::new(),
            missing: OnceLock::new(),
        }
    }

    /// Builds a sequence from images, failing on the first non-member.
    pub fn from_images<I>(images: I, strict_pad: bool) -> SeqResult<Self>
    where
        I: IntoIterator<Item = Image>,
    {
        let mut seq = Self::new(strict_pad);
        seq.extend(images)?;
        Ok(seq)
    }

    /// Groups images into sequences.
    ///
    /// Each image joins the first existing sequence that includes it, or
    /// starts a new one. Sequence order follows first appearance.
    pub fn group<I>(images: I, strict_pad: bool) -> Vec<ImageSequence>
    where
        I: IntoIterator<Item = Image>,
    {
        let mut sequences: Vec<ImageSequence> = Vec::new();
        for image in images {
            match sequences.iter_mut().find(|s| s.includes(&image)) {
                Some(seq) => seq.push_unchecked(image),
                None => {
                    let mut seq = ImageSequence::new(strict_pad);
                    seq.push_unchecked(image);
                    sequences.push(seq);
                }
            }
        }
        sequences
    }

    /// Appends an image after checking membership.
    pub fn append(&mut self, image: Image) -> SeqResult<()> {
        self.check(&image)?;
        self.push_unchecked(image);
        Ok(())
    }

    /// Inserts an image at `index` after checking membership.
    ///
    /// `index` is clamped to the sequence length.
    pub fn insert(&mut self, index: usize, image: Image) -> SeqResult<()> {
        self.check(&image)?;
        let index = index.min(self.images.len());
        self.images.insert(index, image);
        self.invalidate();
        Ok(())
    }

    /// Appends every image, failing on the first non-member.
    ///
    /// Images accepted before the failure stay in the sequence.
    pub fn extend<I>(&mut self, images: I) -> SeqResult<()>
    where
        I: IntoIterator<Item = Image>,
    {
        for image in images {
            self.append(image)?;
        }
        Ok(())
    }

    /// Removes and returns the last inserted image.
    pub fn pop(&mut self) -> Option<Image> {
        let image = self.images.pop();
        self.invalidate();
        image
    }

    /// True if `candidate` may join this sequence.
    ///
    /// An empty sequence accepts anything. Otherwise the candidate must be a
    /// sequence member of the first or the last image, skipping whichever of
    /// the two it already is.
    pub fn includes(&self, candidate: &Image) -> bool {
        let (Some(first), Some(last)) = (self.images.first(), self.images.last()) else {
            return true;
        };
        [first, last]
            .into_iter()
            .filter(|reference| *reference != candidate)
            .any(|reference| candidate.is_sequence_member(reference, self.strict_pad))
    }

    fn check(&self, image: &Image) -> SeqResult<()> {
        if self.includes(image) {
            Ok(())
        } else {
            trace!(image = %image, "rejected as sequence member");
            Err(SeqError::NotMember(image.path().to_path_buf()))
        }
    }

    fn push_unchecked(&mut self, image: Image) {
        self.images.push(image);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.frames.take();
        self.missing.take();
    }

    /// Whether padding must match for membership.
    pub fn strict_pad(&self) -> bool {
        self.strict_pad
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// True if the sequence holds no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Images in insertion order.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Images ordered by frame; stills keep their insertion order at the end.
    pub fn sorted_images(&self) -> Vec<&Image> {
        let mut sorted: Vec<&Image> = self.images.iter().collect();
        sorted.sort_by_key(|img| (img.frame().is_none(), img.frame()));
        sorted
    }

    /// Image for frame `value`, if present on disk.
    pub fn image_at(&self, value: u64) -> Option<&Image> {
        self.images
            .iter()
            .find(|img| img.frame().is_some_and(|f| f == value))
    }

    /// Sorted frames of all numbered members.
    pub fn frames(&self) -> &[Frame] {
        self.frames.get_or_init(|| {
            let mut frames: Vec<Frame> = self.images.iter().filter_map(Image::frame).collect();
            frames.sort();
            frames
        })
    }

    /// Sorted synthetic frames filling the gaps between first and last frame.
    pub fn missing(&self) -> &[Frame] {
        self.missing.get_or_init(|| {
            let (Some(range), Some(template)) = (self.range(), self.first()) else {
                return Vec::new();
            };
            let present: BTreeSet<u64> = self.frames().iter().map(Frame::value).collect();
            let pad = self.pad_width();
            range
                .iter()
                .filter(|v| !present.contains(v))
                .filter_map(|v| Frame::from_int(v, pad, template.file_name()).ok())
                .collect()
        })
    }

    /// First numbered frame.
    pub fn start(&self) -> Option<Frame> {
        self.frames().first().copied()
    }

    /// Last numbered frame.
    pub fn end(&self) -> Option<Frame> {
        self.frames().last().copied()
    }

    /// Range from the first to the last frame.
    pub fn range(&self) -> Option<FrameRange> {
        match (self.start(), self.end()) {
            (Some(s), Some(e)) => Some(FrameRange::new(s.value(), e.value())),
            _ => None,
        }
    }

    /// Lowest-frame image, or the first still.
    pub fn first(&self) -> Option<&Image> {
        self.sorted_images().first().copied()
    }

    /// Highest-frame image.
    pub fn last(&self) -> Option<&Image> {
        self.sorted_images()
            .into_iter()
            .filter(|img| !img.is_still())
            .next_back()
            .or_else(|| self.images.last())
    }

    /// Compact frame-range text.
    ///
    /// With `include_missing` every contiguous run is shown (`[1-3, 5]`);
    /// without it the gaps are ignored and only `start-end` is returned.
    /// A sequence without frames yields `""`.
    pub fn frame_range(&self, include_missing: bool) -> String {
        let values: Vec<u64> = self.frames().iter().map(Frame::value).collect();
        if include_missing {
            range::format_runs(&values)
        } else {
            self.range().map(|r| r.to_string()).unwrap_or_default()
        }
    }

    /// Frame padding width of the first frame (1 for stills).
    pub fn pad_width(&self) -> usize {
        self.start().map(|f| f.pad()).unwrap_or(1)
    }

    /// Printf-style padding: `%04d`, or `%d` below two digits.
    pub fn padding(&self) -> String {
        match self.pad_width() {
            n if n >= 2 => format!("%0{}d", n),
            _ => "%d".to_string(),
        }
    }

    /// True if every frame is written with the same number of digits.
    pub fn is_uniform_pad(&self) -> bool {
        let pad = self.pad_width();
        self.frames().iter().all(|f| f.pad() == pad)
    }

    /// Directory leaf name, used as the sequence name.
    pub fn name(&self) -> String {
        self.dir()
            .and_then(|d| d.file_name())
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Containing directory.
    pub fn dir(&self) -> Option<&Path> {
        self.images.first().map(Image::dir)
    }

    /// Base name shared by all members.
    pub fn base_name(&self) -> &str {
        self.first().map(Image::base_name).unwrap_or_default()
    }

    /// Extension shared by all members.
    pub fn ext(&self) -> &str {
        self.first().map(Image::ext).unwrap_or_default()
    }

    /// Pixel size of the first frame.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.first().map(|img| (img.width(), img.height()))
    }

    /// True if the sequence is a single still image.
    pub fn is_still(&self) -> bool {
        self.frames().is_empty() && !self.images.is_empty()
    }

    /// Printf-style path pattern (`/dir/shot.%04d.exr`).
    pub fn printf_pattern(&self) -> String {
        self.pattern_with(&self.padding())
    }

    /// Hash-style path pattern (`/dir/shot.####.exr`).
    pub fn hash_pattern(&self) -> String {
        self.pattern_with(&"#".repeat(self.pad_width()))
    }

    fn pattern_with(&self, token: &str) -> String {
        let Some(first) = self.first() else {
            return String::new();
        };
        let name = if first.is_still() {
            first.file_name().to_string()
        } else {
            format!("{}{}{}", first.prefix(), token, first.suffix())
        };
        first.dir().join(name).display().to_string()
    }
}

impl fmt::Display for ImageSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.printf_pattern())?;
        let range = self.frame_range(true);
        if !range.is_empty() {
            write!(f, " {}", range)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ImageSequence {
    type Item = &'a Image;
    type IntoIter = std::slice::Iter<'a, Image>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::FixedProbe;

    fn open(dir: &Path, name: &str) -> Image {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        Image::open_with(&path, &FixedProbe::new(8, 8)).unwrap()
    }

    fn build(dir: &Path, names: &[&str]) -> ImageSequence {
        let images = names.iter().map(|n| open(dir, n));
        ImageSequence::from_images(images, true).unwrap()
    }

    #[test]
    fn test_insertion_order_independent() {
        let orders = [
            ["a1.0001.exr", "a1.0002.exr", "a1.0003.exr"],
            ["a1.0003.exr", "a1.0001.exr", "a1.0002.exr"],
            ["a1.0002.exr", "a1.0003.exr", "a1.0001.exr"],
        ];
        for names in orders {
            let dir = tempfile::tempdir().unwrap();
            let seq = build(dir.path(), &names);
            assert_eq!(seq.frame_range(true), "[1-3]");
            assert!(seq.missing().is_empty());
        }
    }

    #[test]
    fn test_missing_frames() {
        let dir = tempfile::tempdir().unwrap();
        let seq = build(dir.path(), &["a.0001.exr", "a.0003.exr", "a.0005.exr"]);
        let missing: Vec<u64> = seq.missing().iter().map(Frame::value).collect();
        assert_eq!(missing, vec![2, 4]);
        assert_eq!(seq.missing()[0].to_string(), "0002");
        assert_eq!(seq.frame_range(true), "[1, 3, 5]");
        assert_eq!(seq.frame_range(false), "1-5");
    }

    #[test]
    fn test_cache_invalidated_on_append() {
        let dir = tempfile::tempdir().unwrap();
        let mut seq = build(dir.path(), &["a.0001.exr", "a.0003.exr"]);
        assert_eq!(seq.missing().len(), 1);
        seq.append(open(dir.path(), "a.0002.exr")).unwrap();
        assert!(seq.missing().is_empty());
        assert_eq!(seq.frame_range(true), "[1-3]");
        seq.insert(0, open(dir.path(), "a.0007.exr")).unwrap();
        assert_eq!(seq.frame_range(true), "[1-3, 7]");
        assert_eq!(seq.end().unwrap().value(), 7);
    }

    #[test]
    fn test_rejects_non_member() {
        let dir = tempfile::tempdir().unwrap();
        let mut seq = build(dir.path(), &["a.0001.exr", "a.0002.exr"]);
        let err = seq.append(open(dir.path(), "b.0003.exr"));
        assert!(matches!(err, Err(SeqError::NotMember(_))));
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_rejects_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let mut seq = build(dir.path(), &["a.0001.exr"]);
        assert!(seq.append(open(dir.path(), "a.0001.exr")).is_err());
    }

    #[test]
    fn test_strict_pad_sequences() {
        let dir = tempfile::tempdir().unwrap();
        let a = open(dir.path(), "a.01.exr");
        let b = open(dir.path(), "a.1.exr");

        let mut strict = ImageSequence::new(true);
        strict.append(a.clone()).unwrap();
        assert!(!strict.includes(&b));

        let mut loose = ImageSequence::new(false);
        loose.append(a).unwrap();
        loose.append(b).unwrap();
        assert!(!loose.is_uniform_pad());
    }

    #[test]
    fn test_group() {
        let dir = tempfile::tempdir().unwrap();
        let images = ["a.0001.exr", "b.0001.exr", "a.0002.exr", "slate.png", "b.0002.exr"]
            .iter()
            .map(|n| open(dir.path(), n))
            .collect::<Vec<_>>();
        let seqs = ImageSequence::group(images, true);
        assert_eq!(seqs.len(), 3);
        assert_eq!(seqs[0].base_name(), "a");
        assert_eq!(seqs[1].frame_range(true), "[1-2]");
        assert!(seqs[2].is_still());
        assert_eq!(seqs[2].frame_range(true), "");
    }

    #[test]
    fn test_padding() {
        let dir = tempfile::tempdir().unwrap();
        let seq = build(dir.path(), &["a.0001.exr"]);
        assert_eq!(seq.padding(), "%04d");
        assert_eq!(seq.pad_width(), 4);
        let dir = tempfile::tempdir().unwrap();
        let seq = build(dir.path(), &["a.1.exr", "a.2.exr"]);
        assert_eq!(seq.padding(), "%d");
    }

    #[test]
    fn test_patterns_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let shot = dir.path().join("sh010");
        std::fs::create_dir(&shot).unwrap();
        let seq = build(&shot, &["comp.0001.exr", "comp.0002.exr", "comp.0004.exr"]);
        assert_eq!(seq.name(), "sh010");
        assert!(seq.printf_pattern().ends_with("comp.%04d.exr"));
        assert!(seq.hash_pattern().ends_with("comp.####.exr"));
        assert!(seq.to_string().ends_with("comp.%04d.exr [1-2, 4]"));
        assert_eq!(seq.dimensions(), Some((8, 8)));
    }

    #[test]
    fn test_first_last_by_frame() {
        let dir = tempfile::tempdir().unwrap();
        let seq = build(dir.path(), &["a.0005.exr", "a.0002.exr", "a.0009.exr"]);
        assert_eq!(seq.first().unwrap().file_name(), "a.0002.exr");
        assert_eq!(seq.last().unwrap().file_name(), "a.0009.exr");
        assert_eq!(seq.image_at(5).unwrap().file_name(), "a.0005.exr");
        assert!(seq.image_at(3).is_none());
    }
}
