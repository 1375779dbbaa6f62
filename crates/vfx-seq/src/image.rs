//! A single image file on disk.
//!
//! An [`Image`] decomposes its filename into a prefix, an optional
//! [`Frame`], a suffix and an extension:
//!
//! ```text
//! /shots/sh010/comp/sh010_comp.0042.exr
//!                   ^^^^^^^^^^^ ^^^^ ^^^^
//!                   prefix      frame suffix
//! ```
//!
//! Files without a digit run are stills ([`FrameTag::Still`]); they can be
//! held in a sequence of their own but cannot be ordered by frame.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::frame::Frame;
use crate::probe::{DecoderProbe, ImageProbe};
use crate::{SeqError, SeqResult};

static DIGIT_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Frame number of an image, or its absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTag {
    /// No digits in the name; a single still.
    Still,
    /// Numbered sequence member.
    Sequenced(Frame),
}

/// One digit run inside a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DigitRun {
    offset: usize,
    text: String,
}

/// An image file with its name decomposed for sequence work.
///
/// Two images are equal when they are the same file: `==` and hashing use
/// the absolute path, not the frame. Compare frames with
/// [`frame`](Self::frame) or order them with [`try_cmp`](Self::try_cmp).
#[derive(Debug, Clone)]
pub struct Image {
    path: PathBuf,
    dir: PathBuf,
    file_name: String,
    prefix: String,
    suffix: String,
    base_name: String,
    ext: String,
    tag: FrameTag,
    width: u32,
    height: u32,
    runs: Vec<DigitRun>,
    literals: Vec<String>,
}

impl Image {
    /// Opens an image, probing its size with the default decoder.
    pub fn open<P: AsRef<Path>>(path: P) -> SeqResult<Self> {
        Self::open_with(path, &DecoderProbe)
    }

    /// Opens an image, probing its size with `probe`.
    ///
    /// Fails if the file does not exist or the probe cannot decode it.
    pub fn open_with<P: AsRef<Path>>(path: P, probe: &dyn ImageProbe) -> SeqResult<Self> {
        let path = path.as_ref();
        let fail = |reason: String| SeqError::Image {
            path: path.to_path_buf(),
            reason,
        };

        if !path.is_file() {
            return Err(fail("file not found".into()));
        }
        let path = std::path::absolute(path).map_err(|e| fail(e.to_string()))?;
        let (width, height) = probe.dimensions(&path).map_err(fail)?;

        let mut image = Self::from_name(&path)?;
        image.width = width;
        image.height = height;
        Ok(image)
    }

    /// Decomposes a path without touching the filesystem.
    fn from_name(path: &Path) -> SeqResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| SeqError::Image {
                path: path.to_path_buf(),
                reason: "invalid file name".into(),
            })?
            .to_string();

        let (stem, ext) = match file_name.rfind('.') {
            Some(dot) if dot > 0 => (&file_name[..dot], &file_name[dot + 1..]),
            _ => (file_name.as_str(), ""),
        };
        let dotted_ext = if ext.is_empty() {
            String::new()
        } else {
            format!(".{}", ext)
        };

        let (tag, prefix, suffix) = match Frame::parse(stem) {
            Ok(frame) => {
                let span = frame.span();
                (
                    FrameTag::Sequenced(frame),
                    stem[..span.start].to_string(),
                    format!("{}{}", &stem[span.end..], dotted_ext),
                )
            }
            Err(_) => (FrameTag::Still, stem.to_string(), dotted_ext),
        };

        let base_name = match tag {
            FrameTag::Sequenced(_) => prefix
                .strip_suffix(|c: char| !c.is_alphanumeric())
                .unwrap_or(&prefix)
                .to_string(),
            FrameTag::Still => stem.to_string(),
        };

        let runs = DIGIT_RUNS
            .find_iter(&file_name)
            .map(|m| DigitRun {
                offset: m.start(),
                text: m.as_str().to_string(),
            })
            .collect();
        let literals = DIGIT_RUNS.split(&file_name).map(str::to_string).collect();

        Ok(Self {
            dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            path: path.to_path_buf(),
            prefix,
            suffix,
            base_name,
            ext: ext.to_string(),
            file_name,
            tag,
            width: 0,
            height: 0,
            runs,
            literals,
        })
    }

    /// Absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Containing directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Filename with extension.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Name without frame, separator and extension (`sh010_comp`).
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Everything before the frame digits, separator included (`sh010_comp.`).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Everything after the frame digits, extension included (`.exr`).
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Extension without the dot, as written.
    pub fn ext(&self) -> &str {
        &self.ext
    }

    /// Frame tag.
    pub fn tag(&self) -> FrameTag {
        self.tag
    }

    /// Frame number, if the image is numbered.
    pub fn frame(&self) -> Option<Frame> {
        match self.tag {
            FrameTag::Sequenced(frame) => Some(frame),
            FrameTag::Still => None,
        }
    }

    /// True for images without a frame number.
    pub fn is_still(&self) -> bool {
        self.tag == FrameTag::Still
    }

    /// Pixel width reported by the probe.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Pixel height reported by the probe.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Live filesystem check, not cached.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Filename this image would have at frame `value` padded to `pad` digits.
    pub fn frame_file_name(&self, value: u64, pad: usize) -> String {
        format!("{}{:0width$}{}", self.prefix, value, self.suffix, width = pad)
    }

    /// Orders two images by frame.
    ///
    /// Stills carry no frame and cannot be ordered.
    pub fn try_cmp(&self, other: &Image) -> SeqResult<Ordering> {
        match (self.frame(), other.frame()) {
            (Some(a), Some(b)) => Ok(a.cmp(&b)),
            (None, _) => Err(SeqError::Unordered(self.path.clone())),
            (_, None) => Err(SeqError::Unordered(other.path.clone())),
        }
    }

    /// True if `self` and `other` are members of one image sequence.
    ///
    /// The names must differ in exactly one digit run, all other text must
    /// match, and both files must live in the same directory. With
    /// `strict_pad` the differing runs must also have the same length.
    pub fn is_sequence_member(&self, other: &Image, strict_pad: bool) -> bool {
        if self.dir != other.dir
            || self.literals != other.literals
            || self.runs.len() != other.runs.len()
        {
            return false;
        }

        let mut differing = self
            .runs
            .iter()
            .zip(&other.runs)
            .filter(|(a, b)| a.text != b.text);

        match (differing.next(), differing.next()) {
            (Some((a, b)), None) => {
                a.offset == b.offset && (!strict_pad || a.text.len() == b.text.len())
            }
            _ => false,
        }
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Image {}

impl Hash for Image {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl AsRef<Path> for Image {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::FixedProbe;

    fn touch(dir: &Path, name: &str) -> Image {
        let path = dir.join(name);
        std::fs::write(&path, b"").unwrap();
        Image::open_with(&path, &FixedProbe::new(64, 32)).unwrap()
    }

    #[test]
    fn test_decompose_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let img = touch(dir.path(), "sh010_comp.0042.exr");
        assert_eq!(img.base_name(), "sh010_comp");
        assert_eq!(img.prefix(), "sh010_comp.");
        assert_eq!(img.suffix(), ".exr");
        assert_eq!(img.ext(), "exr");
        assert_eq!(img.frame().unwrap().value(), 42);
        assert_eq!((img.width(), img.height()), (64, 32));
        assert!(img.path().is_absolute());
        assert_eq!(img.frame_file_name(7, 4), "sh010_comp.0007.exr");
    }

    #[test]
    fn test_decompose_still() {
        let dir = tempfile::tempdir().unwrap();
        let img = touch(dir.path(), "slate.png");
        assert!(img.is_still());
        assert_eq!(img.base_name(), "slate");
        assert_eq!(img.ext(), "png");
        assert!(matches!(img.try_cmp(&img), Err(SeqError::Unordered(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Image::open_with(dir.path().join("nope.0001.exr"), &FixedProbe::new(1, 1));
        assert!(matches!(err, Err(SeqError::Image { .. })));
    }

    #[test]
    fn test_open_undecodable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.0001.png");
        std::fs::write(&path, b"garbage").unwrap();
        assert!(matches!(Image::open(&path), Err(SeqError::Image { .. })));
    }

    #[test]
    fn test_exists_is_live() {
        let dir = tempfile::tempdir().unwrap();
        let img = touch(dir.path(), "a.0001.exr");
        assert!(img.exists());
        std::fs::remove_file(img.path()).unwrap();
        assert!(!img.exists());
    }

    #[test]
    fn test_membership() {
        let dir = tempfile::tempdir().unwrap();
        let a1 = touch(dir.path(), "a1.0001.exr");
        let a2 = touch(dir.path(), "a1.0002.exr");
        let b1 = touch(dir.path(), "b1.0001.exr");
        let png = touch(dir.path(), "a1.0003.png");
        let v2 = touch(dir.path(), "a2.0002.exr");

        assert!(a1.is_sequence_member(&a2, true));
        assert!(a2.is_sequence_member(&a1, true));
        assert!(!a1.is_sequence_member(&b1, true));
        assert!(!a1.is_sequence_member(&png, true));
        // two runs differ
        assert!(!a1.is_sequence_member(&v2, true));
        // same name, nothing differs
        assert!(!a1.is_sequence_member(&a1, true));
    }

    #[test]
    fn test_membership_strict_pad() {
        let dir = tempfile::tempdir().unwrap();
        let padded = touch(dir.path(), "a.01.exr");
        let plain = touch(dir.path(), "a.1.exr");
        assert!(!padded.is_sequence_member(&plain, true));
        assert!(padded.is_sequence_member(&plain, false));
    }

    #[test]
    fn test_membership_needs_same_dir() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let x = touch(a.path(), "a.0001.exr");
        let y = touch(b.path(), "a.0002.exr");
        assert!(!x.is_sequence_member(&y, true));
    }

    #[test]
    fn test_equality_is_by_path() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let x = touch(a.path(), "a.0001.exr");
        let y = touch(b.path(), "a.0001.exr");
        assert_eq!(x.frame(), y.frame());
        assert_ne!(x, y);

        let again = Image::open_with(x.path(), &FixedProbe::new(1, 1)).unwrap();
        assert_eq!(x, again);
        assert_eq!(x.try_cmp(&y).unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_try_cmp() {
        let dir = tempfile::tempdir().unwrap();
        let a = touch(dir.path(), "a.0002.exr");
        let b = touch(dir.path(), "a.0010.exr");
        assert_eq!(a.try_cmp(&b).unwrap(), Ordering::Less);
        assert_eq!(b.try_cmp(&a).unwrap(), Ordering::Greater);
    }
}
