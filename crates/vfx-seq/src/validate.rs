//! Pre-flight checks for movie creation.
//!
//! Pure predicates over sequences and user input. Failures come back as
//! human-readable messages (or `false`); nothing here touches the disk.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::format::{is_image_ext, is_movie_ext, IMAGE_FORMATS, MOVIE_FORMATS};
use crate::range::FrameRange;
use crate::sequence::ImageSequence;

/// Range input meaning "several sequences, no single range applies".
pub const RANGE_NOT_APPLICABLE: &str = "N/A";

/// Longest frame range a movie may span.
pub const MAX_RANGE_FRAMES: usize = 1_000_000;

static RANGE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9 ,\-]+$").unwrap());
static BRACKET_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// Checks that `steps` fits inside the sequence.
///
/// Fails when `start + steps > end` on a multi-frame sequence; single
/// stills are exempt.
pub fn validate_steps(seq: &ImageSequence, steps: u64) -> Option<String> {
    if steps == 0 {
        return Some("Step size must be at least 1.".into());
    }
    let range = seq.range()?;
    if range.len() > 1 && range.start().saturating_add(steps) > range.end() {
        return Some(format!(
            "Step size {} is too large for frame range {} of sequence {}.",
            steps,
            range,
            seq.name()
        ));
    }
    None
}

/// Checks that every member has a supported still format.
///
/// Reports the first offending image only.
pub fn validate_image_format(seq: &ImageSequence) -> Option<String> {
    seq.images()
        .iter()
        .find(|img| !is_image_ext(img.ext()))
        .map(|img| {
            format!(
                "{} is not a supported image format. Supported formats: {}.",
                img.file_name(),
                IMAGE_FORMATS.join(", ")
            )
        })
}

/// True if `spec` is `N/A` or only digits, spaces, commas and hyphens.
pub fn validate_frame_range(spec: &str) -> bool {
    spec == RANGE_NOT_APPLICABLE || RANGE_CHARS.is_match(spec)
}

/// Checks that the numbers in a range input are usable frames.
///
/// Each number must fit a frame and the span from the first to the last
/// must stay within [`MAX_RANGE_FRAMES`]. `N/A` and text without numbers
/// pass.
pub fn validate_range_bounds(spec: &str) -> Option<String> {
    if spec == RANGE_NOT_APPLICABLE {
        return None;
    }
    match FrameRange::parse_loose(spec) {
        Err(e) => Some(format!("Invalid frame range '{}': {}.", spec, e)),
        Ok(Some(range)) if range.len() > MAX_RANGE_FRAMES => Some(format!(
            "Frame range '{}' spans more than {} frames.",
            spec, MAX_RANGE_FRAMES
        )),
        Ok(_) => None,
    }
}

/// True if `path` is a usable movie output for `sequences`.
///
/// The path must be non-empty with a supported container. Several
/// sequences written separately need a `%d` or `[...]` token so each gets
/// its own file.
pub fn validate_movie_name(sequences: &[ImageSequence], combined: bool, path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    let ext_ok = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(is_movie_ext);
    if !ext_ok {
        return false;
    }
    if sequences.len() > 1 && !combined {
        return path.contains("%d") || BRACKET_TOKEN.is_match(path);
    }
    true
}

/// Message explaining a rejected movie name.
pub fn movie_name_hint(multiple: bool) -> String {
    let mut hint = format!(
        "Movie output must be a {} file path.",
        MOVIE_FORMATS.join("/")
    );
    if multiple {
        hint.push_str(" For several sequences add %d or [seq_shot] to the name.");
    }
    hint
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Image;
    use crate::probe::FixedProbe;

    fn seq(dir: &Path, names: &[&str]) -> ImageSequence {
        let images = names.iter().map(|n| {
            let path = dir.join(n);
            std::fs::write(&path, b"").unwrap();
            Image::open_with(&path, &FixedProbe::new(4, 4)).unwrap()
        });
        ImageSequence::from_images(images, true).unwrap()
    }

    fn ten_frames(dir: &Path) -> ImageSequence {
        let names: Vec<String> = (1..=10).map(|i| format!("a.{:04}.exr", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        seq(dir, &refs)
    }

    #[test]
    fn test_steps_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let s = ten_frames(dir.path());
        assert!(validate_steps(&s, 10).is_some());
        assert!(validate_steps(&s, 9).is_none());
        assert!(validate_steps(&s, 1).is_none());
        assert!(validate_steps(&s, 0).is_some());
    }

    #[test]
    fn test_steps_single_frame_exempt() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_steps(&seq(dir.path(), &["a.0001.exr"]), 5).is_none());
        assert!(validate_steps(&seq(dir.path(), &["slate.png"]), 5).is_none());
    }

    #[test]
    fn test_image_format() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_image_format(&seq(dir.path(), &["a.0001.exr", "a.0002.exr"])).is_none());
        let msg = validate_image_format(&seq(dir.path(), &["b.0001.dpx", "b.0002.dpx"])).unwrap();
        assert!(msg.starts_with("b.0001.dpx"));
    }

    #[test]
    fn test_frame_range_syntax() {
        assert!(validate_frame_range("N/A"));
        assert!(validate_frame_range("1-10"));
        assert!(validate_frame_range("1-5, 8,10-12"));
        assert!(!validate_frame_range("1..10"));
        assert!(!validate_frame_range("[1-10]"));
        assert!(!validate_frame_range(""));
    }

    #[test]
    fn test_range_bounds() {
        assert!(validate_range_bounds("N/A").is_none());
        assert!(validate_range_bounds("1001-1100").is_none());
        assert!(validate_range_bounds("1-5, 8").is_none());

        assert!(validate_frame_range("1-99999999999999999999"));
        assert!(validate_range_bounds("1-99999999999999999999").is_some());
        assert!(validate_frame_range("0-18446744073709551615"));
        let msg = validate_range_bounds("0-18446744073709551615").unwrap();
        assert!(msg.contains("spans more than"));
    }

    #[test]
    fn test_steps_do_not_overflow() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_steps(&ten_frames(dir.path()), u64::MAX).is_some());
    }

    #[test]
    fn test_movie_name() {
        let dir = tempfile::tempdir().unwrap();
        let one = vec![seq(dir.path(), &["a.0001.exr", "a.0002.exr"])];
        let two = vec![
            seq(dir.path(), &["a.0001.exr", "a.0002.exr"]),
            seq(dir.path(), &["b.0001.exr", "b.0002.exr"]),
        ];
        assert!(!validate_movie_name(&one, false, ""));
        assert!(!validate_movie_name(&one, false, "out.mov"));
        assert!(validate_movie_name(&one, false, "out.mp4"));
        assert!(!validate_movie_name(&two, false, "out.mp4"));
        assert!(validate_movie_name(&two, true, "out.mp4"));
        assert!(validate_movie_name(&two, false, "out.%d.mp4"));
        assert!(validate_movie_name(&two, false, "/movies/[seq_shot].mp4"));
    }
}
