//! Frame ranges and their text forms.
//!
//! Contiguous runs print as `start-end`, single frames as a number, and a
//! whole set as `[1-3, 5, 7-9]`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::{SeqError, SeqResult};

static NUMBERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// An inclusive range of frame numbers.
///
/// # Example
///
/// ```rust
/// use vfx_seq::range::FrameRange;
///
/// let range = FrameRange::new(1001, 1100);
/// assert_eq!(range.start(), 1001);
/// assert_eq!(range.end(), 1100);
/// assert_eq!(range.len(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRange {
    start: u64,
    end: u64,
}

impl FrameRange {
    /// Creates a new frame range; bounds are swapped if reversed.
    pub fn new(start: u64, end: u64) -> Self {
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        Self { start, end }
    }

    /// Creates a range for a single frame.
    pub fn single(frame: u64) -> Self {
        Self::new(frame, frame)
    }

    /// Returns the start frame.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Returns the end frame.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Returns the number of frames in the range, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        (self.end - self.start)
            .checked_add(1)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX)
    }

    /// A range always holds at least one frame.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if the range contains the given frame.
    pub fn contains(&self, frame: u64) -> bool {
        frame >= self.start && frame <= self.end
    }

    /// Returns true if `other` lies entirely inside this range.
    pub fn covers(&self, other: &FrameRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns an iterator over all frame numbers.
    pub fn iter(&self) -> impl Iterator<Item = u64> {
        self.start..=self.end
    }

    /// Extends the range to include the given frame.
    pub fn extend(&mut self, frame: u64) {
        if frame < self.start {
            self.start = frame;
        }
        if frame > self.end {
            self.end = frame;
        }
    }

    /// Loosely reads a user range: the first and last integers found.
    ///
    /// Anything between them is ignored, so `"1-5, 10, 15-20"` reads as
    /// `1-20`. Returns `None` when the text holds no number, and an error
    /// when a number does not fit a frame.
    ///
    /// ```rust
    /// use vfx_seq::range::FrameRange;
    ///
    /// assert_eq!(FrameRange::parse_loose("10-20")?, Some(FrameRange::new(10, 20)));
    /// assert_eq!(FrameRange::parse_loose(" 7 ")?, Some(FrameRange::single(7)));
    /// assert_eq!(FrameRange::parse_loose("N/A")?, None);
    /// assert!(FrameRange::parse_loose("1-99999999999999999999").is_err());
    /// # Ok::<(), vfx_seq::SeqError>(())
    /// ```
    pub fn parse_loose(spec: &str) -> SeqResult<Option<FrameRange>> {
        let numbers = NUMBERS
            .find_iter(spec)
            .map(|m| {
                m.as_str()
                    .parse::<u64>()
                    .map_err(|e| SeqError::Parse(format!("frame number '{}': {}", m.as_str(), e)))
            })
            .collect::<SeqResult<Vec<u64>>>()?;
        Ok(match (numbers.first(), numbers.last()) {
            (Some(&first), Some(&last)) => Some(FrameRange::new(first, last)),
            _ => None,
        })
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl IntoIterator for FrameRange {
    type Item = u64;
    type IntoIter = std::ops::RangeInclusive<u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.start..=self.end
    }
}

/// Splits ascending frame numbers into contiguous runs.
///
/// A new run starts whenever a value is not exactly the previous plus one.
/// Repeated values stay in the current run.
pub fn runs(frames: &[u64]) -> Vec<FrameRange> {
    let mut result = Vec::new();
    let mut current: Option<FrameRange> = None;

    for &frame in frames {
        match current {
            None => current = Some(FrameRange::single(frame)),
            Some(ref mut r) if frame == r.end() + 1 || frame == r.end() => r.extend(frame),
            Some(r) => {
                result.push(r);
                current = Some(FrameRange::single(frame));
            }
        }
    }

    if let Some(r) = current {
        result.push(r);
    }

    result
}

/// Formats ascending frame numbers as `[1-3, 5]`, or `""` when empty.
pub fn format_runs(frames: &[u64]) -> String {
    if frames.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = runs(frames).iter().map(|r| r.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_range() {
        let range = FrameRange::new(1001, 1100);
        assert_eq!(range.len(), 100);
        assert!(range.contains(1050));
        assert!(!range.contains(1000));
        assert!(range.covers(&FrameRange::new(1001, 1002)));
        assert!(!range.covers(&FrameRange::new(1000, 1002)));
    }

    #[test]
    fn test_frame_range_reverse() {
        let range = FrameRange::new(100, 1);
        assert_eq!(range.start(), 1);
        assert_eq!(range.end(), 100);
    }

    #[test]
    fn test_runs() {
        let r = runs(&[1, 2, 3, 5, 7, 8]);
        assert_eq!(
            r,
            vec![FrameRange::new(1, 3), FrameRange::single(5), FrameRange::new(7, 8)]
        );
    }

    #[test]
    fn test_format_runs() {
        assert_eq!(format_runs(&[1, 2, 3]), "[1-3]");
        assert_eq!(format_runs(&[1, 3, 5]), "[1, 3, 5]");
        assert_eq!(format_runs(&[1, 2, 3, 10, 15, 16]), "[1-3, 10, 15-16]");
        assert_eq!(format_runs(&[]), "");
    }

    #[test]
    fn test_parse_loose() {
        assert_eq!(FrameRange::parse_loose("1-5,8,10-12").unwrap(), Some(FrameRange::new(1, 12)));
        assert_eq!(FrameRange::parse_loose("20-10").unwrap(), Some(FrameRange::new(10, 20)));
        assert_eq!(FrameRange::parse_loose("").unwrap(), None);
    }

    #[test]
    fn test_parse_loose_rejects_oversized_numbers() {
        assert!(matches!(
            FrameRange::parse_loose("1-99999999999999999999"),
            Err(SeqError::Parse(_))
        ));
        assert!(FrameRange::parse_loose("99999999999999999999").is_err());
    }

    #[test]
    fn test_len_saturates() {
        let full = FrameRange::parse_loose("0-18446744073709551615").unwrap().unwrap();
        assert_eq!(full.start(), 0);
        assert_eq!(full.end(), u64::MAX);
        assert_eq!(full.len(), usize::MAX);
        assert_eq!(FrameRange::single(u64::MAX).len(), 1);
    }
}
