//! Frame numbers embedded in filenames.
//!
//! A [`Frame`] is the last run of digits in a filename together with its
//! zero padding and the character that precedes it:
//!
//! ```rust
//! use vfx_seq::frame::Frame;
//!
//! let frame = Frame::parse("shot_010.0042.exr").unwrap();
//! assert_eq!(frame.value(), 42);
//! assert_eq!(frame.pad(), 4);
//! assert_eq!(frame.separator(), Some('.'));
//! assert_eq!(frame.to_string(), "0042");
//! ```
//!
//! Ordering compares numeric values. Equality between two frames compares
//! the zero-padded text, so `003` and `3` are different frames; comparing a
//! frame against a plain integer compares the number only. Arithmetic
//! yields plain integers; use [`Frame::from_int`] to build a new frame.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Range, Sub};
use std::sync::LazyLock;

use regex::Regex;

use crate::{SeqError, SeqResult};

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// A zero-padded frame number found in a filename.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    value: u64,
    pad: usize,
    separator: Option<char>,
    start: usize,
    end: usize,
}

impl Frame {
    /// Parses the last contiguous digit run in `filename`.
    pub fn parse(filename: &str) -> SeqResult<Self> {
        let m = DIGITS
            .find_iter(filename)
            .last()
            .ok_or_else(|| SeqError::Parse(format!("no frame number found in '{}'", filename)))?;

        let value = m
            .as_str()
            .parse::<u64>()
            .map_err(|_| SeqError::Parse(format!("frame number out of range: {}", m.as_str())))?;

        Ok(Self {
            value,
            pad: m.len(),
            separator: filename[..m.start()].chars().next_back(),
            start: m.start(),
            end: m.end(),
        })
    }

    /// Builds a frame by substituting `value`, zero-padded to `pad` digits,
    /// into the last digit run of `template` and parsing the result.
    ///
    /// ```rust
    /// use vfx_seq::frame::Frame;
    ///
    /// let frame = Frame::from_int(7, 4, "plate.0001.exr").unwrap();
    /// assert_eq!(frame.to_string(), "0007");
    /// ```
    pub fn from_int(value: u64, pad: usize, template: &str) -> SeqResult<Self> {
        let name = Self::substitute(value, pad, template)?;
        Self::parse(&name)
    }

    /// Returns `template` with its last digit run replaced by `value`
    /// zero-padded to `pad` digits.
    pub fn substitute(value: u64, pad: usize, template: &str) -> SeqResult<String> {
        let slot = Self::parse(template)?;
        Ok(format!(
            "{}{:0width$}{}",
            &template[..slot.start],
            value,
            &template[slot.end..],
            width = pad
        ))
    }

    /// Numeric value.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Number of digits as written, leading zeros included.
    pub fn pad(&self) -> usize {
        self.pad
    }

    /// Character immediately before the digits, if any.
    pub fn separator(&self) -> Option<char> {
        self.separator
    }

    /// Byte offsets of the digits in the parsed string.
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Width of the formatted text (the pad, or more if the value needs it).
    pub fn width(&self) -> usize {
        self.pad.max(digit_count(self.value))
    }
}

fn digit_count(mut value: u64) -> usize {
    let mut n = 1;
    while value >= 10 {
        value /= 10;
        n += 1;
    }
    n
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.value, width = self.pad)
    }
}

// Text equality: same value and same formatted width.
impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.width() == other.width()
    }
}

impl Eq for Frame {}

impl Hash for Frame {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.width().hash(state);
    }
}

impl PartialOrd for Frame {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Numeric first; width only separates `3` from `003`.
impl Ord for Frame {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(&other.value)
            .then_with(|| self.width().cmp(&other.width()))
    }
}

impl PartialEq<u64> for Frame {
    fn eq(&self, other: &u64) -> bool {
        self.value == *other
    }
}

impl PartialEq<i64> for Frame {
    fn eq(&self, other: &i64) -> bool {
        i64::try_from(self.value).is_ok_and(|v| v == *other)
    }
}

impl PartialOrd<u64> for Frame {
    fn partial_cmp(&self, other: &u64) -> Option<Ordering> {
        Some(self.value.cmp(other))
    }
}

impl PartialOrd<i64> for Frame {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        Some(i128::from(self.value).cmp(&i128::from(*other)))
    }
}

impl Add<i64> for Frame {
    type Output = i64;

    fn add(self, rhs: i64) -> i64 {
        self.value as i64 + rhs
    }
}

impl Sub<i64> for Frame {
    type Output = i64;

    fn sub(self, rhs: i64) -> i64 {
        self.value as i64 - rhs
    }
}

impl Add for Frame {
    type Output = i64;

    fn add(self, rhs: Frame) -> i64 {
        self.value as i64 + rhs.value as i64
    }
}

impl Sub for Frame {
    type Output = i64;

    fn sub(self, rhs: Frame) -> i64 {
        self.value as i64 - rhs.value as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_last_run() {
        let frame = Frame::parse("shot_001.0042.exr").unwrap();
        assert_eq!(frame.value(), 42);
        assert_eq!(frame.pad(), 4);
        assert_eq!(frame.separator(), Some('.'));
        assert_eq!(frame.span(), 9..13);
    }

    #[test]
    fn test_parse_underscore_and_leading() {
        assert_eq!(Frame::parse("comp_17.png").unwrap().separator(), Some('_'));
        assert_eq!(Frame::parse("17.png").unwrap().separator(), None);
    }

    #[test]
    fn test_parse_without_digits() {
        assert!(matches!(Frame::parse("plate.exr"), Err(SeqError::Parse(_))));
    }

    #[test]
    fn test_from_int_roundtrip() {
        for (value, pad) in [(1u64, 1usize), (7, 4), (42, 2), (12345, 3), (0, 5)] {
            let frame = Frame::from_int(value, pad, "a1.0001.exr").unwrap();
            let text = frame.to_string();
            assert!(text.len() >= pad);
            assert_eq!(text.parse::<u64>().unwrap(), value);
        }
        assert_eq!(Frame::from_int(12345, 3, "a.1.exr").unwrap().to_string(), "12345");
    }

    #[test]
    fn test_substitute_keeps_template() {
        assert_eq!(
            Frame::substitute(9, 4, "beauty_v002.0100.exr").unwrap(),
            "beauty_v002.0009.exr"
        );
    }

    #[test]
    fn test_equality_is_textual() {
        let a = Frame::parse("a.003.exr").unwrap();
        let b = Frame::parse("a.3.exr").unwrap();
        assert_ne!(a, b);
        assert_eq!(a, 3u64);
        assert_eq!(b, 3i64);
        assert!(b < a);
        assert_eq!(Frame::parse("x.0010.exr").unwrap(), Frame::parse("y_0010.png").unwrap());
    }

    #[test]
    fn test_ordering_is_numeric() {
        let a = Frame::parse("a.0009.exr").unwrap();
        let b = Frame::parse("a.0010.exr").unwrap();
        assert!(a < b);
        assert!(b > 9u64);
        assert!(a <= 9i64);
    }

    #[test]
    fn test_arithmetic_yields_integers() {
        let a = Frame::parse("a.0005.exr").unwrap();
        let b = Frame::parse("a.0002.exr").unwrap();
        assert_eq!(a - b, 3);
        assert_eq!(a + b, 7);
        assert_eq!(a + 1, 6);
        assert_eq!(b - 3, -1);
    }
}
