//! Error types for sequence operations.
//!
//! Covers frame parsing, image construction and sequence membership.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Sequence model error.
#[derive(Debug, Error)]
pub enum SeqError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No frame number could be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Image could not be constructed (missing on disk or undecodable).
    #[error("invalid image {path}: {reason}")]
    Image {
        /// Path that failed.
        path: PathBuf,
        /// Why it failed.
        reason: String,
    },

    /// Image does not belong to the sequence it was added to.
    #[error("image is not a member of the sequence: {0}")]
    NotMember(PathBuf),

    /// Ordering was requested for an image without a frame number.
    #[error("cannot order still image: {0}")]
    Unordered(PathBuf),

    /// Operation needs at least one image.
    #[error("sequence is empty")]
    Empty,
}

/// Result type for sequence operations.
pub type SeqResult<T> = Result<T, SeqError>;
