//! Error types for movie assembly.

use std::path::PathBuf;
use thiserror::Error;

use vfx_seq::SeqError;

/// Result type for shoot operations.
pub type ShootResult<T> = Result<T, ShootError>;

/// Errors raised while building sequences or movies.
#[derive(Debug, Error)]
pub enum ShootError {
    /// I/O error outside the batch copy.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Sequence model error.
    #[error(transparent)]
    Seq(#[from] SeqError),

    /// Config file not found.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// Images could not be loaded; one line per failure.
    #[error("could not load images:\n{}", .0.join("\n"))]
    Load(Vec<String>),

    /// Operation needs sequences but the session holds none.
    #[error("no image sequences loaded")]
    NoSequences,

    /// Sequences to combine use different file formats.
    #[error("cannot combine sequences with different formats: {0}")]
    MixedFormats(String),

    /// A batch copy failed.
    #[error("{} file copies failed:\n{}", .0.len(), .0.join("\n"))]
    Copy(Vec<String>),

    /// Filling a missing frame failed.
    #[error("could not fill frame {frame}: {reason}")]
    Fill {
        /// Frame being filled.
        frame: u64,
        /// Underlying failure.
        reason: String,
    },

    /// Placeholder image could not be written.
    #[error("cannot write placeholder {path}: {reason}")]
    Placeholder {
        /// Placeholder being written.
        path: PathBuf,
        /// Image writer error.
        reason: String,
    },

    /// Pre-flight validation failed.
    #[error("{}", .0.join("\n"))]
    Validation(Vec<String>),

    /// The encoder could not be started or exited with an error.
    #[error("encoder failed for {output}: {reason}")]
    Encode {
        /// Movie being written.
        output: PathBuf,
        /// Launch error or encoder stderr.
        reason: String,
    },

    /// The player could not be started.
    #[error("could not launch player: {0}")]
    Player(String),
}
