//! Movie playback handoff.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, trace};

use crate::{ShootError, ShootResult};

/// Opens finished movies for review.
pub trait MoviePlayer: Send + Sync {
    /// Plays every movie in one player invocation.
    fn play(&self, movies: &[PathBuf]) -> ShootResult<()>;
}

/// Player launched as an external program with the movies as arguments.
#[derive(Debug, Clone)]
pub struct ExternalPlayer {
    program: PathBuf,
    args: Vec<String>,
}

impl ExternalPlayer {
    /// Uses `program`, passing `args` before the movie paths.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Executable in use.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl MoviePlayer for ExternalPlayer {
    fn play(&self, movies: &[PathBuf]) -> ShootResult<()> {
        trace!(movies = movies.len(), "ExternalPlayer::play");
        debug!(program = %self.program.display(), ?movies, "launching player");

        let status = Command::new(&self.program)
            .args(&self.args)
            .args(movies)
            .status()
            .map_err(|e| ShootError::Player(format!("{}: {}", self.program.display(), e)))?;

        if !status.success() {
            return Err(ShootError::Player(format!(
                "{} exited with {}",
                self.program.display(),
                status
            )));
        }
        Ok(())
    }
}
