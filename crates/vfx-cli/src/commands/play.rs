//! Movie playback command.

use crate::PlayArgs;
use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::trace;
use vfx_seq::format::is_movie_ext;

/// Runs the play command.
pub fn run(args: PlayArgs, verbose: u8, config: Option<&Path>) -> Result<()> {
    trace!(movies = args.movies.len(), "play::run");

    for movie in &args.movies {
        if !movie.is_file() {
            bail!("Movie not found: {}", movie.display());
        }
        let ext = movie.extension().and_then(|e| e.to_str()).unwrap_or_default();
        if !is_movie_ext(ext) {
            bail!("Not a supported movie: {}", movie.display());
        }
    }

    let config = super::load_config(config)?;
    if verbose > 0 {
        println!("Playing {} movie(s) with {}", args.movies.len(), config.player.display());
    }

    let engine = super::build_engine(config, None, None);
    engine
        .play_movies(&args.movies)
        .context("Failed to play movies")
}
