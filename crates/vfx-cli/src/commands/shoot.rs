//! Movie creation command.
//!
//! Loads sequences, refuses to replace existing movies without
//! `--overwrite`, encodes, and optionally plays the results.

use crate::ShootArgs;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::{info, trace, warn};
use vfx_shoot::ShootEngine;
use vfx_shoot::engine::resolve_output;

/// Runs the shoot command.
pub fn run(args: ShootArgs, verbose: u8, config: Option<&Path>) -> Result<()> {
    trace!(inputs = args.input.len(), output = %args.output, "shoot::run");

    let config = super::load_config(config)?;
    let mut engine = super::build_engine(config, args.name.clone(), args.ext.clone());
    engine.set_frame_hold(!args.no_hold);
    engine.set_combine(args.combine)?;

    let inputs = super::expand_inputs(&args.input)?;
    engine
        .create_sequences(&inputs)
        .context("Failed to load image sequences")?;

    if verbose > 0 {
        for seq in engine.sequences() {
            println!("Sequence: {}", seq);
        }
    }

    if !args.overwrite {
        let existing: Vec<PathBuf> = planned_outputs(&engine, &args.output)
            .into_iter()
            .filter(|p| p.exists())
            .collect();
        if !existing.is_empty() {
            for path in &existing {
                eprintln!("Exists: {}", path.display());
            }
            bail!("{} movie(s) already exist, use --overwrite to replace", existing.len());
        }
    }

    let result = engine.create_movie(args.step, &args.range, &args.output, args.hq);

    if args.keep_temp {
        info!(scratch = %engine.scratch().root().display(), "keeping scratch folder");
    } else if let Err(e) = engine.cleanup() {
        warn!(error = %e, "could not remove scratch folder");
    }

    let report = result.context("Movie creation failed")?;
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }
    for movie in &report.movies {
        println!("Created: {}", movie.display());
    }
    println!(
        "Movies: {} created, {} warnings",
        report.movies.len(),
        report.warnings.len()
    );

    if report.movies.is_empty() {
        bail!("No movies were created");
    }

    if args.play {
        engine
            .play_movies(&report.movies)
            .context("Failed to play movies")?;
    }

    Ok(())
}

/// Movie paths `create_movie` would write for the loaded sequences.
fn planned_outputs(engine: &ShootEngine, template: &str) -> Vec<PathBuf> {
    let seqs = engine.sequences();
    let multiple = seqs.len() > 1 && !engine.is_combined();
    seqs.iter()
        .enumerate()
        .map(|(i, seq)| resolve_output(template, i, seq, multiple))
        .collect()
}
