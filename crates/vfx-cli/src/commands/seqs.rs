//! Sequence listing command.

use crate::SeqsArgs;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::trace;
use vfx_seq::ImageSequence;
use vfx_seq::frame::Frame;
use vfx_seq::range::format_runs;

/// Runs the seqs command, printing every sequence found.
pub fn run(args: SeqsArgs, verbose: u8, config: Option<&Path>) -> Result<()> {
    trace!(inputs = args.input.len(), "seqs::run");

    let config = super::load_config(config)?;
    let mut engine = super::build_engine(config, args.name, args.ext);
    let inputs = super::expand_inputs(&args.input)?;
    engine
        .create_sequences(&inputs)
        .context("Failed to load image sequences")?;

    let seqs = engine.sequences();
    for seq in seqs {
        print_sequence(seq, verbose);
        if seqs.len() > 1 {
            println!();
        }
    }
    println!("{} sequence(s)", seqs.len());
    Ok(())
}

fn print_sequence(seq: &ImageSequence, verbose: u8) {
    println!("{}", seq.printf_pattern());
    if seq.is_still() {
        println!("  Still:      yes");
    } else {
        println!("  Frames:     {} ({})", seq.len(), seq.frame_range(false));
        let missing: Vec<u64> = seq.missing().iter().map(Frame::value).collect();
        if !missing.is_empty() {
            println!("  Missing:    {} {}", missing.len(), format_runs(&missing));
        }
        println!("  Padding:    {}", seq.padding());
    }
    if let Some((w, h)) = seq.dimensions() {
        println!("  Resolution: {}x{}", w, h);
    }

    if verbose > 0 {
        println!("  Name:       {}", seq.name());
        println!("  Base name:  {}", seq.base_name());
        println!("  Runs:       {}", seq.frame_range(true));
        println!("  Hash:       {}", seq.hash_pattern());
    }
}
