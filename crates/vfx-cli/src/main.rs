//! vfx - Dailies movie CLI
//!
//! Finds image sequences in render folders, fills missing frames and
//! encodes review movies through ffmpeg.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "vfx")]
#[command(author, version, about = "Dailies movies from VFX image sequences")]
#[command(long_about = "
Builds review movies from numbered image sequences.

Examples:
  vfx seqs renders/sh010                       # List sequences in a folder
  vfx seqs renders/* --ext exr                 # Only EXR sequences
  vfx shoot renders/sh010 -o sh010.mp4         # One movie from one folder
  vfx shoot renders/sh010 -o sh010.mp4 -r 1001-1100 --step 2
  vfx shoot renders/sh0* -o 'dailies/[seq_shot].mp4' --hq
  vfx shoot renders/sh0* -o reel.mp4 --combine --play
  vfx play dailies/sh010.mp4 dailies/sh020.mp4
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file (default: $VFX_SHOOT_CONFIG or built-in settings)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode movies from image sequences
    #[command(visible_alias = "s")]
    Shoot(ShootArgs),

    /// List image sequences found in files and folders
    #[command(visible_alias = "ls")]
    Seqs(SeqsArgs),

    /// Open movies in the configured player
    #[command(visible_alias = "p")]
    Play(PlayArgs),
}

/// Arguments for the `shoot` command.
#[derive(Args)]
struct ShootArgs {
    /// Input images, folders or glob patterns
    #[arg(required = true)]
    input: Vec<String>,

    /// Output movie; use %d or [seq_shot] when writing several sequences
    #[arg(short, long)]
    output: String,

    /// Keep every Nth frame, holding it over the following N-1 frames
    #[arg(short, long, default_value = "1")]
    step: u64,

    /// Frame range, e.g. 1001-1100 (default: each sequence's own range)
    #[arg(short, long, default_value = "")]
    range: String,

    /// Lossless fast preset instead of the default quality preset
    #[arg(long)]
    hq: bool,

    /// Merge all sequences into one movie
    #[arg(long)]
    combine: bool,

    /// Fill missing frames with a placeholder instead of holding the previous frame
    #[arg(long)]
    no_hold: bool,

    /// Play the movies when done
    #[arg(long)]
    play: bool,

    /// Replace existing movies
    #[arg(long)]
    overwrite: bool,

    /// Only use images with this base name from input folders
    #[arg(long)]
    name: Option<String>,

    /// Only use images with this extension from input folders
    #[arg(long)]
    ext: Option<String>,

    /// Keep the scratch folder after encoding
    #[arg(long)]
    keep_temp: bool,
}

/// Arguments for the `seqs` command.
#[derive(Args)]
struct SeqsArgs {
    /// Input images, folders or glob patterns
    #[arg(required = true)]
    input: Vec<String>,

    /// Only use images with this base name from input folders
    #[arg(long)]
    name: Option<String>,

    /// Only use images with this extension from input folders
    #[arg(long)]
    ext: Option<String>,
}

/// Arguments for the `play` command.
#[derive(Args)]
struct PlayArgs {
    /// Movies to play
    #[arg(required = true)]
    movies: Vec<PathBuf>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Shoot(args) => commands::shoot::run(args, cli.verbose, config),
        Commands::Seqs(args) => commands::seqs::run(args, cli.verbose, config),
        Commands::Play(args) => commands::play::run(args, cli.verbose, config),
    }
}
