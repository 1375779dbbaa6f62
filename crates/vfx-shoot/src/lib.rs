//! # vfx-shoot
//!
//! Dailies movie assembly from image sequences.
//!
//! Built on [`vfx_seq`], this crate runs a "shoot" session: load frames,
//! optionally merge every sequence into one, fill missing frames, apply a
//! frame step and hand a numbered frame pattern to ffmpeg.
//!
//! - [`ShootEngine`] - the session, from file selection to playback
//! - [`ShootConfig`] - YAML settings with environment overrides
//! - [`FramePlan`] - materialization of one sequence over a frame range
//! - [`MovieEncoder`] / [`MoviePlayer`] - seams to the external tools
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vfx_shoot::{ShootConfig, ShootEngine};
//!
//! let mut engine = ShootEngine::new(ShootConfig::load(None)?);
//! engine.create_sequences(&["renders/sh010", "renders/sh020"])?;
//! let report = engine.create_movie(1, "N/A", "dailies/[seq_shot].mp4", false)?;
//! engine.play_movies(&report.movies)?;
//! engine.cleanup()?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod config;
pub mod copy;
pub mod encode;
pub mod engine;
pub mod fill;
pub mod placeholder;
pub mod player;
pub mod scratch;

pub use config::{ShootConfig, CONFIG_ENV};
pub use copy::{copy_batch, CopyJob, CopyReport};
pub use encode::{EncodeJob, FfmpegEncoder, MovieEncoder};
pub use engine::{ImageFilter, MovieReport, SessionState, ShootEngine};
pub use error::{ShootError, ShootResult};
pub use fill::{FillReport, FramePlan, GapPolicy};
pub use player::{ExternalPlayer, MoviePlayer};
pub use scratch::ScratchDir;
