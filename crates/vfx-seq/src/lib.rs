//! # vfx-seq
//!
//! Image sequence model for VFX pipelines.
//!
//! Renders and plates arrive as numbered stills (`sh010_comp.0001.exr`,
//! `plate_17.png`, ...). This crate turns loose files into checked
//! sequences:
//!
//! - [`Frame`] - the zero-padded frame token inside a filename
//! - [`Image`] - one file, its name decomposed and its size probed
//! - [`ImageSequence`] - a frame-consistent set of images with missing-frame
//!   detection and compact range text
//! - [`validate`] - pre-flight checks used before assembling a movie
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vfx_seq::{Image, ImageSequence};
//!
//! let images = std::fs::read_dir("renders/sh010")?
//!     .map(|e| Image::open(e?.path()))
//!     .collect::<Result<Vec<_>, _>>()?;
//!
//! for seq in ImageSequence::group(images, true) {
//!     println!("{} missing {:?}", seq, seq.missing());
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod format;
pub mod frame;
pub mod image;
pub mod probe;
pub mod range;
pub mod sequence;
pub mod validate;

pub use error::{SeqError, SeqResult};
pub use format::{Format, IMAGE_FORMATS, MOVIE_FORMATS};
pub use frame::Frame;
pub use image::{FrameTag, Image};
pub use probe::{DecoderProbe, FixedProbe, ImageProbe};
pub use range::FrameRange;
pub use sequence::ImageSequence;
