//! Missing-frame placeholder images.
//!
//! A studio placeholder `missing_frame.<ext>` is used when the configured
//! folder has one for the sequence's format. Otherwise a flat grey frame of
//! the sequence's size is written once into the scratch area.

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};
use tracing::debug;

use crate::{ShootError, ShootResult};

const GREY: u8 = 128;

/// Placeholder filename for extension `ext`.
pub fn placeholder_name(ext: &str) -> String {
    format!("missing_frame.{}", ext)
}

/// Returns a placeholder image for `ext` at `width` x `height`.
///
/// Looks in `studio_dir` first, then reuses or renders one in `scratch_dir`.
pub fn resolve_placeholder(
    studio_dir: Option<&Path>,
    scratch_dir: &Path,
    ext: &str,
    (width, height): (u32, u32),
) -> ShootResult<PathBuf> {
    let name = placeholder_name(ext);

    if let Some(studio) = studio_dir.map(|d| d.join(&name)).filter(|p| p.is_file()) {
        return Ok(studio);
    }

    let generated = scratch_dir.join(format!("{}x{}_{}", width, height, name));
    if generated.is_file() {
        return Ok(generated);
    }

    std::fs::create_dir_all(scratch_dir)?;
    render_placeholder(&generated, ext, width.max(1), height.max(1))?;
    debug!(path = %generated.display(), "placeholder rendered");
    Ok(generated)
}

fn render_placeholder(path: &Path, ext: &str, width: u32, height: u32) -> ShootResult<()> {
    let grey = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([GREY; 3])));
    // The EXR encoder only takes float pixels.
    let pixels = if ext.eq_ignore_ascii_case("exr") {
        DynamicImage::ImageRgb32F(grey.to_rgb32f())
    } else {
        grey
    };
    pixels.save(path).map_err(|e| ShootError::Placeholder {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
