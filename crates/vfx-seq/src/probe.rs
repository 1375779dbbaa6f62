//! Image dimension probing.
//!
//! [`Image`](crate::Image) construction asks an [`ImageProbe`] for the pixel
//! size of the file, which doubles as the "is this decodable" check. The
//! default [`DecoderProbe`] checks the magic bytes against the extension and
//! then reads the header only.

use std::path::Path;

use crate::format::Format;

/// Reads pixel dimensions from an image file.
pub trait ImageProbe: Send + Sync {
    /// Returns `(width, height)` or a human-readable reason for failure.
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), String>;
}

/// Header-only probe backed by the `image` crate decoders.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderProbe;

impl ImageProbe for DecoderProbe {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), String> {
        Format::verify(path)?;
        image::image_dimensions(path).map_err(|e| e.to_string())
    }
}

/// Probe that reports a fixed size for every existing file.
///
/// Useful when the caller already knows the plate size, or the pixels are
/// produced by a decoder the `image` crate does not cover.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe {
    /// Reported width.
    pub width: u32,
    /// Reported height.
    pub height: u32,
}

impl FixedProbe {
    /// Creates a probe reporting `width` x `height`.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ImageProbe for FixedProbe {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), String> {
        if path.is_file() {
            Ok((self.width, self.height))
        } else {
            Err("not a file".into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_probe_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("probe.png");
        image::RgbImage::new(6, 4).save(&path).unwrap();
        assert_eq!(DecoderProbe.dimensions(&path).unwrap(), (6, 4));
    }

    #[test]
    fn test_decoder_probe_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(DecoderProbe.dimensions(&path).is_err());
    }

    #[test]
    fn test_decoder_probe_renamed_file() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("plate.png");
        image::RgbImage::new(6, 4).save(&png).unwrap();
        let renamed = dir.path().join("plate.exr");
        std::fs::rename(&png, &renamed).unwrap();

        let err = DecoderProbe.dimensions(&renamed).unwrap_err();
        assert!(err.contains("png, not exr"), "{err}");
    }

    #[test]
    fn test_fixed_probe() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.0001.exr");
        std::fs::write(&path, b"").unwrap();
        let probe = FixedProbe::new(1920, 1080);
        assert_eq!(probe.dimensions(&path).unwrap(), (1920, 1080));
        assert!(probe.dimensions(&dir.path().join("missing.exr")).is_err());
    }
}
