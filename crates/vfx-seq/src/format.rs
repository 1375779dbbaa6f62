//! Format detection and the supported-format allow-lists.
//!
//! Detects still formats from file extensions and magic bytes. Only the
//! formats a movie can be assembled from are recognised.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::SeqResult;

/// Still-image extensions a sequence may be built from.
pub const IMAGE_FORMATS: &[&str] = &["exr", "jpg", "jpeg", "tif", "png"];

/// Movie containers the encoder may write.
pub const MOVIE_FORMATS: &[&str] = &["mp4"];

/// Supported still formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// OpenEXR format.
    Exr,
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// TIFF format.
    Tiff,
    /// Unknown/unsupported format.
    Unknown,
}

impl Format {
    /// Checks that the header of `path` agrees with its extension.
    ///
    /// Returns the format on success; a renamed or truncated file yields a
    /// reason naming what was found instead.
    pub fn verify<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let expected = Self::from_extension(path);
        let Some(ext) = expected.extension() else {
            return Err("unsupported image extension".into());
        };
        let found = Self::from_magic_bytes(path).map_err(|e| e.to_string())?;
        match found {
            f if f == expected => Ok(f),
            Format::Unknown => Err(format!("file content is not {}", ext)),
            f => Err(format!(
                "file content is {}, not {}",
                f.extension().unwrap_or("unknown"),
                ext
            )),
        }
    }

    /// Detects format from file extension only.
    pub fn from_extension<P: AsRef<Path>>(path: P) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("exr") => Format::Exr,
            Some("png") => Format::Png,
            Some("jpg") | Some("jpeg") => Format::Jpeg,
            Some("tif") => Format::Tiff,
            _ => Format::Unknown,
        }
    }

    /// Detects format from file magic bytes.
    pub fn from_magic_bytes<P: AsRef<Path>>(path: P) -> SeqResult<Self> {
        let mut file = File::open(path)?;
        let mut header = [0u8; 8];

        let bytes_read = file.read(&mut header)?;
        Ok(Self::from_bytes(&header[..bytes_read]))
    }

    /// Detects format from raw bytes (magic number check).
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.len() < 3 {
            return Format::Unknown;
        }

        // EXR: 0x76 0x2f 0x31 0x01
        if bytes.len() >= 4 && bytes[0..4] == [0x76, 0x2f, 0x31, 0x01] {
            return Format::Exr;
        }

        if bytes.len() >= 8 && bytes[0..8] == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A] {
            return Format::Png;
        }

        if bytes[0..3] == [0xFF, 0xD8, 0xFF] {
            return Format::Jpeg;
        }

        // TIFF: II (little-endian) or MM (big-endian)
        if bytes.len() >= 4
            && (bytes[0..4] == [0x49, 0x49, 0x2A, 0x00] || bytes[0..4] == [0x4D, 0x4D, 0x00, 0x2A])
        {
            return Format::Tiff;
        }

        Format::Unknown
    }

    /// Canonical file extension for the format.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Format::Exr => Some("exr"),
            Format::Png => Some("png"),
            Format::Jpeg => Some("jpg"),
            Format::Tiff => Some("tif"),
            Format::Unknown => None,
        }
    }
}

/// Returns true if `ext` (without the dot, any case) is a supported still format.
pub fn is_image_ext(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    IMAGE_FORMATS.contains(&ext.as_str())
}

/// Returns true if `ext` (without the dot, any case) is a supported movie container.
pub fn is_movie_ext(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    MOVIE_FORMATS.contains(&ext.as_str())
}

/// Returns true if the path has a supported still extension.
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(is_image_ext)
}
