//! Movie encoding.
//!
//! [`MovieEncoder`] is the seam between the engine and the external
//! encoder. [`FfmpegEncoder`] runs the system `ffmpeg` binary on a numbered
//! frame pattern, blocking until it exits. The output is always
//! overwritten.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::{ShootError, ShootResult};

/// Transfer characteristic applied when decoding linear EXR input.
pub const EXR_TRANSFER: &str = "iec61966_2_1";

/// Constant quality of the high-quality preset (lossless).
pub const HIGH_QUALITY_CRF: u32 = 0;

/// One encode: a numbered frame pattern into one movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeJob {
    /// Printf-style frame pattern (`/tmp/frames/sh010_comp.%04d.exr`).
    pub input: PathBuf,
    /// First frame number of the pattern.
    pub start_number: u64,
    /// Frames to encode from `start_number`.
    pub frame_count: usize,
    /// Output size in pixels.
    pub size: (u32, u32),
    /// Movie file to write.
    pub output: PathBuf,
    /// Lossless fast preset instead of the default quality preset.
    pub high_quality: bool,
    /// Output frame rate.
    pub fps: u32,
    /// Constant quality for the default preset.
    pub crf: u32,
    /// Input is linear EXR and needs the sRGB transfer applied.
    pub linear_input: bool,
}

impl EncodeJob {
    /// Encoder preset name.
    pub fn preset(&self) -> &'static str {
        if self.high_quality { "ultrafast" } else { "slower" }
    }

    /// Constant quality used.
    pub fn quality(&self) -> u32 {
        if self.high_quality {
            HIGH_QUALITY_CRF
        } else {
            self.crf
        }
    }
}

/// Rounds a frame size down to even numbers (yuv420p), at least 2x2.
pub fn even_size(width: u32, height: u32) -> (u32, u32) {
    ((width & !1).max(2), (height & !1).max(2))
}

/// Turns frame patterns into movies.
pub trait MovieEncoder: Send + Sync {
    /// Runs one encode to completion.
    fn encode(&self, job: &EncodeJob) -> ShootResult<()>;
}

/// Encoder backed by the `ffmpeg` command-line tool.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegEncoder {
    /// Uses `program` as the ffmpeg executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Executable in use.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// True if the executable answers `-version`.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Full argument list for `job`.
    pub fn args(job: &EncodeJob) -> Vec<OsString> {
        let (width, height) = even_size(job.size.0, job.size.1);
        let mut args: Vec<OsString> = Vec::new();
        let mut push = |a: &str| args.push(a.into());

        push("-y");
        push("-loglevel");
        push("error");
        push("-framerate");
        push(&job.fps.to_string());
        push("-start_number");
        push(&job.start_number.to_string());
        if job.linear_input {
            push("-apply_trc");
            push(EXR_TRANSFER);
        }
        push("-i");
        args.push(job.input.clone().into_os_string());

        let mut push = |a: &str| args.push(a.into());
        push("-frames:v");
        push(&job.frame_count.to_string());
        push("-c:v");
        push("libx264");
        push("-preset");
        push(job.preset());
        push("-crf");
        push(&job.quality().to_string());
        push("-tune");
        push("animation");
        push("-pix_fmt");
        push("yuv420p");
        push("-s");
        push(&format!("{}x{}", width, height));
        push("-c:a");
        push("aac");
        push("-f");
        push("mp4");
        args.push(job.output.clone().into_os_string());
        args
    }
}

impl MovieEncoder for FfmpegEncoder {
    fn encode(&self, job: &EncodeJob) -> ShootResult<()> {
        let fail = |reason: String| ShootError::Encode {
            output: job.output.clone(),
            reason,
        };

        if let Some(parent) = job.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                fail(format!("cannot create output directory '{}': {}", parent.display(), e))
            })?;
        }

        let args = Self::args(job);
        debug!(program = %self.program.display(), ?args, "running encoder");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| fail(format!("failed to launch {}: {}", self.program.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!("exited with {}: {}", output.status, stderr.trim())));
        }

        info!(output = %job.output.display(), frames = job.frame_count, "movie written");
        Ok(())
    }
}
