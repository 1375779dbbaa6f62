//! Shoot configuration.
//!
//! Loaded from YAML; every field has a default so an empty document is a
//! valid config:
//!
//! ```yaml
//! encoder: /opt/ffmpeg/bin/ffmpeg
//! player: mpv
//! fps: 24
//! crf: 18
//! scratch_dir: /var/tmp/vfx_shoot
//! placeholder_dir: /studio/assets/missing_frames
//! frame_hold: true
//! ```
//!
//! Lookup order is an explicit path, then `VFX_SHOOT_CONFIG`, then the
//! built-in defaults. `VFX_FFMPEG`, `VFX_PLAYER` and `VFX_SHOOT_TMP`
//! override single fields afterwards.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{ShootError, ShootResult};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "VFX_SHOOT_CONFIG";

/// Movie assembly settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShootConfig {
    /// Encoder executable.
    pub encoder: PathBuf,
    /// Player executable.
    pub player: PathBuf,
    /// Extra arguments placed before the movie paths.
    pub player_args: Vec<String>,
    /// Root of the scratch area.
    pub scratch_dir: PathBuf,
    /// Output frame rate.
    pub fps: u32,
    /// Constant quality for the default preset.
    pub crf: u32,
    /// Copy workers used when combining sequences.
    pub combine_workers: usize,
    /// Copy workers used when materializing frames.
    pub copy_workers: usize,
    /// Membership requires equal padding.
    pub strict_pad: bool,
    /// Hold the previous frame over gaps instead of a placeholder.
    pub frame_hold: bool,
    /// Fail a batch copy on any single failure.
    pub strict_copy: bool,
    /// Directory holding `missing_frame.<ext>` placeholders.
    pub placeholder_dir: Option<PathBuf>,
}

impl Default for ShootConfig {
    fn default() -> Self {
        Self {
            encoder: PathBuf::from("ffmpeg"),
            player: PathBuf::from("mpv"),
            player_args: Vec::new(),
            scratch_dir: env::temp_dir().join("vfx_shoot"),
            fps: 24,
            crf: 18,
            combine_workers: 120,
            copy_workers: 16,
            strict_pad: true,
            frame_hold: true,
            strict_copy: false,
            placeholder_dir: None,
        }
    }
}

impl ShootConfig {
    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> ShootResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ShootError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> ShootResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Resolves the config: `path`, then `VFX_SHOOT_CONFIG`, then defaults,
    /// with environment overrides applied last.
    pub fn load(path: Option<&Path>) -> ShootResult<Self> {
        let from_env = env::var_os(CONFIG_ENV).map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(from_env) {
            Some(p) => {
                debug!(path = %p.display(), "loading shoot config");
                Self::from_file(p)?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Applies `VFX_FFMPEG`, `VFX_PLAYER` and `VFX_SHOOT_TMP`.
    pub fn apply_env(&mut self) {
        if let Some(encoder) = env_path("VFX_FFMPEG") {
            self.encoder = encoder;
        }
        if let Some(player) = env_path("VFX_PLAYER") {
            self.player = player;
        }
        if let Some(tmp) = env_path("VFX_SHOOT_TMP") {
            self.scratch_dir = tmp;
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).filter(|v| !v.is_empty()).map(PathBuf::from)
}
