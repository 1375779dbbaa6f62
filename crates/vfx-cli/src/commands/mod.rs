//! CLI command implementations

pub mod play;
pub mod seqs;
pub mod shoot;

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::debug;
use vfx_shoot::{ImageFilter, ShootConfig, ShootEngine};

/// Loads the config from `path`, `$VFX_SHOOT_CONFIG` or defaults.
pub fn load_config(path: Option<&Path>) -> Result<ShootConfig> {
    let config = ShootConfig::load(path).context("Failed to load config")?;
    debug!(?config, "config loaded");
    Ok(config)
}

/// Creates an engine restricted to `name` / `ext` in expanded folders.
pub fn build_engine(config: ShootConfig, name: Option<String>, ext: Option<String>) -> ShootEngine {
    ShootEngine::new(config).with_filter(ImageFilter { base_name: name, ext })
}

/// Expands glob patterns; plain paths pass through unchanged.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if !is_pattern(input) {
            paths.push(PathBuf::from(input));
            continue;
        }
        let matched: Vec<PathBuf> = glob::glob(input)
            .with_context(|| format!("Invalid pattern: {}", input))?
            .filter_map(|r| r.ok())
            .collect();
        if matched.is_empty() {
            bail!("No files match pattern: {}", input);
        }
        paths.extend(matched);
    }
    Ok(paths)
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
        && !Path::new(input).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_inputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["sh010", "sh020", "other"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        let pattern = dir.path().join("sh0*").display().to_string();
        let plain = dir.path().join("other").display().to_string();

        let paths = expand_inputs(&[pattern, plain.clone()]).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths[0].ends_with("sh010"));
        assert!(paths[1].ends_with("sh020"));
        assert_eq!(paths[2], PathBuf::from(plain));
    }

    #[test]
    fn test_expand_inputs_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("*.exr").display().to_string();
        assert!(expand_inputs(&[pattern]).is_err());
    }

    #[test]
    fn test_bracketed_existing_path_is_literal() {
        let dir = tempfile::tempdir().unwrap();
        let literal = dir.path().join("[seq]");
        std::fs::create_dir(&literal).unwrap();
        let paths = expand_inputs(&[literal.display().to_string()]).unwrap();
        assert_eq!(paths, vec![literal]);
    }
}
