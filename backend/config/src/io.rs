//! Config file loading.

use crate::schema::ImageGuardConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Env var pointing at an explicit config file.
pub const CONFIG_PATH_VAR: &str = "IMAGEGUARD_CONFIG";

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the ImageGuard config directory: `~/.imageguard/`, or `.imageguard` without a home.
pub fn config_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".imageguard"),
        None => PathBuf::from(".imageguard"),
    }
}

/// Resolve the config file path.
/// Priority: explicit path > `IMAGEGUARD_CONFIG` env > `~/.imageguard/config.yaml`.
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    config_dir().join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist; a bare environment
/// is a complete configuration.
pub async fn load_config(path: &Path) -> Result<ImageGuardConfig> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(ImageGuardConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: ImageGuardConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("absent.yaml")).await.unwrap();
        assert!(cfg.vision.is_none());
    }

    #[tokio::test]
    async fn parses_camel_case_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "vision:\n  model: gpt-4o-mini\n  maxTokens: 150\ngateway:\n  port: 9000\nlogging:\n  format: json"
        )
        .unwrap();

        let cfg = load_config(file.path()).await.unwrap();
        let vision = cfg.vision.unwrap();
        assert_eq!(vision.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(vision.max_tokens, Some(150));
        assert_eq!(cfg.gateway.unwrap().port, Some(9000));
        assert_eq!(cfg.logging.unwrap().format, Some(crate::schema::LogFormat::Json));
    }

    #[tokio::test]
    async fn invalid_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "vision: [unclosed").unwrap();
        assert!(load_config(file.path()).await.is_err());
    }

    #[test]
    fn explicit_path_wins() {
        let path = config_file_path(Some(Path::new("/etc/imageguard.yaml")));
        assert_eq!(path, PathBuf::from("/etc/imageguard.yaml"));
    }
}
