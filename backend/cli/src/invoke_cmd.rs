//! `imageguard invoke`: local Lambda-style invocation.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use imageguard_config::{ImageGuardConfig, process_env};
use imageguard_gateway::invoke_with_config;

/// Environment variables are re-read here and win over the `--config` file.
pub async fn run(config: &ImageGuardConfig, event_path: Option<&Path>) -> Result<ExitCode> {
    let raw = read_event(event_path).await?;
    let event: serde_json::Value = serde_json::from_str(&raw).context("event is not valid JSON")?;

    let envelope = invoke_with_config(event, config, &process_env()).await;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(ExitCode::SUCCESS)
}

async fn read_event(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event file: {}", path.display())),
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read event from stdin")?;
            Ok(raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn reads_event_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"image": "aGVsbG8="}}"#).unwrap();
        let raw = read_event(Some(file.path())).await.unwrap();
        assert!(raw.contains("aGVsbG8="));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        assert!(read_event(Some(Path::new("/nonexistent/event.json"))).await.is_err());
    }
}
