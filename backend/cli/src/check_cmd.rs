//! `imageguard check`: analyze an image file from disk.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};

use imageguard_config::ImageGuardConfig;
use imageguard_core::LocationType;
use imageguard_gateway::{AnalysisInput, EventHandler};

pub async fn run(config: &ImageGuardConfig, image: &Path, location: Option<&str>) -> Result<ExitCode> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("Failed to read image: {}", image.display()))?;

    let handler = EventHandler::from_settings(config.vision_settings()?)?;
    let envelope = handler
        .handle_input(AnalysisInput {
            image: bytes,
            location: LocationType::parse(location),
        })
        .await;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(exit_code_for(envelope.status_code))
}

fn exit_code_for(status_code: u16) -> ExitCode {
    if status_code == 200 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
