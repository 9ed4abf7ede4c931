mod check_cmd;
mod invoke_cmd;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use imageguard_config::ImageGuardConfig;
use imageguard_gateway::{EventHandler, GatewayState};

#[derive(Parser)]
#[command(name = "imageguard")]
#[command(about = "ImageGuard — vision-model image acceptance checks")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Handle one event JSON (file or stdin) and print the response envelope
    Invoke {
        /// Event file; reads stdin when omitted
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
    /// Check an image file and print the response envelope
    Check {
        /// Image to analyze
        image: PathBuf,
        /// Location type (e.g. interior, exterior); omit for the content-safety check
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Print the effective configuration with secrets masked
    Config,
    /// Query a running gateway's health endpoint
    Status,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = imageguard_config::load_and_prepare(cli.config.as_deref()).await?;
    let _log_guard = imageguard_logging::init_logger(&config.logging_config());
    // Loading ran before the subscriber existed; report its findings now.
    imageguard_config::validate(&config).log();

    match cli.command {
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.gateway.get_or_insert_with(Default::default).port = Some(port);
            }
            run_server(config).await?;
        }
        Commands::Invoke { event } => return invoke_cmd::run(&config, event.as_deref()).await,
        Commands::Check { image, location } => {
            return check_cmd::run(&config, &image, location.as_deref()).await;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
        Commands::Status => {
            let url = format!(
                "http://127.0.0.1:{}/api/health",
                config.gateway.as_ref().and_then(|g| g.port).unwrap_or(8080)
            );
            match reqwest::get(&url).await {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("ImageGuard is not reachable at {url}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_server(config: ImageGuardConfig) -> Result<()> {
    // A missing credential is a startup failure for the long-running server.
    let settings = config
        .vision_settings()
        .context("cannot start gateway without a vision API key")?;
    let model = settings.model.clone();
    let handler = EventHandler::from_settings(settings)?;
    let addr = config.bind_address();

    info!(addr = %addr, model = %model, "Starting ImageGuard gateway");
    imageguard_gateway::start_server(&addr, GatewayState::new(handler, model)).await
}
