use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use geolens_config::Config;
use geolens_gateway::{start_server, GatewayState};
use geolens_logging::init_logger;
use geolens_understanding::{CloudVision, GeminiModel, GoogleGeocoder};

#[derive(Parser)]
#[command(name = "geolens")]
#[command(about = "GeoLens: image geolocation relay for Gemini and Cloud Vision")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Check whether a server is answering
    Status {
        /// Base URL of the running server
        #[arg(long, default_value = "http://localhost:5001")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            let mut config = Config::from_env().context("Refusing to start")?;
            if let Some(port) = port {
                config.port = port;
            }
            init_logger(config.log_dir.as_deref().map(Path::new), &config.log_level)
                .context("Cannot open the log directory")?;
            run_server(config).await?;
        }
        Commands::Status { url } => {
            println!("GeoLens status: checking {url} ...");
            match reqwest::get(&url).await {
                Ok(resp) if resp.status().is_success() => {
                    println!("{}", resp.text().await?);
                }
                Ok(resp) => println!("GeoLens answered with {}", resp.status()),
                Err(_) => println!("GeoLens is not running at {url}"),
            }
        }
    }

    Ok(())
}

fn build_state(config: &Config) -> Result<GatewayState> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.provider_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build().context("Failed to build HTTP client")?;

    let model = GeminiModel::new(client.clone(), &config.gemini_api_key)
        .with_model(&config.gemini_model);
    info!(model = %model.model(), "Registered Gemini model");
    let mut state = GatewayState::new(Arc::new(model));

    if let Some(key) = &config.vision_api_key {
        state = state.with_vision(Arc::new(CloudVision::new(client.clone(), key)));
        info!("Registered Cloud Vision provider");
    } else {
        info!("No vision key, lens requests will use the generative model");
    }

    if let Some(key) = &config.geocoding_api_key {
        state = state.with_geocoder(Arc::new(GoogleGeocoder::new(client, key)));
        info!("Registered geocoder");
    }

    Ok(state)
}

async fn run_server(config: Config) -> Result<()> {
    info!(config = %config.redacted(), "Starting GeoLens");

    let addr: SocketAddr = config
        .socket_addr()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.socket_addr()))?;
    let state = build_state(&config)?;

    start_server(addr, state, config.max_upload_bytes).await
}
