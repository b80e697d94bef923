//! HTTP server for scanning and composing Google Slides presentations.

mod api;
mod error;

use anyhow::{Context, Result};
use api::{create_router, ApiState};
use clap::Parser;
use slides_google::{GoogleConfig, GoogleSlidesClient};
use std::time::Duration;

/// Serve the slide scan and composition API.
#[derive(Parser, Debug)]
#[command(name = "slides-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8000")]
    port: u16,

    /// OAuth access token for the Slides and Drive APIs
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Slides API root
    #[arg(long, env = "SLIDES_API_BASE")]
    slides_api_base: Option<String>,

    /// Drive API root
    #[arg(long, env = "DRIVE_API_BASE")]
    drive_api_base: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, env = "SLIDES_TIMEOUT_SECS", default_value = "30")]
    timeout: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let state = build_state(&args)?;
    let app = create_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn build_state(args: &Args) -> Result<ApiState> {
    let Some(token) = args.token.as_deref().filter(|t| !t.trim().is_empty()) else {
        log::warn!("GOOGLE_ACCESS_TOKEN is not set; data routes will answer 503");
        return Ok(ApiState::unconfigured());
    };

    let mut config = GoogleConfig::new(token).with_timeout(Duration::from_secs(args.timeout));
    if let Some(base) = &args.slides_api_base {
        config = config.with_slides_base(base.as_str());
    }
    if let Some(base) = &args.drive_api_base {
        config = config.with_drive_base(base.as_str());
    }

    let client = GoogleSlidesClient::new(config).context("Failed to create Google client")?;
    Ok(ApiState::google(client))
}
