//! Watermarker CLI — command-line client for the watermarker service.
//!
//! Set WATERMARKER_BASE_URL (or pass --base-url). Defaults to http://localhost:3000.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use watermarker_cli::{init_tracing, print_json, resolve_options, OptionOverrides};
use watermarker_client::{Format, Position, WatermarkerClient, WatermarkerConfig};

#[derive(Parser)]
#[command(name = "watermarker", about = "Watermarker API CLI")]
struct Cli {
    /// Base URL of the watermarker service (overrides WATERMARKER_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a watermark to an image
    Apply {
        /// Path to the source image
        image: PathBuf,
        /// Path to the watermark image
        watermark: PathBuf,
        /// Where to write the watermarked image
        #[arg(short, long)]
        output: PathBuf,
        /// JSON file with convert options; flags below take precedence
        #[arg(long)]
        options_json: Option<PathBuf>,
        /// Watermark size relative to the image, in percent
        #[arg(long)]
        size: Option<u32>,
        /// center, top, top-left, top-right, left, right, bottom, bottom-left, bottom-right
        #[arg(long)]
        position: Option<Position>,
        /// jpg, png or gif
        #[arg(long)]
        format: Option<Format>,
        /// Output quality (0-100)
        #[arg(long)]
        quality: Option<u32>,
        /// Blur radius of the underlying image
        #[arg(long)]
        blur: Option<u32>,
        /// Watermark opacity (0-100)
        #[arg(long)]
        opacity: Option<u32>,
    },
    /// Check that the service is up
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = WatermarkerConfig::from_env().context("Invalid watermarker configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    let client = WatermarkerClient::from_config(&config)
        .context("Failed to create watermarker client")?;

    match cli.command {
        Commands::Apply {
            image,
            watermark,
            output,
            options_json,
            size,
            position,
            format,
            quality,
            blur,
            opacity,
        } => {
            let overrides = OptionOverrides {
                size,
                position,
                format,
                quality,
                blur,
                opacity,
            };
            let options = resolve_options(options_json.as_deref(), &overrides)?;
            tracing::info!(
                image = %image.display(),
                watermark = %watermark.display(),
                ?options,
                "Applying watermark"
            );

            let written = client
                .apply_files(&image, &watermark, &output, &options)
                .await?;
            print_json(&serde_json::json!({
                "output": output.display().to_string(),
                "bytes": written,
                "options": options,
            }))?;
        }
        Commands::Health => {
            let healthy = client.check_service_health().await;
            print_json(&serde_json::json!({
                "healthy": healthy,
                "base_url": client.base_url(),
            }))?;
            if !healthy {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
