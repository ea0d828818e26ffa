//! Ctrl-F - find a word in the world around you
//!
//! Periodically photographs the camera view, sends each photo to a remote
//! OCR service and outlines every occurrence of the typed keyword on top of
//! the live preview.

mod app;
mod capture;
mod config;
mod overlay;
mod shared;
mod storage;
mod vision;

use anyhow::{Context, Result};
use clap::Parser;
use egui::{vec2, Pos2, Rect};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::capture::frame::CapturedFrame;
use crate::config::AppConfig;
use crate::overlay::{annotate::annotate, Keyword, OverlayConfig, OverlayRenderer};
use crate::shared::OverlayUpdate;
use crate::vision::CognitiveOcr;

/// Ctrl-F - highlight a keyword in a live camera view
#[derive(Parser, Debug)]
#[command(name = "ctrlf")]
#[command(about = "Highlight a keyword in a live camera view using cloud OCR")]
struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Monitor index to capture (0 = first)
    #[arg(short, long)]
    monitor: Option<usize>,

    /// Replay still images from a file or directory instead of capturing the screen
    #[arg(long)]
    images: Option<PathBuf>,

    /// Keyword to search for at startup
    #[arg(short, long)]
    keyword: Option<String>,

    /// List available monitors and exit
    #[arg(long)]
    list_monitors: bool,

    /// Recognize a single image file and print the matches (requires --keyword)
    #[arg(long)]
    scan: Option<PathBuf>,

    /// With --scan, write a copy of the image with the matches outlined
    #[arg(long, requires = "scan")]
    annotate: Option<PathBuf>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    write_config: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    if args.list_monitors {
        println!("Available monitors:");
        let monitors = capture::list_monitors()?;
        if monitors.is_empty() {
            println!("  No monitors detected");
        }
        for monitor in &monitors {
            println!(
                "  [{}] {} - {}x{}{}",
                monitor.index,
                monitor.name,
                monitor.width,
                monitor.height,
                if monitor.is_primary { " (primary)" } else { "" }
            );
        }
        return Ok(());
    }

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => storage::default_config_path()?,
    };
    let mut config = load_or_default_config(&config_path);
    if let Some(monitor) = args.monitor {
        config.capture.monitor_index = monitor;
    }
    if let Some(images) = &args.images {
        config.capture.image_dir = Some(images.clone());
    }

    if args.write_config {
        config::save_config(&config, &config_path)
            .with_context(|| format!("Failed to write {:?}", config_path))?;
        println!("Wrote configuration to {}", config_path.display());
        return Ok(());
    }

    config.apply_env();

    if let Some(image) = &args.scan {
        return run_scan(&config, image, args.keyword.as_deref(), args.annotate.as_deref());
    }

    info!("Ctrl-F starting...");
    let client = CognitiveOcr::new(&config.service).context("Failed to create OCR client")?;
    app::run_app(config, Arc::new(client), args.keyword)
        .map_err(|e| anyhow::anyhow!("Window error: {}", e))?;

    info!("Ctrl-F shutdown complete");
    Ok(())
}

/// Load configuration from file or fall back to defaults
fn load_or_default_config(path: &Path) -> AppConfig {
    if path.exists() {
        match config::load_config(path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                return config;
            }
            Err(e) => warn!("Ignoring unreadable configuration {:?}: {}", path, e),
        }
    }
    info!("Using default configuration");
    AppConfig::default()
}

/// Recognize one image file and report where the keyword appears
fn run_scan(config: &AppConfig, image: &Path, keyword: Option<&str>, annotate_out: Option<&Path>) -> Result<()> {
    let keyword = keyword
        .and_then(Keyword::parse)
        .context("--scan needs a non-empty --keyword")?;

    let client = CognitiveOcr::new(&config.service).context("Failed to create OCR client")?;
    let frame = CapturedFrame::open(image).with_context(|| format!("Failed to read {:?}", image))?;
    let payload = frame.encode_jpeg(config.capture.width, config.capture.height, config.capture.jpeg_quality)?;
    let result = client.recognize(&payload)?;

    let mut renderer = OverlayRenderer::new(OverlayConfig::from_app_config(config));
    renderer.apply(OverlayUpdate::Recognized(Arc::new(result)));
    renderer.apply(OverlayUpdate::Keyword(Some(keyword.clone())));

    let view = Rect::from_min_size(Pos2::ZERO, vec2(frame.width as f32, frame.height as f32));
    let layout = renderer.layout(view);

    println!("'{}': {} match(es) in {}", keyword, layout.boxes.len(), image.display());
    for rect in &layout.boxes {
        println!(
            "  x={:.1} y={:.1} w={:.1} h={:.1}",
            rect.min.x,
            rect.min.y,
            rect.width(),
            rect.height()
        );
    }
    if let Some(rotation) = layout.rotation {
        println!("  rotation {:.1} deg", rotation.to_degrees());
    }

    if let Some(out) = annotate_out {
        let annotated = annotate(&frame.to_rgba_image()?, &layout, &renderer.config().style);
        annotated
            .save(out)
            .with_context(|| format!("Failed to write {:?}", out))?;
        println!("Annotated image written to {}", out.display());
    }

    Ok(())
}
