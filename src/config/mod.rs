//! Application Configuration
//!
//! User settings stored in TOML format. Every tunable the capture loop,
//! OCR client and overlay depend on lives here instead of in code.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured subscription key
pub const SUBSCRIPTION_KEY_ENV: &str = "CTRLF_SUBSCRIPTION_KEY";

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OCR service settings
    pub service: ServiceSettings,
    /// Capture settings
    pub capture: CaptureSettings,
    /// Overlay settings
    pub overlay: OverlaySettings,
}

impl AppConfig {
    /// Apply overrides taken from the process environment
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(SUBSCRIPTION_KEY_ENV) {
            if !key.trim().is_empty() {
                self.service.subscription_key = key.trim().to_string();
            }
        }
    }
}

/// Remote OCR service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// OCR endpoint URL (without query string)
    pub endpoint: String,
    /// Subscription key sent as `Ocp-Apim-Subscription-Key`
    pub subscription_key: String,
    /// Value of the `language` query parameter
    pub language: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://westus.api.cognitive.microsoft.com/vision/v1.0/ocr".to_string(),
            subscription_key: String::new(),
            language: "en".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Capture-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Width of the image sent to the service
    pub width: u32,
    /// Height of the image sent to the service
    pub height: u32,
    /// Preview frame-rate cap
    pub max_fps: u32,
    /// Period between photo captures in milliseconds
    pub interval_ms: u64,
    /// Delay before the first photo capture in milliseconds
    pub initial_delay_ms: u64,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Monitor index used when capturing the screen
    pub monitor_index: usize,
    /// Replay still images from this directory instead of capturing the screen
    pub image_dir: Option<PathBuf>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            width: 720,
            height: 1280,
            max_fps: 20,
            interval_ms: 1000,
            initial_delay_ms: 1000,
            jpeg_quality: 85,
            monitor_index: 0,
            image_dir: None,
        }
    }
}

/// Overlay-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Empirical factor applied to box width and height
    pub box_scale: f32,
    /// Stroke width of drawn boxes
    pub stroke_width: f32,
    /// Stroke colour (RGBA)
    pub stroke_color: [u8; 4],
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            box_scale: 0.8,
            stroke_width: 3.0,
            stroke_color: [255, 0, 0, 255],
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
