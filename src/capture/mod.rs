//! Capture Layer
//!
//! Owns the camera lifecycle: configuring a source, feeding the live preview
//! and taking one photo per timer tick while a keyword is armed.

pub mod frame;
pub mod screen;
pub mod session;
pub mod still;
pub mod timer;

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::CaptureSettings;
use frame::CapturedFrame;

pub use screen::{list_monitors, ScreenCamera};
pub use session::{CaptureSession, KeywordOutcome};
pub use still::StillImageCamera;

/// Errors raised while configuring or reading a camera
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The requested preset cannot be applied
    #[error("invalid capture configuration: {0}")]
    Config(String),
    /// The source is missing or failed to produce a frame
    #[error("capture source error: {0}")]
    Source(String),
    /// The frame could not be compressed
    #[error("failed to encode frame: {0}")]
    Encode(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// What the camera points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureTarget {
    /// A monitor by index (0 = first reported)
    MonitorIndex(usize),
    /// Still images replayed from a file or directory
    Images(PathBuf),
}

impl CaptureTarget {
    /// Human readable description
    pub fn describe(&self) -> String {
        match self {
            CaptureTarget::MonitorIndex(i) => format!("Monitor {}", i),
            CaptureTarget::Images(path) => format!("Images in {}", path.display()),
        }
    }
}

/// Capture configuration
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Source to capture from
    pub target: CaptureTarget,
    /// Width of the photo sent for recognition
    pub width: u32,
    /// Height of the photo sent for recognition
    pub height: u32,
    /// Maximum preview frames per second
    pub max_fps: u32,
    /// JPEG quality of uploaded photos
    pub jpeg_quality: u8,
    /// Delay before the first photo once armed
    pub initial_delay: Duration,
    /// Period between photos while armed
    pub interval: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::from_settings(&CaptureSettings::default())
    }
}

impl CaptureConfig {
    /// Build the runtime capture configuration from persisted settings
    pub fn from_settings(settings: &CaptureSettings) -> Self {
        let target = match &settings.image_dir {
            Some(dir) => CaptureTarget::Images(dir.clone()),
            None => CaptureTarget::MonitorIndex(settings.monitor_index),
        };

        Self {
            target,
            width: settings.width,
            height: settings.height,
            max_fps: settings.max_fps,
            jpeg_quality: settings.jpeg_quality,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            interval: Duration::from_millis(settings.interval_ms),
        }
    }

    /// Check the preset before handing it to a camera
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::Config(format!(
                "capture resolution {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.max_fps == 0 {
            return Err(CaptureError::Config("frame-rate cap must be at least 1".into()));
        }
        if self.interval.is_zero() {
            return Err(CaptureError::Config("capture interval must be non-zero".into()));
        }
        Ok(())
    }

    /// Minimum time between two preview frames
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.max_fps.max(1)
    }
}

/// A source of frames standing in for the device camera
pub trait Camera: Send {
    /// Apply the capture preset; a camera that fails here must not be started
    fn configure(&mut self, config: &CaptureConfig) -> Result<(), CaptureError>;

    /// Grab the current frame
    fn grab(&mut self) -> Result<CapturedFrame, CaptureError>;

    /// Short description for status display
    fn describe(&self) -> String;
}

/// Camera shared between the preview pump and the photo timer
pub type SharedCamera = Arc<Mutex<Box<dyn Camera>>>;

/// Create the camera for a capture target
pub fn open_camera(target: &CaptureTarget) -> Box<dyn Camera> {
    match target {
        CaptureTarget::MonitorIndex(index) => Box::new(ScreenCamera::new(*index)),
        CaptureTarget::Images(path) => Box::new(StillImageCamera::new(path.clone())),
    }
}
