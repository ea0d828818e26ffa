//! Screen camera backed by xcap
//!
//! Captures a whole monitor. The monitor is looked up by index on every grab
//! so no platform handle has to cross threads.

use image::DynamicImage;
use tracing::{debug, info};
use xcap::Monitor;

use super::frame::CapturedFrame;
use super::{Camera, CaptureConfig, CaptureError};

/// Information about an attached monitor
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    pub index: usize,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub is_primary: bool,
}

/// List the monitors xcap can capture
pub fn list_monitors() -> Result<Vec<MonitorInfo>, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::Source(format!("Failed to get monitors: {}", e)))?;

    Ok(monitors
        .iter()
        .enumerate()
        .map(|(index, monitor)| MonitorInfo {
            index,
            name: monitor.name().unwrap_or_else(|_| "Unknown".to_string()),
            width: monitor.width().unwrap_or(0),
            height: monitor.height().unwrap_or(0),
            is_primary: monitor.is_primary().unwrap_or(false),
        })
        .collect())
}

fn monitor_at(index: usize) -> Result<Monitor, CaptureError> {
    Monitor::all()
        .map_err(|e| CaptureError::Source(format!("Failed to get monitors: {}", e)))?
        .into_iter()
        .nth(index)
        .ok_or_else(|| CaptureError::Source(format!("Monitor index {} not found", index)))
}

/// Camera that captures a monitor
pub struct ScreenCamera {
    monitor_index: usize,
    configured: bool,
}

impl ScreenCamera {
    /// Create a camera for the monitor at `monitor_index`
    pub fn new(monitor_index: usize) -> Self {
        Self {
            monitor_index,
            configured: false,
        }
    }
}

impl Camera for ScreenCamera {
    fn configure(&mut self, config: &CaptureConfig) -> Result<(), CaptureError> {
        config.validate()?;

        let monitor = monitor_at(self.monitor_index)?;
        let width = monitor.width().unwrap_or(0);
        let height = monitor.height().unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(CaptureError::Source(format!(
                "Monitor {} reports an empty size",
                self.monitor_index
            )));
        }

        info!(
            "Screen camera configured on monitor {} ({}x{}), photos at {}x{}",
            self.monitor_index, width, height, config.width, config.height
        );
        self.configured = true;
        Ok(())
    }

    fn grab(&mut self) -> Result<CapturedFrame, CaptureError> {
        if !self.configured {
            return Err(CaptureError::Source("screen camera is not configured".into()));
        }

        let rgba_image = monitor_at(self.monitor_index)?
            .capture_image()
            .map_err(|e| CaptureError::Source(format!("Failed to capture screen: {}", e)))?;

        let frame = CapturedFrame::from_image(DynamicImage::ImageRgba8(rgba_image));
        debug!("Grabbed {}x{} screen frame", frame.width, frame.height);
        Ok(frame)
    }

    fn describe(&self) -> String {
        format!("Monitor {}", self.monitor_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grab_before_configure_fails() {
        let mut camera = ScreenCamera::new(0);
        assert!(matches!(camera.grab(), Err(CaptureError::Source(_))));
    }

    #[test]
    fn test_configure_rejects_invalid_preset() {
        let mut camera = ScreenCamera::new(0);
        let mut config = CaptureConfig::default();
        config.max_fps = 0;
        assert!(matches!(camera.configure(&config), Err(CaptureError::Config(_))));
    }

    #[test]
    fn test_describe() {
        assert_eq!(ScreenCamera::new(2).describe(), "Monitor 2");
    }
}
