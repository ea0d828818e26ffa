//! Still image camera
//!
//! Replays image files from disk in name order, looping at the end.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::frame::CapturedFrame;
use super::{Camera, CaptureConfig, CaptureError};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Camera that cycles through image files
pub struct StillImageCamera {
    source: PathBuf,
    files: Vec<PathBuf>,
    next: usize,
}

impl StillImageCamera {
    /// Create a camera over a single image file or a directory of images
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            files: Vec::new(),
            next: 0,
        }
    }

    fn scan(&self) -> Result<Vec<PathBuf>, CaptureError> {
        if self.source.is_file() {
            return Ok(vec![self.source.clone()]);
        }
        if !self.source.is_dir() {
            return Err(CaptureError::Source(format!(
                "{} is neither a file nor a directory",
                self.source.display()
            )));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.source)? {
            let path = entry?.path();
            if path.is_file() && is_image_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl Camera for StillImageCamera {
    fn configure(&mut self, config: &CaptureConfig) -> Result<(), CaptureError> {
        config.validate()?;

        let files = self.scan()?;
        let Some(first) = files.first() else {
            return Err(CaptureError::Source(format!(
                "no images found in {}",
                self.source.display()
            )));
        };

        // Fail now rather than on the first tick if the first image is unreadable
        image::image_dimensions(first)?;

        info!("Still image camera configured with {} image(s) from {:?}", files.len(), self.source);
        self.files = files;
        self.next = 0;
        Ok(())
    }

    fn grab(&mut self) -> Result<CapturedFrame, CaptureError> {
        if self.files.is_empty() {
            return Err(CaptureError::Source("still image camera is not configured".into()));
        }

        let path = &self.files[self.next % self.files.len()];
        self.next = (self.next + 1) % self.files.len();

        match CapturedFrame::open(path) {
            Ok(frame) => {
                debug!("Replayed {:?} ({}x{})", path, frame.width, frame.height);
                Ok(frame)
            }
            Err(e) => {
                warn!("Failed to read {:?}: {}", path, e);
                Err(e)
            }
        }
    }

    fn describe(&self) -> String {
        format!("Images in {}", self.source.display())
    }
}
