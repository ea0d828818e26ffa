//! Vision/OCR Layer
//!
//! Recognition is delegated to a remote OCR service. This layer turns a
//! compressed photo into an [`OcrResult`] and nothing more.

pub mod cognitive;
pub mod ocr;

use thiserror::Error;

pub use cognitive::CognitiveOcr;
pub use ocr::{BoundingBox, OcrResult};

/// Errors produced while recognizing a photo
#[derive(Debug, Error)]
pub enum OcrError {
    /// No subscription key configured
    #[error("no OCR subscription key configured (set service.subscription_key or {})", crate::config::SUBSCRIPTION_KEY_ENV)]
    MissingKey,
    /// Transport-level failure (connect, timeout, body read)
    #[error("OCR request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with a non-success status
    #[error("OCR service returned {status}: {body}")]
    Service { status: u16, body: String },
    /// The response body is not a recognition document
    #[error("failed to parse OCR response: {0}")]
    Parse(#[from] serde_json::Error),
    /// The async runtime could not be created
    #[error("failed to start HTTP runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Receives each compressed photo and turns it into a recognition result.
///
/// Called on the capture timer thread; implementations may block.
pub trait PhotoHandler: Send + Sync {
    fn on_photo_ready(&self, payload: &[u8]) -> Result<OcrResult, OcrError>;
}
