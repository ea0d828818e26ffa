//! Cognitive Services OCR client
//!
//! Uploads one JPEG per call to the OCR endpoint and parses the JSON answer.
//! Calls block the caller; the HTTP work runs on a private tokio runtime.

use reqwest::header::CONTENT_TYPE;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use super::ocr::{parse_response, OcrResult};
use super::{OcrError, PhotoHandler};
use crate::config::ServiceSettings;

/// Header carrying the subscription key
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Blocking client for the remote OCR service
pub struct CognitiveOcr {
    client: reqwest::Client,
    runtime: Runtime,
    endpoint: String,
    subscription_key: String,
    language: String,
}

impl CognitiveOcr {
    /// Create a client from service settings
    pub fn new(settings: &ServiceSettings) -> Result<Self, OcrError> {
        if settings.subscription_key.trim().is_empty() {
            return Err(OcrError::MissingKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        info!("OCR client targeting {} (language {})", settings.endpoint, settings.language);

        Ok(Self {
            client,
            runtime,
            endpoint: settings.endpoint.clone(),
            subscription_key: settings.subscription_key.trim().to_string(),
            language: settings.language.clone(),
        })
    }

    /// Upload a compressed photo and parse the recognition result
    pub fn recognize(&self, payload: &[u8]) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let body = self.runtime.block_on(self.upload(payload))?;
        let result = parse_response(&body)?;

        debug!(
            "OCR complete in {:?}: {} words, orientation {:?}, angle {:?}",
            start.elapsed(),
            result.words().count(),
            result.orientation,
            result.text_angle
        );
        Ok(result)
    }

    async fn upload(&self, payload: &[u8]) -> Result<String, OcrError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("language", self.language.as_str())])
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .body(payload.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("OCR service returned {}: {}", status, body);
            return Err(OcrError::Service {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}

impl PhotoHandler for CognitiveOcr {
    fn on_photo_ready(&self, payload: &[u8]) -> Result<OcrResult, OcrError> {
        self.recognize(payload)
    }
}
