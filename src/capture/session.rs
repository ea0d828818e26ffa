//! Capture session
//!
//! Owns the camera, the live preview pump and the photo timer. The session is
//! armed exactly when a photo timer exists; each tick grabs one frame, encodes
//! it, hands it to the photo handler and publishes the parsed result.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::frame::CapturedFrame;
use super::timer::RepeatingTimer;
use super::{Camera, CaptureConfig, CaptureError, SharedCamera};
use crate::overlay::Keyword;
use crate::shared::{OverlaySink, OverlayUpdate};
use crate::vision::PhotoHandler;

/// What a keyword submission did to the capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordOutcome {
    /// Empty input: periodic capture stopped, keyword cleared
    Disarmed,
    /// Periodic capture started
    Armed,
    /// Keyword replaced, existing timer kept
    AlreadyArmed,
    /// Keyword stored but the session is not running, so nothing is captured
    Inactive,
}

/// Camera session with start/stop and armed/disarmed state
pub struct CaptureSession {
    camera: SharedCamera,
    config: CaptureConfig,
    handler: Arc<dyn PhotoHandler>,
    sink: OverlaySink,
    preview_tx: Sender<CapturedFrame>,
    preview_rx: Receiver<CapturedFrame>,
    preview: Option<RepeatingTimer>,
    photo_timer: Option<RepeatingTimer>,
    active: bool,
}

impl CaptureSession {
    /// Create a session; nothing runs until [`CaptureSession::start`]
    pub fn new(
        camera: Box<dyn Camera>,
        config: CaptureConfig,
        handler: Arc<dyn PhotoHandler>,
        sink: OverlaySink,
    ) -> Self {
        let (preview_tx, preview_rx) = bounded(1);
        Self {
            camera: Arc::new(Mutex::new(camera)),
            config,
            handler,
            sink,
            preview_tx,
            preview_rx,
            preview: None,
            photo_timer: None,
            active: false,
        }
    }

    /// Configure the camera and start the live preview.
    ///
    /// A camera that fails configuration is left stopped and the error is
    /// returned; no preview or photo capture will run.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.active {
            return Ok(());
        }

        if let Err(e) = self.camera.lock().configure(&self.config) {
            error!("Camera configuration failed: {}", e);
            return Err(e);
        }

        let camera = self.camera.clone();
        let frames = self.preview_tx.clone();
        let stale = self.preview_rx.clone();
        let sink = self.sink.clone();
        let preview = RepeatingTimer::spawn("preview", Duration::ZERO, self.config.frame_interval(), move || {
            pump_preview(&camera, &frames, &stale, &sink);
        })?;

        self.preview = Some(preview);
        self.active = true;
        info!(
            "Capture session started on {} (preview cap {} fps)",
            self.describe(),
            self.config.max_fps
        );
        Ok(())
    }

    /// Stop photo capture and the preview
    pub fn stop(&mut self) {
        self.disarm();
        if self.preview.take().is_some() {
            info!("Capture session stopped");
        }
        self.active = false;
    }

    /// Whether the camera is configured and previewing
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether periodic photo capture is running
    pub fn is_armed(&self) -> bool {
        self.photo_timer.is_some()
    }

    /// Description of the camera source
    pub fn describe(&self) -> String {
        self.camera.lock().describe()
    }

    /// Receiver of the newest preview frame (older frames are dropped)
    pub fn preview_frames(&self) -> Receiver<CapturedFrame> {
        self.preview_rx.clone()
    }

    /// Handle keyword-field submission
    pub fn submit_keyword(&mut self, raw: &str) -> KeywordOutcome {
        let Some(keyword) = Keyword::parse(raw) else {
            self.disarm();
            self.sink.publish(OverlayUpdate::Keyword(None));
            info!("Keyword cleared, capture disarmed");
            return KeywordOutcome::Disarmed;
        };

        info!("Searching for '{}'", keyword);
        self.sink.publish(OverlayUpdate::Keyword(Some(keyword)));

        if !self.active {
            warn!("Capture session is not running; keyword stored but no photos will be taken");
            return KeywordOutcome::Inactive;
        }
        if self.arm() {
            KeywordOutcome::Armed
        } else {
            KeywordOutcome::AlreadyArmed
        }
    }

    /// Start periodic photo capture; returns `false` if already armed or inactive
    pub fn arm(&mut self) -> bool {
        if self.photo_timer.is_some() || !self.active {
            return false;
        }

        let camera = self.camera.clone();
        let handler = self.handler.clone();
        let sink = self.sink.clone();
        let config = self.config.clone();

        match RepeatingTimer::spawn("photo-capture", self.config.initial_delay, self.config.interval, move || {
            capture_and_recognize(&camera, &config, handler.as_ref(), &sink);
        }) {
            Ok(timer) => {
                self.photo_timer = Some(timer);
                info!(
                    "Capture armed: first photo in {:?}, then every {:?}",
                    self.config.initial_delay, self.config.interval
                );
                true
            }
            Err(e) => {
                error!("Failed to start photo timer: {}", e);
                false
            }
        }
    }

    /// Stop periodic photo capture; returns `false` if it was not armed.
    ///
    /// An upload already in flight completes and still publishes its result.
    pub fn disarm(&mut self) -> bool {
        match self.photo_timer.take() {
            Some(timer) => {
                debug!("Stopping timer '{}'", timer.name());
                true
            }
            None => false,
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Push one preview frame to the UI, replacing any frame the UI has not taken yet
fn pump_preview(
    camera: &SharedCamera,
    frames: &Sender<CapturedFrame>,
    stale: &Receiver<CapturedFrame>,
    sink: &OverlaySink,
) {
    let frame = match camera.lock().grab() {
        Ok(frame) => frame,
        Err(e) => {
            debug!("Preview grab failed: {}", e);
            return;
        }
    };

    let frame = match frames.try_send(frame) {
        Ok(()) => {
            sink.request_repaint();
            return;
        }
        Err(TrySendError::Full(frame)) => frame,
        Err(TrySendError::Disconnected(_)) => return,
    };

    // The slot holds an older frame; swap it for this one
    if let Ok(old) = stale.try_recv() {
        debug!("Replacing preview frame from {:?} ago", old.timestamp.elapsed());
    }
    if frames.try_send(frame).is_ok() {
        sink.request_repaint();
    }
}

/// One photo tick: grab, encode, recognize, publish. Failures drop the frame.
fn capture_and_recognize(
    camera: &SharedCamera,
    config: &CaptureConfig,
    handler: &dyn PhotoHandler,
    sink: &OverlaySink,
) {
    let frame = match camera.lock().grab() {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Photo capture failed: {}", e);
            return;
        }
    };

    let payload = match frame.encode_jpeg(config.width, config.height, config.jpeg_quality) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Dropping photo: {}", e);
            return;
        }
    };
    debug!("Encoded {:?} photo to {} bytes", frame.dimensions(), payload.len());
    drop(frame);

    match handler.on_photo_ready(&payload) {
        Ok(result) => sink.publish(OverlayUpdate::Recognized(Arc::new(result))),
        Err(e) => warn!("Dropping frame: {}", e),
    }
}
