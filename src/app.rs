//! Application Coordinator
//!
//! The eframe window: a keyword field on top, the live preview below it and
//! the keyword overlay painted over the preview. All renderer state is owned
//! here and only changes when updates from the capture threads are drained.

use crossbeam_channel::Receiver;
use egui::{pos2, Color32, Rect, TextureHandle, TextureOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::capture::frame::CapturedFrame;
use crate::capture::{open_camera, CaptureConfig, CaptureSession, KeywordOutcome};
use crate::config::AppConfig;
use crate::overlay::{OverlayConfig, OverlayRenderer};
use crate::shared::{OverlaySink, OverlayUpdate};
use crate::vision::PhotoHandler;

/// Main application window
pub struct CtrlFApp {
    session: CaptureSession,
    renderer: OverlayRenderer,
    updates: Receiver<OverlayUpdate>,
    preview_frames: Receiver<CapturedFrame>,
    preview: Option<TextureHandle>,
    keyword_input: String,
    status: String,
    frame_interval: Duration,
}

impl CtrlFApp {
    /// Build the session and start the camera
    pub fn new(
        ctx: &egui::Context,
        config: &AppConfig,
        handler: Arc<dyn PhotoHandler>,
        initial_keyword: Option<String>,
    ) -> Self {
        let repaint_ctx = ctx.clone();
        let (sink, updates) = OverlaySink::new(Arc::new(move || repaint_ctx.request_repaint()));

        let capture_config = CaptureConfig::from_settings(&config.capture);
        let frame_interval = capture_config.frame_interval();
        let target = capture_config.target.clone();
        let camera = open_camera(&target);
        let mut session = CaptureSession::new(camera, capture_config, handler, sink);

        let status = match session.start() {
            Ok(()) => format!("Capturing {}", session.describe()),
            Err(e) => format!("{} unavailable: {}", target.describe(), e),
        };

        let mut app = Self {
            preview_frames: session.preview_frames(),
            session,
            renderer: OverlayRenderer::new(OverlayConfig::from_app_config(config)),
            updates,
            preview: None,
            keyword_input: initial_keyword.unwrap_or_default(),
            status,
            frame_interval,
        };

        if !app.keyword_input.trim().is_empty() {
            app.submit_keyword();
        }
        app
    }

    /// Create eframe options for the main window
    pub fn options() -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([405.0, 760.0])
                .with_min_inner_size([270.0, 480.0])
                .with_title("Ctrl-F"),
            ..Default::default()
        }
    }

    fn submit_keyword(&mut self) {
        let outcome = self.session.submit_keyword(&self.keyword_input);
        if outcome == KeywordOutcome::Disarmed {
            self.keyword_input.clear();
        }
        info!("Keyword submitted: {:?}", outcome);
    }

    /// Upload the newest preview frame into the texture
    fn update_preview(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.preview_frames.try_iter().last() else {
            return;
        };

        let image = egui::ColorImage::from_rgba_unmultiplied(
            [frame.width as usize, frame.height as usize],
            &frame.data,
        );
        match &mut self.preview {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => self.preview = Some(ctx.load_texture("preview", image, TextureOptions::LINEAR)),
        }
    }

    fn search_label(&self) -> String {
        match (self.session.is_armed(), self.renderer.keyword()) {
            (true, Some(keyword)) => format!("searching for '{}'", keyword),
            _ => "idle".to_string(),
        }
    }
}

impl eframe::App for CtrlFApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.renderer.drain(&self.updates);
        self.update_preview(ctx);

        egui::TopBottomPanel::top("keyword_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Find:");
                let response = ui.text_edit_singleline(&mut self.keyword_input);
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    self.submit_keyword();
                }
            });
            ui.small(format!("{} ({})", self.status, self.search_label()));
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                let view = ui.max_rect();
                let painter = ui.painter_at(view);

                if let Some(texture) = &self.preview {
                    painter.image(
                        texture.id(),
                        view,
                        Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }

                self.renderer.paint(&painter, view);
            });

        if self.session.is_active() {
            ctx.request_repaint_after(self.frame_interval);
        }
    }
}

/// Run the main window (blocking)
pub fn run_app(
    config: AppConfig,
    handler: Arc<dyn PhotoHandler>,
    initial_keyword: Option<String>,
) -> Result<(), eframe::Error> {
    let result = eframe::run_native(
        "Ctrl-F",
        CtrlFApp::options(),
        Box::new(move |cc| Ok(Box::new(CtrlFApp::new(&cc.egui_ctx, &config, handler, initial_keyword)))),
    );
    if let Err(e) = &result {
        error!("Window error: {}", e);
    }
    result
}
