//! Overlay Presentation Layer
//!
//! Draws a box around every recognized word equal to the active keyword,
//! scaled from the uploaded image's coordinate space into the view, and
//! rotates the whole overlay by the service-reported text angle.

pub mod annotate;
pub mod widgets;

use crossbeam_channel::Receiver;
use egui::emath::Rot2;
use egui::{pos2, vec2, Painter, Pos2, Rect, Shape, Vec2};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::config::AppConfig;
use crate::overlay::widgets::BoxStyle;
use crate::shared::OverlayUpdate;
use crate::vision::{BoundingBox, OcrResult};

/// Normalized search keyword (trimmed, lower-cased, never empty)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword(String);

impl Keyword {
    /// Normalize user input; `None` when it is empty or whitespace
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Overlay configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    /// Size of the image the service saw (box coordinates live in this space)
    pub reference_size: Vec2,
    /// Empirical factor applied to box width and height
    pub box_scale: f32,
    /// Stroke style
    pub style: BoxStyle,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

impl OverlayConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            reference_size: vec2(config.capture.width as f32, config.capture.height as f32),
            box_scale: config.overlay.box_scale,
            style: BoxStyle::from_settings(&config.overlay),
        }
    }
}

/// Everything needed to draw one overlay pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayLayout {
    /// Matched word boxes in view coordinates, before rotation
    pub boxes: Vec<Rect>,
    /// Whole-overlay rotation in radians (clockwise, about the view centre)
    pub rotation: Option<f32>,
}

/// Map a service bounding box into view space.
///
/// The origin scales with the view; width and height only get the fixed
/// `box_scale` factor.
pub fn map_box(bbox: &BoundingBox, view: Rect, reference: Vec2, box_scale: f32) -> Rect {
    let x = view.min.x + bbox.x as f32 / reference.x * view.width();
    let y = view.min.y + bbox.y as f32 / reference.y * view.height();
    Rect::from_min_size(
        pos2(x, y),
        vec2(bbox.width as f32 * box_scale, bbox.height as f32 * box_scale),
    )
}

/// Closed outline of `rect` (four corners plus the start point), rotated
/// by `rotation` radians about `pivot`
pub fn outline(rect: Rect, rotation: f32, pivot: Pos2) -> Vec<Pos2> {
    let rot = Rot2::from_angle(rotation);
    [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
        rect.left_top(),
    ]
    .into_iter()
    .map(|corner| pivot + rot * (corner - pivot))
    .collect()
}

/// Holds the latest recognition result and keyword; lives on the UI thread
pub struct OverlayRenderer {
    result: Option<Arc<OcrResult>>,
    keyword: Option<Keyword>,
    config: OverlayConfig,
}

impl OverlayRenderer {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            result: None,
            keyword: None,
            config,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn keyword(&self) -> Option<&Keyword> {
        self.keyword.as_ref()
    }

    #[cfg(test)]
    pub fn result(&self) -> Option<&Arc<OcrResult>> {
        self.result.as_ref()
    }

    /// Apply a single update
    pub fn apply(&mut self, update: OverlayUpdate) {
        match update {
            OverlayUpdate::Recognized(result) => self.result = Some(result),
            OverlayUpdate::Keyword(keyword) => self.keyword = keyword,
        }
    }

    /// Apply every pending update; returns how many were applied
    pub fn drain(&mut self, updates: &Receiver<OverlayUpdate>) -> usize {
        let mut applied = 0;
        while let Ok(update) = updates.try_recv() {
            self.apply(update);
            applied += 1;
        }
        applied
    }

    /// Compute the boxes and rotation for a view.
    ///
    /// Pure function of the held result, keyword and config; calling it twice
    /// with the same view gives the same layout.
    pub fn layout(&self, view: Rect) -> OverlayLayout {
        let Some(result) = &self.result else {
            return OverlayLayout::default();
        };

        let boxes = match &self.keyword {
            Some(keyword) => result
                .matches(keyword.as_str())
                .map(|word| {
                    map_box(
                        &word.bounding_box,
                        view,
                        self.config.reference_size,
                        self.config.box_scale,
                    )
                })
                .collect(),
            None => Vec::new(),
        };

        OverlayLayout {
            boxes,
            rotation: result.rotation_radians().map(|r| r as f32),
        }
    }

    /// Stroke the current layout; returns the number of boxes drawn
    pub fn paint(&self, painter: &Painter, view: Rect) -> usize {
        let layout = self.layout(view);
        let rotation = layout.rotation.unwrap_or(0.0);
        let stroke = self.config.style.stroke();
        let pivot = view.center();

        for rect in &layout.boxes {
            painter.add(Shape::line(outline(*rect, rotation, pivot), stroke));
        }

        if !layout.boxes.is_empty() {
            debug!("Drew {} box(es), rotation {:.3} rad", layout.boxes.len(), rotation);
        }
        layout.boxes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::OverlaySink;
    use crate::vision::ocr::parse_response;

    fn view(width: f32, height: f32) -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(width, height))
    }

    fn result(json: &str) -> Arc<OcrResult> {
        Arc::new(parse_response(json).unwrap())
    }

    fn renderer_with(result_json: &str, keyword: &str) -> OverlayRenderer {
        let mut renderer = OverlayRenderer::new(OverlayConfig::default());
        renderer.apply(OverlayUpdate::Recognized(result(result_json)));
        renderer.apply(OverlayUpdate::Keyword(Keyword::parse(keyword)));
        renderer
    }

    const ONE_WORD: &str = r#"{"orientation":"Up","regions":[{"lines":[{"words":[
        {"text":"keyword","boundingBox":"100,200,50,60"}
    ]}]}]}"#;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{} != {}", a, b);
    }

    #[test]
    fn test_keyword_normalization() {
        assert_eq!(Keyword::parse("  Hello World ").unwrap().as_str(), "hello world");
        assert!(Keyword::parse("").is_none());
        assert!(Keyword::parse(" \t\n").is_none());
    }

    #[test]
    fn test_coordinate_mapping() {
        let renderer = renderer_with(ONE_WORD, "keyword");
        let layout = renderer.layout(view(720.0, 1280.0));

        assert_eq!(layout.boxes.len(), 1);
        let rect = layout.boxes[0];
        assert_close(rect.min.x, 100.0);
        assert_close(rect.min.y, 200.0);
        assert_close(rect.width(), 40.0);
        assert_close(rect.height(), 48.0);
    }

    #[test]
    fn test_origin_scales_with_view_but_size_does_not() {
        let rect = map_box(
            &BoundingBox::new(360, 640, 100, 10),
            Rect::from_min_size(pos2(10.0, 20.0), vec2(360.0, 640.0)),
            vec2(720.0, 1280.0),
            0.8,
        );

        assert_close(rect.min.x, 10.0 + 180.0);
        assert_close(rect.min.y, 20.0 + 320.0);
        assert_close(rect.width(), 80.0);
        assert_close(rect.height(), 8.0);
    }

    #[test]
    fn test_no_result_draws_nothing() {
        let mut renderer = OverlayRenderer::new(OverlayConfig::default());
        renderer.apply(OverlayUpdate::Keyword(Keyword::parse("keyword")));

        assert_eq!(renderer.layout(view(720.0, 1280.0)), OverlayLayout::default());
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let json = r#"{"regions":[{"lines":[{"words":[
            {"text":"Keyword","boundingBox":"0,0,10,10"}
        ]}]}]}"#;
        assert!(renderer_with(json, "keyword").layout(view(720.0, 1280.0)).boxes.is_empty());

        // The keyword itself is lower-cased, so upper-case input still finds lower-case text
        assert_eq!(renderer_with(ONE_WORD, "KEYWORD").layout(view(720.0, 1280.0)).boxes.len(), 1);
    }

    #[test]
    fn test_every_matching_word_is_boxed() {
        let json = r#"{"regions":[
            {"lines":[{"words":[{"text":"cat","boundingBox":"0,0,10,10"},{"text":"dog","boundingBox":"20,0,10,10"}]}]},
            {"lines":[{"words":[{"text":"cat","boundingBox":"40,40,10,10"}]}]}
        ]}"#;
        let layout = renderer_with(json, "cat").layout(view(720.0, 1280.0));

        assert_eq!(layout.boxes.len(), 2);
        assert_close(layout.boxes[1].min.x, 40.0);
    }

    #[test]
    fn test_rotation_mapping() {
        let left = renderer_with(r#"{"orientation":"Left","textAngle":"10"}"#, "x");
        let rotation = left.layout(view(720.0, 1280.0)).rotation.unwrap();
        assert_close(rotation, (-80.0f32).to_radians());

        let up = renderer_with(r#"{"orientation":"Up","textAngle":10}"#, "x");
        assert_close(up.layout(view(720.0, 1280.0)).rotation.unwrap(), 10.0f32.to_radians());

        let none = renderer_with(r#"{"orientation":"Left"}"#, "x");
        assert!(none.layout(view(720.0, 1280.0)).rotation.is_none());
    }

    #[test]
    fn test_empty_keyword_clears_boxes_despite_stale_result() {
        let mut renderer = renderer_with(ONE_WORD, "keyword");
        assert_eq!(renderer.layout(view(720.0, 1280.0)).boxes.len(), 1);

        renderer.apply(OverlayUpdate::Keyword(Keyword::parse("   ")));

        assert!(renderer.result().is_some());
        assert!(renderer.layout(view(720.0, 1280.0)).boxes.is_empty());
    }

    #[test]
    fn test_new_result_replaces_previous() {
        let mut renderer = renderer_with(ONE_WORD, "keyword");
        renderer.apply(OverlayUpdate::Recognized(result(r#"{"regions":[]}"#)));

        assert!(renderer.layout(view(720.0, 1280.0)).boxes.is_empty());
    }

    #[test]
    fn test_layout_is_idempotent() {
        let renderer = renderer_with(ONE_WORD, "keyword");
        let v = view(400.0, 800.0);
        assert_eq!(renderer.layout(v), renderer.layout(v));
    }

    #[test]
    fn test_drain_applies_in_order() {
        let (sink, receiver) = OverlaySink::detached();
        sink.publish(OverlayUpdate::Recognized(result(ONE_WORD)));
        sink.publish(OverlayUpdate::Keyword(Keyword::parse("other")));
        sink.publish(OverlayUpdate::Keyword(Keyword::parse("keyword")));

        let mut renderer = OverlayRenderer::new(OverlayConfig::default());
        assert_eq!(renderer.drain(&receiver), 3);
        assert_eq!(renderer.keyword().unwrap().as_str(), "keyword");
        assert_eq!(renderer.layout(view(720.0, 1280.0)).boxes.len(), 1);
        assert_eq!(renderer.drain(&receiver), 0);
    }

    #[test]
    fn test_outline_is_closed_and_rotates_about_pivot() {
        let rect = Rect::from_min_size(pos2(10.0, 0.0), vec2(2.0, 2.0));

        let flat = outline(rect, 0.0, Pos2::ZERO);
        assert_eq!(flat.len(), 5);
        assert_eq!(flat[0], flat[4]);
        assert_eq!(flat[1], pos2(12.0, 0.0));

        let turned = outline(rect, std::f32::consts::FRAC_PI_2, Pos2::ZERO);
        assert_close(turned[0].x, 0.0);
        assert_close(turned[0].y, 10.0);
    }
}
