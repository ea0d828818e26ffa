//! Stroke style for keyword boxes

use egui::{Color32, Stroke};

use crate::config::OverlaySettings;

/// Style used to outline matched words
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    /// Line width in points
    pub stroke_width: f32,
    /// Line colour (RGBA)
    pub color: [u8; 4],
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            stroke_width: 3.0,
            color: [255, 0, 0, 255],
        }
    }
}

impl BoxStyle {
    pub fn from_settings(settings: &OverlaySettings) -> Self {
        Self {
            stroke_width: settings.stroke_width,
            color: settings.stroke_color,
        }
    }

    /// Stroke for egui painting
    pub fn stroke(&self) -> Stroke {
        let [r, g, b, a] = self.color;
        Stroke::new(self.stroke_width, Color32::from_rgba_unmultiplied(r, g, b, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_three_point_red() {
        let stroke = BoxStyle::default().stroke();
        assert!((stroke.width - 3.0).abs() < f32::EPSILON);
        assert_eq!(stroke.color, Color32::RED);
    }
}
