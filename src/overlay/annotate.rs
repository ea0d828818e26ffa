//! Render an overlay layout onto a still image

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::rect::Rect as PixelRect;

use super::widgets::BoxStyle;
use super::OverlayLayout;

/// Draw `layout` over `image`.
///
/// Boxes go onto a transparent layer which is rotated as a whole and then
/// composited, matching what the live view shows. The layout must have been
/// computed for a view the size of the image with its origin at zero.
pub fn annotate(image: &RgbaImage, layout: &OverlayLayout, style: &BoxStyle) -> RgbaImage {
    let (width, height) = image.dimensions();
    let mut layer = RgbaImage::new(width, height);
    let color = Rgba(style.color);
    let thickness = style.stroke_width.round().max(1.0) as i32;

    for rect in &layout.boxes {
        let x = rect.min.x.round() as i32;
        let y = rect.min.y.round() as i32;
        let w = rect.width().round() as i32;
        let h = rect.height().round() as i32;

        // Centre the stroke on the box edge
        for offset in (-(thickness / 2))..(thickness - thickness / 2) {
            let inner_w = w - 2 * offset;
            let inner_h = h - 2 * offset;
            if inner_w <= 0 || inner_h <= 0 {
                continue;
            }
            let pixel_rect = PixelRect::at(x + offset, y + offset).of_size(inner_w as u32, inner_h as u32);
            draw_hollow_rect_mut(&mut layer, pixel_rect, color);
        }
    }

    if let Some(rotation) = layout.rotation {
        layer = rotate_about_center(&layer, rotation, Interpolation::Nearest, Rgba([0, 0, 0, 0]));
    }

    let mut output = image.clone();
    image::imageops::overlay(&mut output, &layer, 0, 0);
    output
}
