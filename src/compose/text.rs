//! Glyph run measurement and drawing.
//!
//! Glyphs are rasterized by rusttype and blended per-pixel onto the canvas,
//! the coverage value scaled by the fill color's alpha so translucent fills
//! (the drop shadow) blend correctly.

use image::Rgba;
use rusttype::{point, Font, Scale};

use super::gradient::Canvas;

/// Pixel bounding box of `text` at `px`: (width, height).
///
/// Height comes from the font's vertical metrics so all runs at one size
/// share a baseline; width is the rightmost rendered pixel. Whitespace-only
/// text falls back to advance widths.
pub fn measure(font: &Font<'_>, px: f32, text: &str) -> (u32, u32) {
    if text.is_empty() {
        return (0, 0);
    }
    let scale = Scale::uniform(px);
    let v = font.v_metrics(scale);
    let height = (v.ascent - v.descent).ceil().max(0.0) as u32;

    let glyphs: Vec<_> = font.layout(text, scale, point(0.0, v.ascent)).collect();
    let mut width: f32 = 0.0;
    for g in &glyphs {
        if let Some(bb) = g.pixel_bounding_box() {
            width = width.max(bb.max.x as f32);
        }
    }
    if width == 0.0 {
        width = glyphs
            .iter()
            .map(|g| g.unpositioned().h_metrics().advance_width)
            .sum();
    }
    (width.ceil().max(0.0) as u32, height)
}

/// Draw `text` with its top-left corner at `(x, y)`.
pub fn draw(img: &mut Canvas, font: &Font<'_>, px: f32, x: i32, y: i32, color: Rgba<u8>, text: &str) {
    let scale = Scale::uniform(px);
    let v = font.v_metrics(scale);
    let baseline = y as f32 + v.ascent;

    for glyph in font.layout(text, scale, point(x as f32, baseline)) {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, cov| {
                let dx = gx as i32 + bb.min.x;
                let dy = gy as i32 + bb.min.y;
                if dx < 0 || dy < 0 {
                    return;
                }
                let (dx, dy) = (dx as u32, dy as u32);
                if dx >= img.width() || dy >= img.height() {
                    return;
                }
                let a = (cov * color.0[3] as f32) as u8;
                if a == 0 {
                    return;
                }
                let sa = a as f32 / 255.0;
                let inv = 1.0 - sa;
                let dst = img.get_pixel_mut(dx, dy);
                dst.0[0] = (color.0[0] as f32 * sa + dst.0[0] as f32 * inv) as u8;
                dst.0[1] = (color.0[1] as f32 * sa + dst.0[1] as f32 * inv) as u8;
                dst.0[2] = (color.0[2] as f32 * sa + dst.0[2] as f32 * inv) as u8;
                dst.0[3] = 255;
            });
        }
    }
}

/// Shadow offset grows with the glyph size. Tunable, not load-bearing.
pub fn shadow_offset(px: f32) -> i32 {
    ((px / 24.0).round() as i32).max(2)
}

/// Translucent dark copy offset down-right, then the fill on top.
/// `(x, y)` anchors the fill draw, not the shadow.
pub fn draw_with_shadow(img: &mut Canvas, font: &Font<'_>, px: f32, x: i32, y: i32, fill: Rgba<u8>, text: &str) {
    let off = shadow_offset(px);
    draw(img, font, px, x + off, y + off, Rgba([0, 0, 0, 160]), text);
    draw(img, font, px, x, y, fill, text);
}

/// Solid stroke at every offset within the radius square, fill at the origin.
/// O(width²) draws per run; width stays small.
#[allow(clippy::too_many_arguments)]
pub fn draw_with_stroke(
    img: &mut Canvas,
    font: &Font<'_>,
    px: f32,
    x: i32,
    y: i32,
    fill: Rgba<u8>,
    stroke: Rgba<u8>,
    width: i32,
    text: &str,
) {
    for dy in -width..=width {
        for dx in -width..=width {
            if dx == 0 && dy == 0 {
                continue;
            }
            draw(img, font, px, x + dx, y + dy, stroke, text);
        }
    }
    draw(img, font, px, x, y, fill, text);
}
