//! Logo scaling.

use image::{imageops::FilterType, DynamicImage, GenericImageView};

use super::gradient::Canvas;

/// Logo width as a fraction of the canvas width.
pub const LOGO_WIDTH_FRAC: f32 = 0.15;

/// Scale a decoded logo to 15% of the canvas width, keeping its aspect
/// ratio. The alpha channel survives so the paste can mask non-rectangular
/// logos.
pub fn scale_for_canvas(logo: &DynamicImage, canvas_w: u32) -> Canvas {
    let (lw, lh) = logo.dimensions();
    let target_w = ((canvas_w as f32 * LOGO_WIDTH_FRAC).round() as u32).max(1);
    let target_h = ((target_w as f32 * lh as f32 / lw.max(1) as f32).round() as u32).max(1);
    image::imageops::resize(&logo.to_rgba8(), target_w, target_h, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn solid(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_pixel(w, h, Rgba([9, 9, 9, 255])))
    }

    #[test]
    fn width_is_fifteen_percent() {
        let scaled = scale_for_canvas(&solid(300, 150), 1000);
        assert!((scaled.width() as i64 - 150).abs() <= 1);
    }

    #[test]
    fn aspect_ratio_preserved() {
        let scaled = scale_for_canvas(&solid(400, 100), 1000);
        let ratio = scaled.width() as f32 / scaled.height() as f32;
        assert!((ratio - 4.0).abs() < 0.15, "ratio {ratio}");
    }

    #[test]
    fn tiny_canvas_never_collapses_to_zero() {
        let scaled = scale_for_canvas(&solid(64, 64), 3);
        assert!(scaled.width() >= 1);
        assert!(scaled.height() >= 1);
    }
}
