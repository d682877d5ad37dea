//! Composition pipeline: gradients, logo, banner and hashtag overlays on a
//! decoded photo, flattened and encoded as JPEG.
//!
//! The pipeline is one parameterized pass: measure everything first, paste
//! gradient bands, place the logo, draw the text, flatten to opaque RGB,
//! encode. Rendering order is fixed so text never lands under a gradient.

pub mod gradient;
pub mod layout;
pub mod logo;
pub mod normalize;
pub mod text;

use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, DynamicImage, ImageBuffer, Rgba};
use rusttype::Font;
use thiserror::Error;
use tracing::debug;

use crate::stage_span;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("canvas has no pixels ({0}x{1})")]
    EmptyCanvas(u32, u32),
    #[error("jpeg encode: {0}")]
    Encode(String),
}

/// Legibility treatment applied to banner and hashtag text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Shadow,
    Stroke,
}

/// One pipeline, parameterized; the knobs that used to be separate
/// near-identical render paths.
#[derive(Clone, Debug)]
pub struct ComposeOptions {
    pub effect: Effect,
    pub banner_px: f32,
    pub hashtag_px: f32,
    pub include_logo: bool,
    pub dedup_case_insensitive: bool,
    pub jpeg_quality: u8,
    pub banner_fill: Rgba<u8>,
    pub hashtag_fill: Rgba<u8>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            effect: Effect::Shadow,
            banner_px: 64.0,
            hashtag_px: 42.0,
            include_logo: true,
            dedup_case_insensitive: true,
            jpeg_quality: 90,
            banner_fill: Rgba([255, 255, 255, 255]),
            hashtag_fill: Rgba([255, 255, 255, 255]),
        }
    }
}

const STROKE_WIDTH: i32 = 2;
const STROKE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const GRADIENT_ALPHA: u8 = 170;

/// Compose the final image and return encoded JPEG bytes.
///
/// The hashtag row is the caller's tags (deduplicated) or, when none were
/// given, the token normalized from the business name; a name that strips to
/// nothing renders no row at all.
pub fn compose(
    base: DynamicImage,
    logo: Option<DynamicImage>,
    business_name: &str,
    hashtags: &[String],
    font: &Font<'static>,
    opts: &ComposeOptions,
) -> Result<Vec<u8>, ComposeError> {
    let _span = stage_span!("compose");

    let mut canvas = base.to_rgba8();
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return Err(ComposeError::EmptyCanvas(w, h));
    }

    // Measuring: every box the layout needs, before any drawing.
    let scaled_logo = match (&logo, opts.include_logo) {
        (Some(l), true) => Some(logo::scale_for_canvas(l, w)),
        _ => None,
    };
    let logo_h = scaled_logo.as_ref().map(|l| l.height()).unwrap_or(0);

    let (_, banner_h) = text::measure(font, opts.banner_px, business_name);

    let tags = if hashtags.is_empty() {
        let token = normalize::hashtag_token(business_name);
        if normalize::has_content(&token) {
            vec![token]
        } else {
            Vec::new()
        }
    } else {
        normalize::dedup_tags(hashtags, opts.dedup_case_insensitive)
    };
    let boxes: Vec<(u32, u32)> = tags
        .iter()
        .map(|t| text::measure(font, opts.hashtag_px, t))
        .collect();
    let widths: Vec<u32> = boxes.iter().map(|b| b.0).collect();
    let tag_h = boxes.iter().map(|b| b.1).max().unwrap_or(0);

    let banner = layout::banner(h, banner_h, logo_h);
    let row = layout::hashtag_row(w, h, tag_h, &widths);
    debug!(w, h, logo_h, tags = tags.len(), "layout ready");

    // Gradient bands go down first so no text ends up under one.
    let top_band = gradient::vertical_gradient(
        w,
        banner.band_h,
        Rgba([0, 0, 0, GRADIENT_ALPHA]),
        Rgba([0, 0, 0, 0]),
    );
    gradient::overlay_alpha(&mut canvas, &top_band, 0, 0);

    if let Some(row) = &row {
        let bottom_band = gradient::vertical_gradient(
            w,
            row.band_h,
            Rgba([0, 0, 0, 0]),
            Rgba([0, 0, 0, GRADIENT_ALPHA]),
        );
        gradient::overlay_alpha(&mut canvas, &bottom_band, 0, h - row.band_h);
    }

    if let Some(l) = &scaled_logo {
        gradient::overlay_alpha(&mut canvas, l, layout::PADDING, layout::PADDING);
    }

    draw_run(
        &mut canvas,
        font,
        opts.banner_px,
        layout::PADDING as i32,
        banner.text_y as i32,
        opts.banner_fill,
        business_name,
        opts.effect,
    );

    if let Some(row) = &row {
        for (tag, x) in tags.iter().zip(&row.xs) {
            draw_run(
                &mut canvas,
                font,
                opts.hashtag_px,
                *x as i32,
                row.text_y as i32,
                opts.hashtag_fill,
                tag,
                opts.effect,
            );
        }
    }

    // Flattening: white-backed opaque buffer, then drop alpha for encode.
    let mut flat = ImageBuffer::from_pixel(w, h, Rgba([255, 255, 255, 255]));
    gradient::overlay_alpha(&mut flat, &canvas, 0, 0);
    let rgb = DynamicImage::ImageRgba8(flat).to_rgb8();

    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut buf), opts.jpeg_quality);
    encoder
        .encode(rgb.as_raw(), w, h, image::ExtendedColorType::Rgb8)
        .map_err(|e| ComposeError::Encode(e.to_string()))?;
    Ok(buf)
}

#[allow(clippy::too_many_arguments)]
fn draw_run(
    img: &mut gradient::Canvas,
    font: &Font<'_>,
    px: f32,
    x: i32,
    y: i32,
    fill: Rgba<u8>,
    run: &str,
    effect: Effect,
) {
    match effect {
        Effect::Shadow => text::draw_with_shadow(img, font, px, x, y, fill, run),
        Effect::Stroke => {
            text::draw_with_stroke(img, font, px, x, y, fill, STROKE_COLOR, STROKE_WIDTH, run)
        }
    }
}
