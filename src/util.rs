use base64::Engine;
use image::Rgba;

/// Wrap encoded image bytes as a data URI for inline responses.
pub fn to_data_uri(bytes: &[u8], mime: &str) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{b64}")
}

/// Parse `#RRGGBB` (leading `#` optional) into an opaque color.
pub fn parse_hex_color(s: &str) -> Option<Rgba<u8>> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if s.len() != 6 {
        return None;
    }
    let b = hex::decode(s).ok()?;
    Some(Rgba([b[0], b[1], b[2], 255]))
}
