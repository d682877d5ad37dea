//! Hashtag normalization.
//!
//! A business name becomes a single lowercase token: Unicode is folded to its
//! closest ASCII form first (so "Café" and "Cafe" agree), then everything
//! outside ASCII letters/digits is dropped and the marker is prefixed.

use std::collections::HashSet;

use deunicode::deunicode;

/// Leading symbol identifying a hashtag token.
pub const MARKER: char = '#';

/// Canonical hashtag token for a free-form name.
///
/// An input with no representable characters yields the bare marker; see
/// [`has_content`].
pub fn hashtag_token(name: &str) -> String {
    let folded = deunicode(name);

    let mut cleaned = String::with_capacity(folded.len());
    for ch in folded.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() || ch == ' ' {
            cleaned.push(ch);
        }
    }

    let mut token = String::with_capacity(cleaned.len() + 1);
    token.push(MARKER);
    for word in cleaned.split_whitespace() {
        token.push_str(word);
    }
    token
}

/// False for a marker-only token, which renders as nothing useful.
pub fn has_content(token: &str) -> bool {
    token.len() > MARKER.len_utf8()
}

/// Display form of a caller-supplied tag: exactly one leading marker.
pub fn ensure_marker(tag: &str) -> String {
    let body = tag.trim().trim_start_matches(MARKER);
    format!("{MARKER}{body}")
}

/// Order-preserving de-duplication of caller tags.
///
/// With `case_insensitive` the key is the normalized token ("#NYC" and "#nyc"
/// collide); otherwise the exact display string is the key. Marker-only tags
/// are dropped.
pub fn dedup_tags(tags: &[String], case_insensitive: bool) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(tags.len());
    for tag in tags {
        let display = ensure_marker(tag);
        if !has_content(&display) {
            continue;
        }
        let key = if case_insensitive {
            hashtag_token(&display)
        } else {
            display.clone()
        };
        if seen.insert(key) {
            out.push(display);
        }
    }
    out
}
