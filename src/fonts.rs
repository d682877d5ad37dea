//! Font resolution.
//!
//! The library is created once at startup and injected through `AppState`;
//! loaded fonts are cached behind a lock so concurrent first loads of the
//! same file only waste work, never corrupt the map. Resolution failures
//! fall back along an explicit chain instead of aborting the request.

use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rusttype::Font;
use thiserror::Error;
use tracing::warn;

/// Deployment asset used when the requested font is missing.
pub const DEFAULT_FONT: &str = "Montserrat-Bold.ttf";

/// Last-resort fonts present on common Linux/macOS hosts.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
];

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse font {0}")]
    Parse(String),
    #[error("no usable font in {0} or known system paths")]
    NoneAvailable(String),
}

pub struct FontLibrary {
    dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<Font<'static>>>>,
    fallback: OnceCell<Arc<Font<'static>>>,
}

impl FontLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Mutex::new(HashMap::new()),
            fallback: OnceCell::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load a named font file from the library directory, cached.
    pub fn load(&self, name: &str) -> Result<Arc<Font<'static>>, FontError> {
        if let Some(f) = self.cache.lock().get(name) {
            return Ok(Arc::clone(f));
        }
        let f = Arc::new(load_file(&self.dir.join(name), name)?);
        self.cache.lock().insert(name.to_string(), Arc::clone(&f));
        Ok(f)
    }

    /// Resolve a font for rendering: the named file, else the fallback
    /// chain. Only an empty chain is an error.
    pub fn resolve(&self, name: &str) -> Result<Arc<Font<'static>>, FontError> {
        match self.load(name) {
            Ok(f) => Ok(f),
            Err(e) => {
                warn!(font = name, error = %e, "font unavailable, using fallback");
                self.fallback()
            }
        }
    }

    /// The guaranteed-available font: the bundled default, else the first
    /// readable system font. Computed once and shared.
    pub fn fallback(&self) -> Result<Arc<Font<'static>>, FontError> {
        self.fallback
            .get_or_try_init(|| {
                if let Ok(f) = load_file(&self.dir.join(DEFAULT_FONT), DEFAULT_FONT) {
                    return Ok(Arc::new(f));
                }
                for path in SYSTEM_FONTS {
                    if let Ok(f) = load_file(Path::new(path), path) {
                        return Ok(Arc::new(f));
                    }
                }
                Err(FontError::NoneAvailable(self.dir.display().to_string()))
            })
            .map(Arc::clone)
    }
}

fn load_file(path: &Path, name: &str) -> Result<Font<'static>, FontError> {
    let bytes = std::fs::read(path).map_err(|e| FontError::Read {
        name: name.to_string(),
        source: e,
    })?;
    Font::try_from_vec(bytes).ok_or_else(|| FontError::Parse(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_is_a_read_error() {
        let lib = FontLibrary::new(std::env::temp_dir().join("brandgen-no-such-dir"));
        assert!(matches!(
            lib.load("definitely-missing.ttf"),
            Err(FontError::Read { .. })
        ));
    }

    #[test]
    fn resolve_falls_back_for_unknown_name() {
        let lib = FontLibrary::new(std::env::temp_dir().join("brandgen-no-such-dir"));
        // Host may genuinely have no fonts; both outcomes are legal, but a
        // hit must come from the fallback chain, not the named file.
        match lib.resolve("definitely-missing.ttf") {
            Ok(_) => assert!(lib.fallback().is_ok()),
            Err(e) => assert!(matches!(e, FontError::NoneAvailable(_))),
        }
    }

    #[test]
    fn fallback_is_shared_once_loaded() {
        let lib = FontLibrary::new(std::env::temp_dir().join("brandgen-no-such-dir"));
        if let (Ok(a), Ok(b)) = (lib.fallback(), lib.fallback()) {
            assert!(Arc::ptr_eq(&a, &b));
        }
    }
}
