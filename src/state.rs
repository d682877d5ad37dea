use std::{path::PathBuf, sync::Arc, time::Duration};

use crate::fonts::FontLibrary;

/// Env-driven service configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub fonts_dir: PathBuf,
    pub font_name: String,
    pub fetch_timeout: Duration,
    pub jpeg_quality: u8,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("BACKEND_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let fonts_dir = std::env::var("FONTS_DIR").map(PathBuf::from).unwrap_or_else(|_| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("assets")
                .join("fonts")
        });
        let font_name = std::env::var("BRAND_FONT")
            .unwrap_or_else(|_| crate::fonts::DEFAULT_FONT.to_string());

        let fetch_timeout = std::env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(15));

        let jpeg_quality = std::env::var("JPEG_QUALITY")
            .ok()
            .and_then(|s| s.parse::<u8>().ok())
            .unwrap_or(90)
            .clamp(1, 100);

        Self {
            host,
            port,
            fonts_dir,
            font_name,
            fetch_timeout,
            jpeg_quality,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub fonts: Arc<FontLibrary>,
    pub cfg: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(cfg: ServiceConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(cfg.fetch_timeout)
            .build()?;
        let fonts = Arc::new(FontLibrary::new(cfg.fonts_dir.clone()));
        Ok(Self {
            http,
            fonts,
            cfg: Arc::new(cfg),
        })
    }
}
