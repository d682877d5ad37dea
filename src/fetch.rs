//! Image source: fetch-by-URL, decode to a raster.
//!
//! The shared `reqwest::Client` carries the request timeout, so every fetch
//! here is time-bounded; callers decide whether a failure is fatal (primary
//! photo) or recoverable (logo).

use image::DynamicImage;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http: {0}")]
    Http(String),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("decode: {0}")]
    Decode(String),
}

pub async fn fetch_image(http: &reqwest::Client, url: &str) -> Result<DynamicImage, FetchError> {
    let resp = http
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Http(e.to_string()))?;

    if !resp.status().is_success() {
        return Err(FetchError::Status(resp.status()));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| FetchError::Http(e.to_string()))?;

    image::load_from_memory(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
}
