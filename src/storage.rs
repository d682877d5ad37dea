//! Object-storage sink.
//!
//! The destination is an upload-capable URL (pre-signed PUT or equivalent);
//! the public reference is the same URL without its query string. Upload
//! failure is its own error kind so callers can retry delivery without
//! recomposing.

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("http: {0}")]
    Http(String),
    #[error("upload rejected with status {status}: {body}")]
    Rejected { status: reqwest::StatusCode, body: String },
}

pub async fn upload(
    http: &reqwest::Client,
    destination: &str,
    bytes: Vec<u8>,
    content_type: &str,
) -> Result<String, StorageError> {
    let resp = http
        .put(destination)
        .header(CONTENT_TYPE, content_type)
        .body(bytes)
        .send()
        .await
        .map_err(|e| StorageError::Http(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(StorageError::Rejected { status, body });
    }

    Ok(public_url(destination))
}

/// Strip credentials-bearing query parameters from a pre-signed URL.
fn public_url(destination: &str) -> String {
    match destination.split_once('?') {
        Some((base, _)) => base.to_string(),
        None => destination.to_string(),
    }
}
