use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{
    compose::{self, ComposeError, ComposeOptions, Effect},
    fetch::{self, FetchError},
    fonts::FontError,
    state::AppState,
    storage::{self, StorageError},
    util,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessImageRequest {
    /// Photo to compose onto. Required.
    pub image_url: Option<String>,
    /// Displayed in the banner and normalized into a hashtag. Required.
    pub business_name: Option<String>,
    /// Optional logo; failures here never fail the request.
    pub logo_url: Option<String>,
    /// Hashtag row, marker optional per item. Empty falls back to the
    /// normalized business name.
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Upload-capable destination URL. Absent means inline base64 response.
    pub upload_url: Option<String>,
    /// "shadow" (default) or "stroke".
    pub effect: Option<String>,
    /// Text fill as #RRGGBB; defaults to white.
    pub text_color: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessImageResponse {
    pub success: bool,
    pub message: String,
    /// Inline result as a data URI, when no upload destination was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Public reference to the stored object, when uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InputInvalid(String),
    #[error("failed to fetch source image: {0}")]
    SourceFetch(FetchError),
    #[error("{0}")]
    FontUnavailable(FontError),
    #[error("composition failed: {0}")]
    Compose(ComposeError),
    #[error("upload failed: {0}")]
    SinkUpload(StorageError),
}

impl ApiError {
    /// Stable machine-readable category, independent of the message text.
    pub fn category(&self) -> &'static str {
        match self {
            ApiError::InputInvalid(_) => "invalid_input",
            ApiError::SourceFetch(_) => "source_fetch_failed",
            ApiError::FontUnavailable(_) => "font_unavailable",
            ApiError::Compose(_) => "compose_failed",
            ApiError::SinkUpload(_) => "sink_upload_failed",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::InputInvalid(_) => StatusCode::BAD_REQUEST,
            ApiError::SourceFetch(_) | ApiError::SinkUpload(_) => StatusCode::BAD_GATEWAY,
            ApiError::FontUnavailable(_) | ApiError::Compose(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.to_string(),
            "category": self.category(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[utoipa::path(get, path = "/health", tag = "brandgen", responses((status = 200, body = HealthResponse)))]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok".into() })
}

pub async fn openapi_json() -> impl IntoResponse {
    use utoipa::OpenApi;
    Json(crate::openapi::ApiDoc::openapi())
}

#[utoipa::path(
    post,
    path = "/process-image",
    tag = "brandgen",
    request_body = ProcessImageRequest,
    responses(
        (status = 200, body = ProcessImageResponse),
        (status = 400, description = "Missing or invalid request field"),
        (status = 502, description = "Source fetch or upload failed"),
        (status = 500, description = "Composition failed")
    )
)]
pub async fn process_image(
    State(st): State<AppState>,
    Json(req): Json<ProcessImageRequest>,
) -> Result<Json<ProcessImageResponse>, ApiError> {
    let image_url = required(&req.image_url, "image_url")?;
    let business_name = required(&req.business_name, "business_name")?;
    let effect = parse_effect(req.effect.as_deref())?;
    let fill = match req.text_color.as_deref() {
        None => None,
        Some(s) => Some(
            util::parse_hex_color(s)
                .ok_or_else(|| ApiError::InputInvalid(format!("invalid text_color: {s}")))?,
        ),
    };

    // The two fetches are independent; only the primary one can fail the
    // request.
    let (primary, logo) = tokio::join!(
        fetch::fetch_image(&st.http, image_url),
        fetch_logo(&st.http, req.logo_url.as_deref()),
    );
    let base = primary.map_err(ApiError::SourceFetch)?;

    let font = st
        .fonts
        .resolve(&st.cfg.font_name)
        .map_err(ApiError::FontUnavailable)?;

    let mut opts = ComposeOptions {
        effect,
        jpeg_quality: st.cfg.jpeg_quality,
        ..ComposeOptions::default()
    };
    if let Some(fill) = fill {
        opts.banner_fill = fill;
        opts.hashtag_fill = fill;
    }

    let jpeg = compose::compose(base, logo, business_name, &req.hashtags, &font, &opts)
        .map_err(ApiError::Compose)?;
    info!(bytes = jpeg.len(), "image composed");

    match req.upload_url.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(dest) => {
            let url = storage::upload(&st.http, dest, jpeg, "image/jpeg")
                .await
                .map_err(ApiError::SinkUpload)?;
            Ok(Json(ProcessImageResponse {
                success: true,
                message: "Image processed and uploaded".into(),
                data: None,
                url: Some(url),
            }))
        }
        None => Ok(Json(ProcessImageResponse {
            success: true,
            message: "Image processed successfully".into(),
            data: Some(util::to_data_uri(&jpeg, "image/jpeg")),
            url: None,
        })),
    }
}

fn required<'a>(field: &'a Option<String>, name: &str) -> Result<&'a str, ApiError> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::InputInvalid(format!("{name} is required")))
}

fn parse_effect(s: Option<&str>) -> Result<Effect, ApiError> {
    match s {
        None | Some("shadow") => Ok(Effect::Shadow),
        Some("stroke") => Ok(Effect::Stroke),
        Some(other) => Err(ApiError::InputInvalid(format!("unknown effect: {other}"))),
    }
}

/// Logo fetch is best-effort: log and continue without one.
async fn fetch_logo(http: &reqwest::Client, url: Option<&str>) -> Option<DynamicImage> {
    let url = url.map(str::trim).filter(|s| !s.is_empty())?;
    match fetch::fetch_image(http, url).await {
        Ok(img) => Some(img),
        Err(e) => {
            warn!(error = %e, "logo fetch failed, composing without logo");
            None
        }
    }
}

/// Permissive CORS for browser callers; the preflight never reaches a
/// handler.
pub async fn cors(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut res = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(res.headers_mut());
        return res;
    }
    let mut res = next.run(req).await;
    apply_cors_headers(res.headers_mut());
    res
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
}
