use std::{io::Cursor, thread};

use axum::extract::{Json, State};
use brandgen_backend::{
    api::{self, ProcessImageRequest},
    fetch::{self, FetchError},
    state::{AppState, ServiceConfig},
    storage,
};
use image::GenericImageView;
use tiny_http::{Response, Server, StatusCode};

/// Minimal image source + upload sink stub.
///
/// `/photo.png` serves a decodable PNG, `/upload/...` accepts PUTs (500 when
/// the path contains "fail"), everything else is 404.
fn spawn_stub() -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    thread::spawn(move || {
        for req in server.incoming_requests() {
            let url = req.url().to_string();
            if url.starts_with("/photo.png") {
                let _ = req.respond(Response::from_data(png_bytes()));
            } else if url.starts_with("/upload") {
                let code = if url.contains("fail") { 500 } else { 200 };
                let _ = req.respond(Response::empty(StatusCode(code)));
            } else {
                let _ = req.respond(Response::empty(StatusCode(404)));
            }
        }
    });
    format!("http://127.0.0.1:{port}")
}

fn png_bytes() -> Vec<u8> {
    let img = image::ImageBuffer::from_pixel(64, 48, image::Rgba([120u8, 90, 40, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn test_state() -> AppState {
    AppState::new(ServiceConfig::from_env()).unwrap()
}

fn request(image_url: Option<String>, business_name: Option<String>) -> ProcessImageRequest {
    ProcessImageRequest {
        image_url,
        business_name,
        logo_url: None,
        hashtags: Vec::new(),
        upload_url: None,
        effect: None,
        text_color: None,
    }
}

#[tokio::test]
async fn fetch_rejects_non_2xx() {
    let base = spawn_stub();
    let st = test_state();
    let err = fetch::fetch_image(&st.http, &format!("{base}/missing.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status(s) if s.as_u16() == 404));
}

#[tokio::test]
async fn fetch_decodes_photo() {
    let base = spawn_stub();
    let st = test_state();
    let img = fetch::fetch_image(&st.http, &format!("{base}/photo.png"))
        .await
        .unwrap();
    assert_eq!(img.width(), 64);
    assert_eq!(img.height(), 48);
}

#[tokio::test]
async fn garbage_bytes_fail_to_decode() {
    let base = spawn_stub();
    let st = test_state();
    // The sink endpoint answers GET with an empty 200 body.
    let err = fetch::fetch_image(&st.http, &format!("{base}/upload/nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn missing_fields_are_rejected_before_any_fetch() {
    let st = test_state();
    let err = api::process_image(State(st.clone()), Json(request(None, Some("Acme".into()))))
        .await
        .err()
        .unwrap();
    assert_eq!(err.category(), "invalid_input");

    let err = api::process_image(
        State(st),
        Json(request(Some("http://127.0.0.1:9/x.png".into()), None)),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(err.category(), "invalid_input");
}

#[tokio::test]
async fn unreachable_source_is_source_fetch_failed() {
    let base = spawn_stub();
    let st = test_state();
    let err = api::process_image(
        State(st),
        Json(request(Some(format!("{base}/missing.png")), Some("Acme".into()))),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(err.category(), "source_fetch_failed");
}

#[tokio::test]
async fn logo_failure_is_recoverable() {
    let base = spawn_stub();
    let st = test_state();
    if st.fonts.fallback().is_err() {
        eprintln!("no usable font on this host, skipping");
        return;
    }

    let mut req = request(Some(format!("{base}/photo.png")), Some("Acme Diner".into()));
    req.logo_url = Some(format!("{base}/no-logo-here.png"));
    req.hashtags = vec!["food".into(), "NYC".into()];

    let resp = api::process_image(State(st), Json(req)).await.unwrap();
    assert!(resp.0.success);
    let data = resp.0.data.expect("inline data expected");
    assert!(data.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn upload_sink_returns_public_url() {
    let base = spawn_stub();
    let st = test_state();
    if st.fonts.fallback().is_err() {
        eprintln!("no usable font on this host, skipping");
        return;
    }

    let mut req = request(Some(format!("{base}/photo.png")), Some("Acme".into()));
    req.upload_url = Some(format!("{base}/upload/out.jpg?sig=secret"));

    let resp = api::process_image(State(st), Json(req)).await.unwrap();
    assert!(resp.0.success);
    assert_eq!(resp.0.url.as_deref(), Some(format!("{base}/upload/out.jpg").as_str()));
    assert!(resp.0.data.is_none());
}

#[tokio::test]
async fn failed_upload_has_its_own_category() {
    let base = spawn_stub();
    let st = test_state();
    if st.fonts.fallback().is_err() {
        eprintln!("no usable font on this host, skipping");
        return;
    }

    let mut req = request(Some(format!("{base}/photo.png")), Some("Acme".into()));
    req.upload_url = Some(format!("{base}/upload/fail.jpg"));

    let err = api::process_image(State(st), Json(req)).await.err().unwrap();
    assert_eq!(err.category(), "sink_upload_failed");
}

#[tokio::test]
async fn storage_upload_hits_the_sink() {
    let base = spawn_stub();
    let st = test_state();
    let url = storage::upload(&st.http, &format!("{base}/upload/a.jpg?t=1"), vec![1, 2, 3], "image/jpeg")
        .await
        .unwrap();
    assert_eq!(url, format!("{base}/upload/a.jpg"));
}
