use std::net::SocketAddr;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tracing::info;

use brandgen_backend::{
    api,
    state::{AppState, ServiceConfig},
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = ServiceConfig::from_env();
    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse().expect("bind addr");

    let state = AppState::new(cfg).expect("http client");

    let app = Router::new()
        .route("/process-image", post(api::process_image))
        .route("/health", get(api::health))
        .route("/openapi.json", get(api::openapi_json))
        .layer(middleware::from_fn(api::cors))
        .with_state(state);

    info!("Starting brandgen-backend on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
