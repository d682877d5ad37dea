use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health,
        api::process_image,
    ),
    components(
        schemas(api::ProcessImageRequest, api::ProcessImageResponse, api::HealthResponse)
    ),
    tags(
        (name = "brandgen", description = "brandgen Rust backend API")
    )
)]
pub struct ApiDoc;
