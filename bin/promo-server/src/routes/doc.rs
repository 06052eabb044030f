use utoipa::OpenApi;

use crate::routes::{capabilities, download, generate, health, samples};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "promo-server",
        description = "Promotional banner and football schedule renderer",
        version = "0.1.0"
    ),
    tags(
        (name = "generate", description = "Render banners and schedule cards"),
        (name = "download", description = "Fetch stored renders"),
        (name = "samples", description = "Example payloads and test renders"),
        (name = "health", description = "Liveness and capabilities"),
    )
)]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(generate::GenerateApi::openapi());
    root.merge(download::DownloadApi::openapi());
    root.merge(samples::SamplesApi::openapi());
    root.merge(health::HealthApi::openapi());
    root.merge(capabilities::CapabilitiesApi::openapi());
    root
}
