use utoipa::OpenApi;

use crate::application::http::product::router::ProductApiDoc;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quarry API"
    ),
    nest(
        (path = "/products", api = ProductApiDoc),
    )
)]
pub struct ApiDoc;
