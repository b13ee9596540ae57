use axum::extract::{Path, State};
use quarry_core::domain::repository::{
    entities::Record, ports::ResourceRepository, value_objects::RequestParameters,
};

use super::ProductResponse;
use crate::application::http::{
    query_extractor::RequestLocale,
    server::{
        api_entities::{api_error::ApiError, response::Response},
        app_state::AppState,
    },
};

#[utoipa::path(
    get,
    path = "/{slug}",
    tag = "product",
    summary = "Get product",
    description = "Returns one product with its translations, brand, images and features.",
    params(
        ("slug" = String, Path, description = "Product slug"),
    ),
    responses(
        (status = 200, body = ProductResponse),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    locale: RequestLocale,
) -> Result<Response<ProductResponse>, ApiError> {
    let locale = locale.or(&state.args.default_locale);

    let entry = state
        .products(RequestParameters::new(), locale)
        .show(Record::from(slug))
        .await?;

    Ok(Response::OK(ProductResponse { data: entry }))
}
