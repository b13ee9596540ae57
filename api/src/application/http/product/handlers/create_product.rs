use axum::extract::State;
use quarry_core::domain::repository::{
    entities::Record, ports::ResourceRepository, value_objects::RequestParameters,
};
use tracing::info;

use super::{ProductResponse, synchronize_collections};
use crate::application::http::{
    product::validators::CreateProductValidator,
    query_extractor::RequestLocale,
    server::{
        api_entities::{
            api_error::{ApiError, ValidateJson},
            response::Response,
        },
        app_state::AppState,
    },
};

#[utoipa::path(
    post,
    path = "",
    tag = "product",
    summary = "Create product",
    description = "Creates a product, then its images, options, features, categories and collections from the nested arrays of the body.",
    request_body = CreateProductValidator,
    responses(
        (status = 201, body = ProductResponse),
        (status = 422, description = "Invalid attributes or nested payload")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    locale: RequestLocale,
    ValidateJson(payload): ValidateJson<CreateProductValidator>,
) -> Result<Response<ProductResponse>, ApiError> {
    payload.collections.check()?;

    let locale = locale.or(&state.args.default_locale);
    let products = state.products(RequestParameters::new(), locale.clone());

    let product = products.put(payload.attributes()).await?;
    info!(slug = %product.slug, "Product created");

    synchronize_collections(&state, product.id, payload.collections, &locale).await?;

    let entry = products.show(Record::Model(product)).await?;

    Ok(Response::Created(ProductResponse { data: entry }))
}
