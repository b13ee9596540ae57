use axum::extract::{Path, State};
use quarry_core::domain::repository::{
    entities::Record, ports::ResourceRepository, value_objects::RequestParameters,
};

use super::{ProductResponse, synchronize_collections};
use crate::application::http::{
    product::validators::UpdateProductValidator,
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
    put,
    path = "/{slug}",
    tag = "product",
    summary = "Update product",
    description = "Updates the attributes present in the body and replaces every nested collection the body names.",
    params(
        ("slug" = String, Path, description = "Product slug"),
    ),
    request_body = UpdateProductValidator,
    responses(
        (status = 200, body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Invalid attributes or nested payload")
    )
)]
pub async fn update_product(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    locale: RequestLocale,
    ValidateJson(payload): ValidateJson<UpdateProductValidator>,
) -> Result<Response<ProductResponse>, ApiError> {
    payload.collections.check()?;

    let locale = locale.or(&state.args.default_locale);
    let products = state.products(RequestParameters::new(), locale.clone());

    let product = products
        .update(Record::from(slug), payload.attributes())
        .await?;

    synchronize_collections(&state, product.id, payload.collections, &locale).await?;

    let entry = products.show(Record::Model(product)).await?;

    Ok(Response::OK(ProductResponse { data: entry }))
}
