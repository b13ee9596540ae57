use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use quarry_core::domain::repository::{
    entities::Record, ports::ResourceRepository, value_objects::RequestParameters,
};

use crate::application::http::server::{api_entities::api_error::ApiError, app_state::AppState};

#[utoipa::path(
    delete,
    path = "/{slug}/force",
    tag = "product",
    summary = "Force delete product",
    description = "Deletes a product for good, trashed or not, along with its nested rows and image files.",
    params(
        ("slug" = String, Path, description = "Product slug"),
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn force_delete_product(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state
        .products(RequestParameters::new(), state.args.default_locale.clone())
        .force_destroy(Record::from(slug))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
