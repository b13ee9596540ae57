pub mod create_product;
pub mod delete_product;
pub mod force_delete_product;
pub mod get_product;
pub mod list_products;
pub mod update_product;

use quarry_core::{
    domain::{repository::entities::Entry, synchronization::ports::ProductSynchronization},
    entity::products::Model as Product,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::http::server::{api_entities::api_error::ApiError, app_state::AppState};

use super::validators::ProductCollections;

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct ProductResponse {
    #[schema(value_type = Product)]
    pub data: Entry<Product>,
}

/// Replaces every nested collection present in the request body.
pub(crate) async fn synchronize_collections(
    state: &AppState,
    product_id: i32,
    collections: ProductCollections,
    locale: &str,
) -> Result<(), ApiError> {
    let sync = &state.synchronizer;
    let locale = Some(locale.to_string());

    if let Some(images) = collections.images {
        sync.synchronize_product_images(product_id, Some(images))
            .await?;
    }
    if let Some(options) = collections.options {
        sync.synchronize_product_options(product_id, Some(options), locale.clone())
            .await?;
    }
    if let Some(features) = collections.features {
        sync.synchronize_product_features(product_id, Some(features), locale)
            .await?;
    }
    if let Some(categories) = collections.categories {
        sync.synchronize_product_categories(product_id, Some(categories))
            .await?;
    }
    if let Some(collections) = collections.collections {
        sync.synchronize_product_collections(product_id, Some(collections))
            .await?;
    }

    Ok(())
}
