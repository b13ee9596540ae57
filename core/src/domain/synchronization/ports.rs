use std::future::Future;

use serde_json::Value as JsonValue;

use crate::domain::common::entities::app_errors::CoreError;

/// Port for object storage operations (MinIO/S3)
#[cfg_attr(test, mockall::automock)]
pub trait ObjectStoragePort: Send + Sync {
    /// Delete an object from the configured bucket
    fn delete_object(&self, object_key: &str) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Reconciles the nested collections of a product against desired-state
/// payloads. A `None` or empty payload clears the collection. Every call runs
/// in its own transaction.
#[cfg_attr(test, mockall::automock)]
pub trait ProductSynchronization: Send + Sync {
    fn synchronize_product_images(
        &self,
        product_id: i32,
        images: Option<Vec<JsonValue>>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn synchronize_product_options(
        &self,
        product_id: i32,
        options: Option<Vec<JsonValue>>,
        locale: Option<String>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn synchronize_option_choices(
        &self,
        option_id: i32,
        choices: Option<Vec<JsonValue>>,
        locale: Option<String>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn synchronize_product_features(
        &self,
        product_id: i32,
        features: Option<Vec<JsonValue>>,
        locale: Option<String>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn synchronize_product_categories(
        &self,
        product_id: i32,
        categories: Option<Vec<JsonValue>>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn synchronize_product_collections(
        &self,
        product_id: i32,
        collections: Option<Vec<JsonValue>>,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;
}
