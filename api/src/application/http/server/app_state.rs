use std::sync::Arc;

use quarry_core::{
    domain::{common::entities::app_errors::CoreError, repository::value_objects::RequestParameters},
    entity::products,
    infrastructure::{
        object_storage::minio::MinioObjectStorage,
        product::{ProductRepository, ProductSynchronizer, repositories::product_repository::product_listing},
        repository::ResolvedConfig,
    },
};
use sea_orm::DatabaseConnection;

use crate::args::Args;

#[derive(Clone)]
pub struct AppState {
    pub args: Arc<Args>,
    pub db: DatabaseConnection,
    pub product_listing: Arc<ResolvedConfig<products::Entity>>,
    pub storage: Arc<MinioObjectStorage>,
    pub synchronizer: Arc<ProductSynchronizer<MinioObjectStorage>>,
}

impl AppState {
    pub fn new(
        args: Arc<Args>,
        db: DatabaseConnection,
        storage: MinioObjectStorage,
    ) -> Result<Self, CoreError> {
        let storage = Arc::new(storage);
        let synchronizer = ProductSynchronizer::new(
            db.clone(),
            storage.clone(),
            args.default_locale.clone(),
        );

        Ok(Self {
            product_listing: Arc::new(product_listing()?),
            synchronizer: Arc::new(synchronizer),
            args,
            db,
            storage,
        })
    }

    /// A request-scoped product repository.
    pub fn products(
        &self,
        params: RequestParameters,
        locale: impl Into<String>,
    ) -> ProductRepository<MinioObjectStorage> {
        ProductRepository::new(
            self.db.clone(),
            self.product_listing.clone(),
            params,
            self.storage.clone(),
        )
        .with_locale(locale)
    }

    pub fn root_path(&self) -> &str {
        &self.args.server.root_path
    }
}
