use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter,
};
use serde_json::Value as JsonValue;
use tracing::{error, info};

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        repository::{
            entities::{Entry, Listing, Record},
            ports::ResourceRepository,
            value_objects::{Capabilities, RequestParameters},
        },
        synchronization::ports::ObjectStoragePort,
    },
    entity::{
        product_images::{Column as ProductImageColumn, Entity as ProductImageEntity},
        products::{Column as ProductColumn, Entity as ProductEntity, Model as Product},
    },
    infrastructure::{
        product::synchronizers::remove_objects,
        repository::{Repository, RepositoryConfig, ResolvedConfig},
    },
};

/// Listing declaration shared by every product request.
pub fn product_listing() -> Result<ResolvedConfig<ProductEntity>, CoreError> {
    RepositoryConfig::new(Capabilities::ALL)
        .sort_field("id")
        .sortable(["title", "price", "translations.name"])
        .searchable(["title", "sku", "translations.name"])
        .filter("status")
        .filter(("brand", "brand"))
        .filter(("category", "categories"))
        .filter(("collection", "collections"))
        .with(["translations", "brand", "images", "features"])
        .with_count(["options"])
        .resolve()
}

/// Products are soft deleted through `deleted_at`; a forced delete removes
/// the row first, then the image files from object storage.
pub struct ProductRepository<S: ObjectStoragePort> {
    inner: Repository<ProductEntity>,
    storage: Arc<S>,
}

impl<S: ObjectStoragePort> ProductRepository<S> {
    pub fn new(
        db: DatabaseConnection,
        config: Arc<ResolvedConfig<ProductEntity>>,
        params: RequestParameters,
        storage: Arc<S>,
    ) -> Self {
        Self {
            inner: Repository::new(db, config, params),
            storage,
        }
    }

    pub fn with_locale(self, locale: impl Into<String>) -> Self {
        Self {
            inner: self.inner.with_locale(locale),
            storage: self.storage,
        }
    }

    pub fn inner(&self) -> &Repository<ProductEntity> {
        &self.inner
    }

    fn db(&self) -> &DatabaseConnection {
        &self.inner.db
    }

    /// Resolves a record ignoring the soft delete scope.
    async fn resolve_with_trashed(&self, record: Record<Product>) -> Result<Product, CoreError> {
        let slug = match record {
            Record::Model(model) => return Ok(model),
            Record::RouteKey(slug) => slug,
        };

        ProductEntity::find()
            .filter(sea_orm::ColumnTrait::eq(&ProductColumn::Slug, slug))
            .one(self.db())
            .await
            .map_err(|e| {
                error!("Failed to find product: {}", e);
                CoreError::InternalServerError
            })?
            .ok_or(CoreError::NotFound)
    }
}

impl<S: ObjectStoragePort> ResourceRepository for ProductRepository<S> {
    type Model = Product;

    async fn list(self) -> Result<Listing<Product>, CoreError> {
        self.inner.list().await
    }

    async fn put(&self, data: JsonValue) -> Result<Product, CoreError> {
        self.inner.put(data).await
    }

    async fn show(&self, record: Record<Product>) -> Result<Entry<Product>, CoreError> {
        self.inner.show(record).await
    }

    async fn update(&self, record: Record<Product>, data: JsonValue) -> Result<Product, CoreError> {
        self.inner.update(record, data).await
    }

    async fn destroy(&self, record: Record<Product>) -> Result<(), CoreError> {
        let product = self.inner.resolve(record).await?;
        if product.deleted_at.is_some() {
            return Ok(());
        }

        let slug = product.slug.clone();
        let mut active = product.into_active_model();
        active.deleted_at = Set(Some(Utc::now()));

        active.update(self.db()).await.map_err(|e| {
            error!("Failed to soft delete product: {}", e);
            CoreError::InternalServerError
        })?;

        info!(slug = %slug, "Product moved to trash");

        Ok(())
    }

    async fn force_destroy(&self, record: Record<Product>) -> Result<(), CoreError> {
        let product = self.resolve_with_trashed(record).await?;

        let images = ProductImageEntity::find()
            .filter(ProductImageColumn::ProductId.eq(product.id))
            .all(self.db())
            .await
            .map_err(|e| {
                error!("Failed to list product images: {}", e);
                CoreError::InternalServerError
            })?;

        ProductEntity::delete_by_id(product.id)
            .exec(self.db())
            .await
            .map_err(|e| {
                error!("Failed to delete product: {}", e);
                CoreError::InternalServerError
            })?;

        let uris = images.into_iter().map(|image| image.uri).collect::<Vec<_>>();
        let files = remove_objects(self.storage.as_ref(), &uris).await;

        info!(slug = %product.slug, images = uris.len(), files, "Product deleted");

        Ok(())
    }
}
