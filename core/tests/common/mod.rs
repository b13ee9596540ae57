#![allow(dead_code)]

use std::sync::Mutex;

use quarry_core::{
    domain::{
        common::entities::app_errors::CoreError, synchronization::ports::ObjectStoragePort,
    },
    entity::{
        brands, categories, collections, product_images, product_options, product_translations,
        products,
    },
    infrastructure::db::schema::create_schema,
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database, DatabaseConnection};

pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("in-memory sqlite connects");
    create_schema(&db).await.expect("schema is created");
    db
}

pub async fn insert_product(
    db: &DatabaseConnection,
    slug: &str,
    title: &str,
    status: &str,
    price: f64,
) -> products::Model {
    products::ActiveModel {
        slug: Set(slug.to_string()),
        title: Set(title.to_string()),
        sku: Set(None),
        status: Set(status.to_string()),
        price: Set(price),
        brand_id: Set(None),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("product is inserted")
}

pub async fn insert_brand(db: &DatabaseConnection, name: &str) -> brands::Model {
    brands::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("brand is inserted")
}

pub async fn insert_category(db: &DatabaseConnection, name: &str) -> categories::Model {
    categories::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("category is inserted")
}

pub async fn insert_collection(db: &DatabaseConnection, name: &str) -> collections::Model {
    collections::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("collection is inserted")
}

pub async fn translate_product(
    db: &DatabaseConnection,
    product_id: i32,
    locale: &str,
    name: &str,
) -> product_translations::Model {
    product_translations::ActiveModel {
        product_id: Set(product_id),
        locale: Set(locale.to_string()),
        name: Set(name.to_string()),
        description: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("translation is inserted")
}

pub async fn insert_image(
    db: &DatabaseConnection,
    product_id: i32,
    uri: &str,
    priority: i32,
) -> product_images::Model {
    product_images::ActiveModel {
        product_id: Set(product_id),
        uri: Set(uri.to_string()),
        primary: Set(priority == 1),
        secondary: Set(false),
        priority: Set(priority),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("image is inserted")
}

pub async fn insert_option(
    db: &DatabaseConnection,
    product_id: i32,
    priority: i32,
) -> product_options::Model {
    product_options::ActiveModel {
        product_id: Set(product_id),
        required: Set(false),
        priority: Set(priority),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("option is inserted")
}

/// Object storage that records the keys it was asked to delete.
#[derive(Debug, Default)]
pub struct RecordingStorage {
    deleted: Mutex<Vec<String>>,
}

impl RecordingStorage {
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().expect("storage lock").clone()
    }
}

impl ObjectStoragePort for RecordingStorage {
    async fn delete_object(&self, object_key: &str) -> Result<(), CoreError> {
        self.deleted
            .lock()
            .expect("storage lock")
            .push(object_key.to_string());
        Ok(())
    }
}

/// Storage whose deletes always fail, counting the attempts.
#[derive(Default)]
pub struct UnreachableStorage {
    attempts: Mutex<usize>,
}

impl UnreachableStorage {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().expect("storage lock")
    }
}

impl ObjectStoragePort for UnreachableStorage {
    async fn delete_object(&self, object_key: &str) -> Result<(), CoreError> {
        *self.attempts.lock().expect("storage lock") += 1;
        Err(CoreError::ObjectStorageError(format!("{object_key}: connection refused")))
    }
}
