use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Schema};
use tracing::{error, info};

use crate::{domain::common::entities::app_errors::CoreError, entity::prelude::*};

async fn create_table<E: EntityTrait>(
    db: &DatabaseConnection,
    schema: &Schema,
    entity: E,
) -> Result<(), CoreError> {
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();

    db.execute(db.get_database_backend().build(&statement))
        .await
        .map_err(|e| {
            error!("Failed to create table `{}`: {}", entity.table_name(), e);
            CoreError::InternalServerError
        })?;

    Ok(())
}

/// Creates the catalog tables that do not exist yet, parents first.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), CoreError> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Brands).await?;
    create_table(db, &schema, Products).await?;
    create_table(db, &schema, ProductTranslations).await?;
    create_table(db, &schema, ProductImages).await?;
    create_table(db, &schema, ProductOptions).await?;
    create_table(db, &schema, ProductOptionTranslations).await?;
    create_table(db, &schema, OptionValues).await?;
    create_table(db, &schema, OptionValueTranslations).await?;
    create_table(db, &schema, ProductFeatures).await?;
    create_table(db, &schema, FeatureTranslations).await?;
    create_table(db, &schema, FeatureProduct).await?;
    create_table(db, &schema, Categories).await?;
    create_table(db, &schema, CategoryProduct).await?;
    create_table(db, &schema, Collections).await?;
    create_table(db, &schema, CollectionProduct).await?;

    info!("Catalog schema is ready");

    Ok(())
}
