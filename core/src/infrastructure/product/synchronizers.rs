use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, DbErr, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    QuerySelect, Select, TransactionTrait,
    sea_query::{Alias, Expr, Query, SimpleExpr},
};
use serde_json::Value as JsonValue;
use tracing::{debug, error, instrument, warn};

use crate::{
    domain::{
        common::entities::app_errors::CoreError,
        repository::value_objects::RelationKind,
        synchronization::{
            ports::{ObjectStoragePort, ProductSynchronization},
            value_objects::{
                ChoicePayload, FeaturePayload, ImagePayload, OptionPayload, RelatedRef,
                parse_items,
            },
        },
    },
    entity::{
        feature_product, feature_translations, option_value_translations, option_values,
        product_features, product_images, product_option_translations, product_options, products,
    },
    infrastructure::repository::RepositoryModel,
};

fn db_error(action: &'static str) -> impl FnOnce(DbErr) -> CoreError {
    move |e| {
        error!("Failed to {}: {}", action, e);
        CoreError::InternalServerError
    }
}

/// Removes files whose rows are already gone. A failed delete leaves an
/// orphaned file, never a row without its file.
pub(crate) async fn remove_objects<S: ObjectStoragePort>(
    storage: &S,
    uris: &[String],
) -> usize {
    let mut removed = 0;
    for uri in uris {
        match storage.delete_object(uri).await {
            Ok(()) => removed += 1,
            Err(e) => warn!(uri = %uri, error = ?e, "Failed to delete stored object"),
        }
    }
    removed
}

/// 1-based position of a payload item.
fn position(index: usize) -> i32 {
    i32::try_from(index + 1).unwrap_or(i32::MAX)
}

/// Loads the parent row, locking it for the rest of the transaction where
/// the backend supports row locks.
async fn lock_parent<E: EntityTrait>(
    txn: &DatabaseTransaction,
    select: Select<E>,
) -> Result<E::Model, CoreError> {
    let select = match txn.get_database_backend() {
        DbBackend::Sqlite => select,
        _ => select.lock_exclusive(),
    };

    select
        .one(txn)
        .await
        .map_err(db_error("lock parent row"))?
        .ok_or(CoreError::NotFound)
}

/// Reconciles the choices of one option inside an open transaction.
async fn reconcile_choices(
    txn: &DatabaseTransaction,
    option_id: i32,
    choices: Vec<ChoicePayload>,
    locale: &str,
) -> Result<(), CoreError> {
    let existing = option_values::Entity::find()
        .filter(option_values::Column::OptionId.eq(option_id))
        .all(txn)
        .await
        .map_err(db_error("load option values"))?;

    let labels = option_value_translations::Entity::find()
        .filter(
            option_value_translations::Column::OptionValueId
                .is_in(existing.iter().map(|row| row.id)),
        )
        .filter(option_value_translations::Column::Locale.eq(locale))
        .all(txn)
        .await
        .map_err(db_error("load option value translations"))?;

    let mut keep = Vec::with_capacity(choices.len());

    for (index, choice) in choices.into_iter().enumerate() {
        let priority = position(index);

        let found = choice
            .id
            .and_then(|id| existing.iter().find(|row| row.id == id))
            .or_else(|| {
                labels
                    .iter()
                    .find(|label| label.value == choice.value && !keep.contains(&label.option_value_id))
                    .and_then(|label| existing.iter().find(|row| row.id == label.option_value_id))
            });

        let choice_id = match found {
            Some(row) => {
                if row.fee != choice.fee || row.priority != priority {
                    let mut active = row.clone().into_active_model();
                    active.fee = Set(choice.fee);
                    active.priority = Set(priority);
                    active.update(txn).await.map_err(db_error("update option value"))?;
                }
                row.id
            }
            None => {
                option_values::ActiveModel {
                    option_id: Set(option_id),
                    fee: Set(choice.fee),
                    priority: Set(priority),
                    ..Default::default()
                }
                .insert(txn)
                .await
                .map_err(db_error("create option value"))?
                .id
            }
        };

        match labels.iter().find(|label| label.option_value_id == choice_id) {
            Some(label) if label.value == choice.value => {}
            Some(label) => {
                let mut active = label.clone().into_active_model();
                active.value = Set(choice.value);
                active
                    .update(txn)
                    .await
                    .map_err(db_error("update option value translation"))?;
            }
            None => {
                option_value_translations::ActiveModel {
                    option_value_id: Set(choice_id),
                    locale: Set(locale.to_string()),
                    value: Set(choice.value),
                    ..Default::default()
                }
                .insert(txn)
                .await
                .map_err(db_error("create option value translation"))?;
            }
        }

        keep.push(choice_id);
    }

    let removed = option_values::Entity::delete_many()
        .filter(option_values::Column::OptionId.eq(option_id))
        .filter(option_values::Column::Id.is_not_in(keep.clone()))
        .exec(txn)
        .await
        .map_err(db_error("delete option values"))?;

    debug!(
        option_id,
        kept = keep.len(),
        removed = removed.rows_affected,
        "Reconciled option choices"
    );

    Ok(())
}

/// Makes the pivot rows of a belongs-to-many relation of a product match
/// `ids` exactly.
async fn sync_pivot(
    txn: &DatabaseTransaction,
    relation: &str,
    product_id: i32,
    ids: Vec<i32>,
) -> Result<(), CoreError> {
    let Some(RelationKind::BelongsToMany {
        pivot_table,
        foreign_pivot_key,
        related_pivot_key,
        ..
    }) = products::Entity::relation(relation)
    else {
        return Err(CoreError::UnsupportedRelationKind {
            relation: relation.to_string(),
            context: "pivot synchronization",
        });
    };

    let mut wanted = Vec::with_capacity(ids.len());
    for id in ids {
        if !wanted.contains(&id) {
            wanted.push(id);
        }
    }

    let backend = txn.get_database_backend();
    let pivot = Alias::new(pivot_table);
    let owner = Alias::new(foreign_pivot_key);
    let related = Alias::new(related_pivot_key);

    let current = Query::select()
        .column(related.clone())
        .from(pivot.clone())
        .and_where(Expr::col(owner.clone()).eq(product_id))
        .to_owned();
    let attached = txn
        .query_all(backend.build(&current))
        .await
        .map_err(db_error("load pivot rows"))?
        .iter()
        .filter_map(|row| row.try_get::<i32>("", related_pivot_key).ok())
        .collect::<Vec<i32>>();

    let detach = Query::delete()
        .from_table(pivot.clone())
        .and_where(Expr::col(owner.clone()).eq(product_id))
        .and_where(Expr::col(related.clone()).is_not_in(wanted.clone()))
        .to_owned();
    txn.execute(backend.build(&detach))
        .await
        .map_err(db_error("detach pivot rows"))?;

    let missing = wanted
        .iter()
        .copied()
        .filter(|id| !attached.contains(id))
        .collect::<Vec<i32>>();

    if !missing.is_empty() {
        let mut attach = Query::insert();
        attach.into_table(pivot).columns([owner, related]);
        for id in &missing {
            attach
                .values([SimpleExpr::from(product_id), SimpleExpr::from(*id)])
                .map_err(|e| {
                    error!("Failed to build pivot insert: {}", e);
                    CoreError::InternalServerError
                })?;
        }
        txn.execute(backend.build(&attach))
            .await
            .map_err(db_error("attach pivot rows"))?;
    }

    debug!(
        relation,
        product_id,
        attached = missing.len(),
        total = wanted.len(),
        "Synchronized pivot"
    );

    Ok(())
}

/// Reconciles nested product collections, one transaction per call.
pub struct ProductSynchronizer<S: ObjectStoragePort> {
    db: DatabaseConnection,
    storage: Arc<S>,
    default_locale: String,
}

impl<S: ObjectStoragePort> ProductSynchronizer<S> {
    pub fn new(db: DatabaseConnection, storage: Arc<S>, default_locale: impl Into<String>) -> Self {
        Self {
            db,
            storage,
            default_locale: default_locale.into(),
        }
    }

    fn locale(&self, locale: Option<String>) -> String {
        locale
            .filter(|locale| !locale.is_empty())
            .unwrap_or_else(|| self.default_locale.clone())
    }

    async fn begin(&self) -> Result<DatabaseTransaction, CoreError> {
        self.db.begin().await.map_err(db_error("begin transaction"))
    }

    async fn commit(txn: DatabaseTransaction) -> Result<(), CoreError> {
        txn.commit().await.map_err(db_error("commit transaction"))
    }

    fn related_ids(kind: &str, payload: Option<Vec<JsonValue>>) -> Result<Vec<i32>, CoreError> {
        Ok(parse_items::<RelatedRef>(kind, payload)?
            .into_iter()
            .map(|item| item.id)
            .collect())
    }
}

impl<S: ObjectStoragePort> ProductSynchronization for ProductSynchronizer<S> {
    #[instrument(skip(self, images))]
    async fn synchronize_product_images(
        &self,
        product_id: i32,
        images: Option<Vec<JsonValue>>,
    ) -> Result<(), CoreError> {
        let images = parse_items::<ImagePayload>("images", images)?;

        let txn = self.begin().await?;
        lock_parent(&txn, products::Entity::find_by_id(product_id)).await?;

        let existing = product_images::Entity::find()
            .filter(product_images::Column::ProductId.eq(product_id))
            .all(&txn)
            .await
            .map_err(db_error("load product images"))?;

        let mut keep = Vec::with_capacity(images.len());

        for (index, image) in images.into_iter().enumerate() {
            let priority = position(index);

            let found = image
                .id
                .and_then(|id| existing.iter().find(|row| row.id == id))
                .or_else(|| {
                    existing
                        .iter()
                        .find(|row| row.uri == image.uri && !keep.contains(&row.id))
                });

            let image_id = match found {
                Some(row) => {
                    if row.uri != image.uri
                        || row.primary != image.primary
                        || row.secondary != image.secondary
                        || row.priority != priority
                    {
                        let mut active = row.clone().into_active_model();
                        active.uri = Set(image.uri);
                        active.primary = Set(image.primary);
                        active.secondary = Set(image.secondary);
                        active.priority = Set(priority);
                        active
                            .update(&txn)
                            .await
                            .map_err(db_error("update product image"))?;
                    }
                    row.id
                }
                None => {
                    product_images::ActiveModel {
                        product_id: Set(product_id),
                        uri: Set(image.uri),
                        primary: Set(image.primary),
                        secondary: Set(image.secondary),
                        priority: Set(priority),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await
                    .map_err(db_error("create product image"))?
                    .id
                }
            };

            keep.push(image_id);
        }

        let stale = existing
            .into_iter()
            .filter(|row| !keep.contains(&row.id))
            .collect::<Vec<_>>();

        for image in &stale {
            product_images::Entity::delete_by_id(image.id)
                .exec(&txn)
                .await
                .map_err(db_error("delete product image"))?;
        }

        Self::commit(txn).await?;

        let uris = stale.into_iter().map(|image| image.uri).collect::<Vec<_>>();
        let files = remove_objects(self.storage.as_ref(), &uris).await;

        debug!(
            kept = keep.len(),
            removed = uris.len(),
            files,
            "Synchronized product images"
        );

        Ok(())
    }

    #[instrument(skip(self, options))]
    async fn synchronize_product_options(
        &self,
        product_id: i32,
        options: Option<Vec<JsonValue>>,
        locale: Option<String>,
    ) -> Result<(), CoreError> {
        let locale = self.locale(locale);
        let options = parse_items::<OptionPayload>("options", options)?;
        let choices = options
            .iter()
            .enumerate()
            .map(|(index, option)| {
                parse_items::<ChoicePayload>(&format!("options[{index}].values"), option.values.clone())
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        let txn = self.begin().await?;
        lock_parent(&txn, products::Entity::find_by_id(product_id)).await?;

        let existing = product_options::Entity::find()
            .filter(product_options::Column::ProductId.eq(product_id))
            .all(&txn)
            .await
            .map_err(db_error("load product options"))?;

        let names = product_option_translations::Entity::find()
            .filter(
                product_option_translations::Column::OptionId
                    .is_in(existing.iter().map(|row| row.id)),
            )
            .filter(product_option_translations::Column::Locale.eq(locale.as_str()))
            .all(&txn)
            .await
            .map_err(db_error("load product option translations"))?;

        let mut keep = Vec::with_capacity(options.len());

        for (index, (option, values)) in options.into_iter().zip(choices).enumerate() {
            let priority = position(index);

            let found = option
                .id
                .and_then(|id| existing.iter().find(|row| row.id == id))
                .or_else(|| {
                    names
                        .iter()
                        .find(|name| name.name == option.name && !keep.contains(&name.option_id))
                        .and_then(|name| existing.iter().find(|row| row.id == name.option_id))
                });

            let option_id = match found {
                Some(row) => {
                    if row.required != option.required || row.priority != priority {
                        let mut active = row.clone().into_active_model();
                        active.required = Set(option.required);
                        active.priority = Set(priority);
                        active
                            .update(&txn)
                            .await
                            .map_err(db_error("update product option"))?;
                    }
                    row.id
                }
                None => {
                    product_options::ActiveModel {
                        product_id: Set(product_id),
                        required: Set(option.required),
                        priority: Set(priority),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await
                    .map_err(db_error("create product option"))?
                    .id
                }
            };

            match names.iter().find(|name| name.option_id == option_id) {
                Some(name) if name.name == option.name => {}
                Some(name) => {
                    let mut active = name.clone().into_active_model();
                    active.name = Set(option.name);
                    active
                        .update(&txn)
                        .await
                        .map_err(db_error("update product option translation"))?;
                }
                None => {
                    product_option_translations::ActiveModel {
                        option_id: Set(option_id),
                        locale: Set(locale.clone()),
                        name: Set(option.name),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await
                    .map_err(db_error("create product option translation"))?;
                }
            }

            reconcile_choices(&txn, option_id, values, &locale).await?;
            keep.push(option_id);
        }

        let removed = product_options::Entity::delete_many()
            .filter(product_options::Column::ProductId.eq(product_id))
            .filter(product_options::Column::Id.is_not_in(keep.clone()))
            .exec(&txn)
            .await
            .map_err(db_error("delete product options"))?;

        Self::commit(txn).await?;

        debug!(
            kept = keep.len(),
            removed = removed.rows_affected,
            "Synchronized product options"
        );

        Ok(())
    }

    #[instrument(skip(self, choices))]
    async fn synchronize_option_choices(
        &self,
        option_id: i32,
        choices: Option<Vec<JsonValue>>,
        locale: Option<String>,
    ) -> Result<(), CoreError> {
        let locale = self.locale(locale);
        let choices = parse_items::<ChoicePayload>("values", choices)?;

        let txn = self.begin().await?;
        lock_parent(&txn, product_options::Entity::find_by_id(option_id)).await?;

        reconcile_choices(&txn, option_id, choices, &locale).await?;

        Self::commit(txn).await
    }

    #[instrument(skip(self, features))]
    async fn synchronize_product_features(
        &self,
        product_id: i32,
        features: Option<Vec<JsonValue>>,
        locale: Option<String>,
    ) -> Result<(), CoreError> {
        let locale = self.locale(locale);
        let features = parse_items::<FeaturePayload>("features", features)?;

        let txn = self.begin().await?;
        lock_parent(&txn, products::Entity::find_by_id(product_id)).await?;

        let mut wanted: Vec<(i32, Option<String>)> = Vec::with_capacity(features.len());

        for (index, feature) in features.into_iter().enumerate() {
            let priority = position(index);

            let named = feature_translations::Entity::find()
                .filter(feature_translations::Column::Name.eq(feature.name.as_str()))
                .order_by_asc(feature_translations::Column::Id)
                .one(&txn)
                .await
                .map_err(db_error("find feature by name"))?;

            let existing = match named {
                Some(translation) => product_features::Entity::find_by_id(translation.feature_id)
                    .one(&txn)
                    .await
                    .map_err(db_error("load product feature"))?,
                None => None,
            };

            let feature_id = match existing {
                Some(row) => {
                    if row.priority != priority || row.icon != feature.icon {
                        let id = row.id;
                        let mut active = row.into_active_model();
                        active.priority = Set(priority);
                        active.icon = Set(feature.icon.clone());
                        active
                            .update(&txn)
                            .await
                            .map_err(db_error("update product feature"))?;
                        id
                    } else {
                        row.id
                    }
                }
                None => {
                    product_features::ActiveModel {
                        icon: Set(feature.icon.clone()),
                        priority: Set(priority),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await
                    .map_err(db_error("create product feature"))?
                    .id
                }
            };

            let translation = feature_translations::Entity::find()
                .filter(feature_translations::Column::FeatureId.eq(feature_id))
                .filter(feature_translations::Column::Locale.eq(locale.as_str()))
                .one(&txn)
                .await
                .map_err(db_error("load feature translation"))?;

            match translation {
                Some(translation) if translation.name == feature.name => {}
                Some(translation) => {
                    let mut active = translation.into_active_model();
                    active.name = Set(feature.name);
                    active
                        .update(&txn)
                        .await
                        .map_err(db_error("update feature translation"))?;
                }
                None => {
                    feature_translations::ActiveModel {
                        feature_id: Set(feature_id),
                        locale: Set(locale.clone()),
                        name: Set(feature.name),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await
                    .map_err(db_error("create feature translation"))?;
                }
            }

            wanted.retain(|(id, _)| *id != feature_id);
            wanted.push((feature_id, feature.value));
        }

        let attached = feature_product::Entity::find()
            .filter(feature_product::Column::ProductId.eq(product_id))
            .all(&txn)
            .await
            .map_err(db_error("load feature pivot"))?;

        for (feature_id, value) in &wanted {
            match attached.iter().find(|pivot| pivot.feature_id == *feature_id) {
                Some(pivot) if pivot.value == *value => {}
                Some(pivot) => {
                    let mut active = pivot.clone().into_active_model();
                    active.value = Set(value.clone());
                    active
                        .update(&txn)
                        .await
                        .map_err(db_error("update feature pivot"))?;
                }
                None => {
                    feature_product::Entity::insert(feature_product::ActiveModel {
                        product_id: Set(product_id),
                        feature_id: Set(*feature_id),
                        value: Set(value.clone()),
                    })
                    .exec_without_returning(&txn)
                    .await
                    .map_err(db_error("attach feature"))?;
                }
            }
        }

        feature_product::Entity::delete_many()
            .filter(feature_product::Column::ProductId.eq(product_id))
            .filter(
                feature_product::Column::FeatureId.is_not_in(wanted.iter().map(|(id, _)| *id)),
            )
            .exec(&txn)
            .await
            .map_err(db_error("detach features"))?;

        Self::commit(txn).await?;

        debug!(features = wanted.len(), "Synchronized product features");

        Ok(())
    }

    #[instrument(skip(self, categories))]
    async fn synchronize_product_categories(
        &self,
        product_id: i32,
        categories: Option<Vec<JsonValue>>,
    ) -> Result<(), CoreError> {
        let ids = Self::related_ids("categories", categories)?;

        let txn = self.begin().await?;
        lock_parent(&txn, products::Entity::find_by_id(product_id)).await?;
        sync_pivot(&txn, "categories", product_id, ids).await?;

        Self::commit(txn).await
    }

    #[instrument(skip(self, collections))]
    async fn synchronize_product_collections(
        &self,
        product_id: i32,
        collections: Option<Vec<JsonValue>>,
    ) -> Result<(), CoreError> {
        let ids = Self::related_ids("collections", collections)?;

        let txn = self.begin().await?;
        lock_parent(&txn, products::Entity::find_by_id(product_id)).await?;
        sync_pivot(&txn, "collections", product_id, ids).await?;

        Self::commit(txn).await
    }
}
