use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, IdenStatic,
    IntoActiveModel, Iterable, PrimaryKeyToColumn, QueryFilter, Select,
};
use serde_json::Value as JsonValue;
use tracing::{debug, error};

use crate::domain::{
    common::entities::app_errors::CoreError,
    repository::{
        entities::{Entry, Listing, Record},
        policies::should_paginate,
        ports::ResourceRepository,
        value_objects::{Capabilities, RequestParameters},
    },
};

use super::{
    coerce::{coerce_attribute, coerce_param, column_named},
    config::ResolvedConfig,
    eager,
    filterable::apply_filters,
    model::RepositoryModel,
    paginable::{fetch_all, paginate},
    query_state::QueryState,
    searchable::apply_search,
    sortable::apply_sort,
};

pub const DEFAULT_LOCALE: &str = "en";

/// A request-scoped repository over `E`.
///
/// The base query carries the model's global scopes, minus the ones the
/// configuration excludes. `list` consumes the repository.
#[derive(Debug, Clone)]
pub struct Repository<E: RepositoryModel> {
    pub db: DatabaseConnection,
    config: Arc<ResolvedConfig<E>>,
    params: RequestParameters,
    locale: String,
    state: QueryState<E>,
}

impl<E: RepositoryModel> Repository<E> {
    pub fn new(
        db: DatabaseConnection,
        config: Arc<ResolvedConfig<E>>,
        params: RequestParameters,
    ) -> Self {
        let select = E::global_scopes()
            .into_iter()
            .filter(|scope| !config.without_global_scopes.excludes(scope.name()))
            .fold(E::find(), |select, scope| scope.apply(select));

        Self {
            db,
            config,
            params,
            locale: DEFAULT_LOCALE.to_string(),
            state: QueryState::new(select),
        }
    }

    /// Locale used to join translations when sorting.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn params(&self) -> &RequestParameters {
        &self.params
    }

    pub fn config(&self) -> &ResolvedConfig<E> {
        &self.config
    }

    pub fn query(&self) -> &Select<E> {
        &self.state.select
    }

    /// Hands the underlying query to `f` and keeps what it returns.
    pub fn forward(mut self, f: impl FnOnce(Select<E>) -> Select<E>) -> Self {
        self.state = self.state.map(f);
        self
    }

    /// Runs every listing stage except the terminal fetch.
    pub fn prepare(self) -> Result<QueryState<E>, CoreError> {
        let config = self.config.as_ref();
        let params = &self.params;

        let mut state = config
            .global_scopes
            .iter()
            .fold(self.state, |state, scope| state.map(|select| scope.apply(select)));

        if config.capabilities.contains(Capabilities::SORT) {
            state = apply_sort(state, config, params, &self.locale);
        }

        if config.capabilities.contains(Capabilities::SEARCH) {
            state = apply_search(state, config, params);
        }

        if config.capabilities.contains(Capabilities::FILTER) {
            state = apply_filters(state, config, params)?;
        }

        state = config
            .scopes
            .iter()
            .fold(state, |state, scope| state.map(|select| scope.apply(select)));

        state.with = config.with.clone();
        state.with_count = config.with_count.clone();

        Ok(state)
    }

    /// Resolves a route key against the base query.
    pub async fn resolve(&self, record: Record<E::Model>) -> Result<E::Model, CoreError> {
        let key = match record {
            Record::Model(model) => return Ok(model),
            Record::RouteKey(key) => key,
        };

        let column = E::route_key();
        let Ok(value) = coerce_param(column, "route_key", &key) else {
            return Err(CoreError::NotFound);
        };

        self.state
            .select
            .clone()
            .filter(column.eq(value))
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to find record by route key: {}", e);
                CoreError::InternalServerError
            })?
            .ok_or(CoreError::NotFound)
    }
}

/// Copies the attributes of a JSON object onto an active model.
fn assign<E, A>(active: &mut A, data: &JsonValue) -> Result<usize, CoreError>
where
    E: RepositoryModel,
    A: ActiveModelTrait<Entity = E>,
{
    let JsonValue::Object(attributes) = data else {
        return Err(CoreError::DataShape(
            "attributes must be a JSON object".to_string(),
        ));
    };

    let values = attributes
        .iter()
        .map(|(key, value)| {
            let column = column_named::<E::Column>(key)
                .ok_or_else(|| CoreError::UnknownAttribute(key.clone()))?;
            Ok((column, coerce_attribute(column, key, value)?))
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    let assigned = values.len();
    for (column, value) in values {
        active.set(column, value);
    }

    Ok(assigned)
}

/// Updates may not rewrite the primary key; the row is chosen by route key.
fn reject_primary_key<E: RepositoryModel>(data: &JsonValue) -> Result<(), CoreError> {
    let JsonValue::Object(attributes) = data else {
        return Ok(());
    };

    match attributes
        .keys()
        .find(|key| E::PrimaryKey::iter().any(|pk| pk.into_column().as_str() == key.as_str()))
    {
        Some(key) => Err(CoreError::UnknownAttribute(key.clone())),
        None => Ok(()),
    }
}

impl<E> ResourceRepository for Repository<E>
where
    E: RepositoryModel,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelBehavior + ActiveModelTrait<Entity = E> + Send + Sync,
{
    type Model = E::Model;

    async fn list(self) -> Result<Listing<E::Model>, CoreError> {
        let db = self.db.clone();
        let config = Arc::clone(&self.config);
        let params = self.params.clone();

        let state = self.prepare()?;
        let with = state.with.clone();
        let with_count = state.with_count.clone();

        if should_paginate(config.capabilities, config.force_pagination, &params) {
            let mut page = paginate(&db, state, &config, &params).await?;
            debug!(
                rows = page.data.len(),
                page = page.current_page,
                "Listed paginated records"
            );

            let models = std::mem::take(&mut page.data);
            let entries = eager::load::<E>(&db, models, &with, &with_count).await?;
            return Ok(Listing::Paginated(page.with_data(entries)));
        }

        let models = fetch_all(&db, state).await?;
        debug!(rows = models.len(), "Listed records");

        let entries = eager::load::<E>(&db, models, &with, &with_count).await?;
        Ok(Listing::Collection(entries))
    }

    async fn put(&self, data: JsonValue) -> Result<E::Model, CoreError> {
        let mut active = E::ActiveModel::new();
        assign::<E, _>(&mut active, &data)?;

        active.insert(&self.db).await.map_err(|e| {
            error!("Failed to create record: {}", e);
            CoreError::InternalServerError
        })
    }

    async fn show(&self, record: Record<E::Model>) -> Result<Entry<E::Model>, CoreError> {
        let model = self.resolve(record).await?;

        eager::load::<E>(
            &self.db,
            vec![model],
            &self.config.with,
            &self.config.with_count,
        )
        .await?
        .pop()
        .ok_or(CoreError::NotFound)
    }

    async fn update(&self, record: Record<E::Model>, data: JsonValue) -> Result<E::Model, CoreError> {
        reject_primary_key::<E>(&data)?;

        let model = self.resolve(record).await?;
        let mut active: E::ActiveModel = model.clone().into_active_model();

        if assign::<E, _>(&mut active, &data)? == 0 {
            return Ok(model);
        }

        active.update(&self.db).await.map_err(|e| {
            error!("Failed to update record: {}", e);
            CoreError::InternalServerError
        })
    }
}
