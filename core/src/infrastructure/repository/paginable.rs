use sea_orm::{
    DatabaseConnection, EntityTrait, ItemsAndPagesNumber, PaginatorTrait, QuerySelect,
};
use tracing::{debug, error};

use crate::domain::{
    common::entities::app_errors::CoreError,
    repository::{
        entities::Page,
        policies::{PAGE, resolve_page, resolve_per_page},
        value_objects::{PaginationMode, RequestParameters},
    },
};

use super::{config::ResolvedConfig, model::RepositoryModel, query_state::QueryState};

/// Fetches one page of the query.
pub async fn paginate<E: RepositoryModel>(
    db: &DatabaseConnection,
    state: QueryState<E>,
    config: &ResolvedConfig<E>,
    params: &RequestParameters,
) -> Result<Page<E::Model>, CoreError>
where
    E::Model: Sync,
{
    let per_page = resolve_per_page(params, config.records_per_page);
    let page = resolve_page(params, per_page);
    let query = params.query_pairs(&[PAGE]);

    debug!(page, per_page, mode = ?config.pagination_mode, "Paginating");

    match config.pagination_mode {
        PaginationMode::Full => {
            let paginator = state.select.paginate(db, per_page);

            let ItemsAndPagesNumber {
                number_of_items,
                number_of_pages,
            } = paginator.num_items_and_pages().await.map_err(|e| {
                error!("Failed to count records: {}", e);
                CoreError::InternalServerError
            })?;

            let models = paginator.fetch_page(page - 1).await.map_err(|e| {
                error!("Failed to fetch page: {}", e);
                CoreError::InternalServerError
            })?;

            Ok(Page::new(
                models,
                page,
                per_page,
                Some(number_of_items),
                page < number_of_pages,
                query,
            ))
        }
        PaginationMode::Simple => {
            let mut models = state
                .select
                .offset((page - 1).saturating_mul(per_page))
                .limit(per_page.saturating_add(1))
                .all(db)
                .await
                .map_err(|e| {
                    error!("Failed to fetch page: {}", e);
                    CoreError::InternalServerError
                })?;

            let has_more_pages = models.len() as u64 > per_page;
            models.truncate(per_page as usize);

            Ok(Page::new(models, page, per_page, None, has_more_pages, query))
        }
    }
}

/// Fetches every row of the query.
pub async fn fetch_all<E: EntityTrait>(
    db: &DatabaseConnection,
    state: QueryState<E>,
) -> Result<Vec<E::Model>, CoreError> {
    state.select.all(db).await.map_err(|e| {
        error!("Failed to fetch records: {}", e);
        CoreError::InternalServerError
    })
}
