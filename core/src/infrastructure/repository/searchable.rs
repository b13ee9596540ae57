use sea_orm::{
    Condition, QueryFilter,
    sea_query::{Alias, Expr, LikeExpr, Query},
};
use tracing::debug;

use crate::domain::repository::{
    policies::{search_pattern, search_term},
    value_objects::RequestParameters,
};

use super::{
    config::{FieldTarget, ResolvedConfig},
    model::RepositoryModel,
    query_state::QueryState,
};

const ESCAPE: char = '!';

/// ANDs one `OR` group of `LIKE` predicates over the searchable fields.
/// Translated fields match in any locale.
pub fn apply_search<E: RepositoryModel>(
    state: QueryState<E>,
    config: &ResolvedConfig<E>,
    params: &RequestParameters,
) -> QueryState<E> {
    let Some(term) = search_term(params) else {
        return state;
    };
    if config.searchable.is_empty() {
        return state;
    }

    let pattern = search_pattern(&term);
    let table = Alias::new(E::base_table());
    let mut any = Condition::any();

    for field in &config.searchable {
        match &field.target {
            FieldTarget::Column(column) => {
                any = any.add(
                    Expr::col((table.clone(), *column))
                        .like(LikeExpr::new(pattern.as_str()).escape(ESCAPE)),
                );
            }
            FieldTarget::Translation(name) => {
                let Some(translations) = E::translations() else {
                    continue;
                };
                let translation_table = Alias::new(translations.table);
                let exists = Query::select()
                    .expr(Expr::val(1))
                    .from(translation_table.clone())
                    .and_where(
                        Expr::col((
                            translation_table.clone(),
                            Alias::new(translations.foreign_key),
                        ))
                        .equals((table.clone(), E::key_column())),
                    )
                    .and_where(
                        Expr::col((translation_table, Alias::new(name.as_str())))
                            .like(LikeExpr::new(pattern.as_str()).escape(ESCAPE)),
                    )
                    .to_owned();
                any = any.add(Expr::exists(exists));
            }
        }
    }

    debug!(term = %term, fields = config.searchable.len(), "Applying search");
    state.map(|select| select.filter(any))
}
