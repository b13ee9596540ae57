use sea_orm::{
    EntityTrait, Order, QueryOrder, QueryTrait,
    sea_query::{Alias, Expr, JoinType, SimpleExpr},
};
use tracing::debug;

use crate::domain::repository::{
    policies::{resolve_sort_direction, resolve_sort_field},
    value_objects::{RequestParameters, SortDirection},
};

use super::{
    config::{FieldTarget, ResolvedConfig},
    model::RepositoryModel,
    query_state::QueryState,
};

pub const SORT_TRANSLATIONS_ALIAS: &str = "sort_translations";

/// Adds at most one ordering clause.
pub fn apply_sort<E: RepositoryModel>(
    mut state: QueryState<E>,
    config: &ResolvedConfig<E>,
    params: &RequestParameters,
    locale: &str,
) -> QueryState<E> {
    let Some(path) = resolve_sort_field(params, &config.sortable, config.sort_field.as_deref())
    else {
        return state;
    };
    let Some(target) = config.sort_targets.get(path) else {
        return state;
    };

    let order = match resolve_sort_direction(params, config.sort_type) {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    };
    debug!(field = %path, order = ?order, "Applying sort");

    match target {
        FieldTarget::Column(column) => {
            state.select = state.select.order_by(*column, order);
        }
        FieldTarget::Translation(field) => {
            let Some(translations) = E::translations() else {
                return state;
            };
            let alias = Alias::new(SORT_TRANSLATIONS_ALIAS);

            QueryTrait::query(&mut state.select).join_as(
                JoinType::LeftJoin,
                Alias::new(translations.table),
                alias.clone(),
                Expr::col((alias.clone(), Alias::new(translations.foreign_key)))
                    .equals((Alias::new(E::base_table()), E::key_column()))
                    .and(
                        Expr::col((alias.clone(), Alias::new(translations.locale_column)))
                            .eq(locale),
                    ),
            );

            let expr: SimpleExpr = Expr::col((alias, Alias::new(field.as_str()))).into();
            state.select = state.select.order_by(expr, order);
        }
    }

    state
}
