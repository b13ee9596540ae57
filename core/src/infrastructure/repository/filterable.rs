use sea_orm::{
    QueryFilter, Value,
    sea_query::{Alias, Expr, Query, SimpleExpr},
};
use tracing::debug;

use crate::domain::{
    common::entities::app_errors::CoreError,
    repository::value_objects::{ParamValue, RequestParameters},
};

use super::{
    coerce::{coerce_param, loose_value},
    config::{FilterTarget, ResolvedConfig},
    model::RepositoryModel,
    query_state::QueryState,
};

/// `expr = v` for a scalar, `expr IN (...)` for a list.
fn membership(expr: Expr, mut values: Vec<Value>, is_list: bool) -> SimpleExpr {
    if !is_list
        && values.len() == 1
        && let Some(value) = values.pop()
    {
        return expr.eq(value);
    }
    expr.is_in(values)
}

/// Applies every declared filter whose request key is present.
pub fn apply_filters<E: RepositoryModel>(
    mut state: QueryState<E>,
    config: &ResolvedConfig<E>,
    params: &RequestParameters,
) -> Result<QueryState<E>, CoreError> {
    let table = Alias::new(E::base_table());

    for filter in &config.filters {
        let Some(value) = params.get(&filter.request_key) else {
            continue;
        };
        let raw = value.values();
        if raw.is_empty() {
            continue;
        }
        let is_list = matches!(value, ParamValue::List(_));

        debug!(key = %filter.request_key, values = ?raw, "Applying filter");

        let condition = match &filter.target {
            FilterTarget::Column(column) => {
                let values = raw
                    .iter()
                    .map(|item| coerce_param(*column, &filter.request_key, item))
                    .collect::<Result<Vec<Value>, CoreError>>()?;

                membership(Expr::col((table.clone(), *column)), values, is_list)
            }
            FilterTarget::Pivot {
                pivot_table,
                foreign_pivot_key,
                related_pivot_key,
            } => {
                let values = raw.iter().map(|item| loose_value(item)).collect();
                let members = Query::select()
                    .column(Alias::new(*foreign_pivot_key))
                    .from(Alias::new(*pivot_table))
                    .and_where(membership(
                        Expr::col(Alias::new(*related_pivot_key)),
                        values,
                        is_list,
                    ))
                    .to_owned();

                Expr::col((table.clone(), E::key_column())).in_subquery(members)
            }
        };

        state.select = state.select.filter(condition);
    }

    Ok(state)
}
