//! Loads queued relations and relation counts for already fetched rows.
//!
//! Related rows come back as JSON objects keyed by column name, grouped
//! under each owner by comparing key values in their textual form.

use std::collections::{BTreeMap, HashSet};

use sea_orm::{
    ConnectionTrait, DatabaseConnection, FromQueryResult, ModelTrait, Value,
    sea_query::{Alias, Asterisk, Expr, Func, Query, SelectStatement},
};
use serde_json::Value as JsonValue;
use tracing::{debug, error};

use crate::domain::{
    common::entities::app_errors::CoreError,
    repository::{entities::Entry, value_objects::RelationKind},
};

use super::{config::ResolvedRelation, model::RepositoryModel};

const OWNER: &str = "owner";
const AGGREGATE: &str = "aggregate";
const PIVOT: &str = "pivot";

fn value_key(value: &Value) -> Option<String> {
    match value {
        Value::TinyInt(Some(v)) => Some(v.to_string()),
        Value::SmallInt(Some(v)) => Some(v.to_string()),
        Value::Int(Some(v)) => Some(v.to_string()),
        Value::BigInt(Some(v)) => Some(v.to_string()),
        Value::TinyUnsigned(Some(v)) => Some(v.to_string()),
        Value::SmallUnsigned(Some(v)) => Some(v.to_string()),
        Value::Unsigned(Some(v)) => Some(v.to_string()),
        Value::BigUnsigned(Some(v)) => Some(v.to_string()),
        Value::String(Some(v)) => Some(v.to_string()),
        Value::Uuid(Some(v)) => Some(v.to_string()),
        _ => None,
    }
}

fn json_key(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn json_to_value(value: &JsonValue) -> Option<Value> {
    match value {
        JsonValue::Number(n) => n.as_i64().map(Value::from),
        JsonValue::String(s) => Some(Value::from(s.clone())),
        _ => None,
    }
}

/// Distinct non-null values of `column` across the entries.
fn local_keys<E: RepositoryModel>(entries: &[Entry<E::Model>], column: E::Column) -> Vec<Value> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|entry| entry.model.get(column))
        .filter(|value| value_key(value).is_some_and(|key| seen.insert(key)))
        .collect()
}

fn rows_where(table: &str, column: &str, keys: Vec<Value>) -> SelectStatement {
    Query::select()
        .column(Asterisk)
        .from(Alias::new(table))
        .and_where(Expr::col(Alias::new(column)).is_in(keys))
        .to_owned()
}

async fn fetch_json(
    db: &DatabaseConnection,
    statement: &SelectStatement,
) -> Result<Vec<JsonValue>, CoreError> {
    let backend = db.get_database_backend();
    JsonValue::find_by_statement(backend.build(statement))
        .all(db)
        .await
        .map_err(|e| {
            error!("Failed to load related rows: {}", e);
            CoreError::InternalServerError
        })
}

fn group_by(rows: Vec<JsonValue>, column: &str) -> BTreeMap<String, Vec<JsonValue>> {
    let mut groups: BTreeMap<String, Vec<JsonValue>> = BTreeMap::new();
    for row in rows {
        if let Some(key) = json_key(row.get(column)) {
            groups.entry(key).or_default().push(row);
        }
    }
    groups
}

async fn load_relation<E: RepositoryModel>(
    db: &DatabaseConnection,
    entries: &mut [Entry<E::Model>],
    relation: &ResolvedRelation<E::Column>,
) -> Result<(), CoreError> {
    let keys = local_keys::<E>(entries, relation.local);
    debug!(relation = %relation.name, keys = keys.len(), "Eager loading relation");

    match relation.kind {
        RelationKind::HasMany {
            related_table,
            foreign_key,
        } => {
            let rows = if keys.is_empty() {
                Vec::new()
            } else {
                fetch_json(db, &rows_where(related_table, foreign_key, keys)).await?
            };
            let groups = group_by(rows, foreign_key);

            for entry in entries.iter_mut() {
                let related = value_key(&entry.model.get(relation.local))
                    .and_then(|key| groups.get(&key).cloned())
                    .unwrap_or_default();
                entry
                    .relations
                    .insert(relation.name.clone(), JsonValue::Array(related));
            }
        }
        RelationKind::BelongsTo {
            related_table,
            owner_key,
            ..
        } => {
            let rows = if keys.is_empty() {
                Vec::new()
            } else {
                fetch_json(db, &rows_where(related_table, owner_key, keys)).await?
            };
            let owners = group_by(rows, owner_key);

            for entry in entries.iter_mut() {
                let owner = value_key(&entry.model.get(relation.local))
                    .and_then(|key| owners.get(&key))
                    .and_then(|rows| rows.first().cloned())
                    .unwrap_or(JsonValue::Null);
                entry.relations.insert(relation.name.clone(), owner);
            }
        }
        RelationKind::BelongsToMany {
            pivot_table,
            foreign_pivot_key,
            related_pivot_key,
            related_table,
            related_key,
        } => {
            let pivots = if keys.is_empty() {
                Vec::new()
            } else {
                fetch_json(db, &rows_where(pivot_table, foreign_pivot_key, keys)).await?
            };

            let mut seen = HashSet::new();
            let related_ids = pivots
                .iter()
                .filter_map(|pivot| pivot.get(related_pivot_key))
                .filter(|id| json_key(Some(*id)).is_some_and(|key| seen.insert(key)))
                .filter_map(json_to_value)
                .collect::<Vec<Value>>();

            let related_rows = if related_ids.is_empty() {
                BTreeMap::new()
            } else {
                group_by(
                    fetch_json(db, &rows_where(related_table, related_key, related_ids)).await?,
                    related_key,
                )
            };

            let mut groups: BTreeMap<String, Vec<JsonValue>> = BTreeMap::new();
            for pivot in pivots {
                let (Some(owner), Some(related)) = (
                    json_key(pivot.get(foreign_pivot_key)),
                    json_key(pivot.get(related_pivot_key)),
                ) else {
                    continue;
                };
                let Some(JsonValue::Object(mut row)) = related_rows
                    .get(&related)
                    .and_then(|rows| rows.first().cloned())
                else {
                    continue;
                };
                row.insert(PIVOT.to_string(), pivot);
                groups.entry(owner).or_default().push(JsonValue::Object(row));
            }

            for entry in entries.iter_mut() {
                let related = value_key(&entry.model.get(relation.local))
                    .and_then(|key| groups.get(&key).cloned())
                    .unwrap_or_default();
                entry
                    .relations
                    .insert(relation.name.clone(), JsonValue::Array(related));
            }
        }
    }

    Ok(())
}

async fn load_count<E: RepositoryModel>(
    db: &DatabaseConnection,
    entries: &mut [Entry<E::Model>],
    relation: &ResolvedRelation<E::Column>,
) -> Result<(), CoreError> {
    let (table, column) = match relation.kind {
        RelationKind::HasMany {
            related_table,
            foreign_key,
        } => (related_table, foreign_key),
        RelationKind::BelongsToMany {
            pivot_table,
            foreign_pivot_key,
            ..
        } => (pivot_table, foreign_pivot_key),
        RelationKind::BelongsTo { .. } => {
            return Err(CoreError::UnsupportedRelationKind {
                relation: relation.name.clone(),
                context: "counting",
            });
        }
    };

    let keys = local_keys::<E>(entries, relation.local);
    let mut counts = BTreeMap::new();

    if !keys.is_empty() {
        let statement = Query::select()
            .expr_as(Expr::col(Alias::new(column)), Alias::new(OWNER))
            .expr_as(Func::count(Expr::col(Asterisk)), Alias::new(AGGREGATE))
            .from(Alias::new(table))
            .and_where(Expr::col(Alias::new(column)).is_in(keys))
            .group_by_col(Alias::new(column))
            .to_owned();

        for row in fetch_json(db, &statement).await? {
            if let (Some(owner), Some(count)) = (
                json_key(row.get(OWNER)),
                row.get(AGGREGATE).and_then(JsonValue::as_u64),
            ) {
                counts.insert(owner, count);
            }
        }
    }

    for entry in entries.iter_mut() {
        let count = value_key(&entry.model.get(relation.local))
            .and_then(|key| counts.get(&key).copied())
            .unwrap_or(0);
        entry.set_count(&relation.name, count);
    }

    Ok(())
}

/// Wraps the models into entries and loads the given relations and counts.
pub async fn load<E: RepositoryModel>(
    db: &DatabaseConnection,
    models: Vec<E::Model>,
    with: &[ResolvedRelation<E::Column>],
    with_count: &[ResolvedRelation<E::Column>],
) -> Result<Vec<Entry<E::Model>>, CoreError> {
    let mut entries = models.into_iter().map(Entry::new).collect::<Vec<_>>();
    if entries.is_empty() {
        return Ok(entries);
    }

    for relation in with {
        load_relation::<E>(db, &mut entries, relation).await?;
    }

    for relation in with_count {
        load_count::<E>(db, &mut entries, relation).await?;
    }

    Ok(entries)
}
