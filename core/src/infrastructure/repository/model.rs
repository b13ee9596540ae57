use sea_orm::{EntityName, EntityTrait};

use crate::domain::repository::value_objects::{RelationKind, TranslationTable};

use super::scopes::NamedScope;

/// Describes how a repository may address an entity: its keys, translated
/// text, named relations and default global scopes.
pub trait RepositoryModel: EntityTrait {
    /// Column holding the primary key.
    fn key_column() -> Self::Column;

    /// Column used to look records up from a route parameter.
    fn route_key() -> Self::Column {
        Self::key_column()
    }

    fn translations() -> Option<TranslationTable> {
        None
    }

    fn relation(_name: &str) -> Option<RelationKind> {
        None
    }

    /// Scopes applied to every query on this entity unless a repository
    /// excludes them.
    fn global_scopes() -> Vec<NamedScope<Self>> {
        Vec::new()
    }

    fn base_table() -> String {
        Self::default().table_name().to_owned()
    }
}
