use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::{
    common::entities::app_errors::CoreError,
    repository::value_objects::{
        Capabilities, FilterDeclaration, GlobalScopeExclusion, PaginationMode, RelationKind,
        SortDirection,
    },
};

use super::{coerce::column_named, model::RepositoryModel, scopes::NamedScope};

pub const DEFAULT_RECORDS_PER_PAGE: u64 = 12;

const TRANSLATIONS: &str = "translations";

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Where a sortable or searchable path points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget<C> {
    Column(C),
    /// A column of the model's translations table.
    Translation(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField<C> {
    pub path: String,
    pub target: FieldTarget<C>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterTarget<C> {
    /// Equality on a column of the model, including the foreign key of a
    /// belongs-to relation.
    Column(C),
    /// Membership of the record key in a pivot table.
    Pivot {
        pivot_table: &'static str,
        foreign_pivot_key: &'static str,
        related_pivot_key: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFilter<C> {
    pub request_key: String,
    pub target: FilterTarget<C>,
}

/// A relation that can be eager loaded or counted. `local` is the column of
/// the model whose values match the relation keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRelation<C> {
    pub name: String,
    pub kind: RelationKind,
    pub local: C,
}

/// Declarative listing configuration of a repository type.
pub struct RepositoryConfig<E: RepositoryModel> {
    capabilities: Capabilities,
    sort_field: Option<String>,
    sort_type: SortDirection,
    sortable: Vec<String>,
    searchable: Vec<String>,
    filters: Vec<FilterDeclaration>,
    scopes: Vec<NamedScope<E>>,
    global_scopes: Vec<NamedScope<E>>,
    without_global_scopes: GlobalScopeExclusion,
    with: Vec<String>,
    with_count: Vec<String>,
    force_pagination: bool,
    records_per_page: u64,
    pagination_mode: PaginationMode,
}

impl<E: RepositoryModel> Default for RepositoryConfig<E> {
    fn default() -> Self {
        Self::new(Capabilities::NONE)
    }
}

impl<E: RepositoryModel> RepositoryConfig<E> {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            sort_field: None,
            sort_type: SortDirection::Asc,
            sortable: Vec::new(),
            searchable: Vec::new(),
            filters: Vec::new(),
            scopes: Vec::new(),
            global_scopes: Vec::new(),
            without_global_scopes: GlobalScopeExclusion::None,
            with: Vec::new(),
            with_count: Vec::new(),
            force_pagination: false,
            records_per_page: DEFAULT_RECORDS_PER_PAGE,
            pagination_mode: PaginationMode::Full,
        }
    }

    pub fn sort_field(mut self, field: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self
    }

    pub fn sort_type(mut self, direction: SortDirection) -> Self {
        self.sort_type = direction;
        self
    }

    pub fn sortable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sortable.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn searchable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searchable.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Adds a filter: `"status"` or `("state", "status")`.
    pub fn filter(mut self, declaration: impl Into<FilterDeclaration>) -> Self {
        self.filters.push(declaration.into());
        self
    }

    pub fn filters<I, D>(mut self, declarations: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<FilterDeclaration>,
    {
        self.filters.extend(declarations.into_iter().map(Into::into));
        self
    }

    /// Adds a local scope, applied after filtering.
    pub fn scope(mut self, scope: NamedScope<E>) -> Self {
        self.scopes.push(scope);
        self
    }

    /// Adds a repository global scope, applied first in the listing.
    pub fn global_scope(mut self, scope: NamedScope<E>) -> Self {
        self.global_scopes.push(scope);
        self
    }

    pub fn without_global_scopes(mut self, exclusion: GlobalScopeExclusion) -> Self {
        self.without_global_scopes = exclusion;
        self
    }

    pub fn with<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with.extend(relations.into_iter().map(Into::into));
        self
    }

    pub fn with_count<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_count.extend(relations.into_iter().map(Into::into));
        self
    }

    pub fn force_pagination(mut self, force: bool) -> Self {
        self.force_pagination = force;
        self
    }

    pub fn records_per_page(mut self, records: u64) -> Self {
        self.records_per_page = records;
        self
    }

    pub fn pagination_mode(mut self, mode: PaginationMode) -> Self {
        self.pagination_mode = mode;
        self
    }

    /// Validates every declaration against the model descriptor.
    pub fn resolve(self) -> Result<ResolvedConfig<E>, CoreError> {
        if self.records_per_page == 0 {
            return Err(CoreError::Configuration(
                "records_per_page must be positive".to_string(),
            ));
        }

        let mut sort_targets = BTreeMap::new();
        for path in self.sortable.iter().chain(self.sort_field.iter()) {
            sort_targets.insert(path.clone(), resolve_field::<E>(path)?);
        }

        let searchable = self
            .searchable
            .iter()
            .map(|path| {
                Ok(ResolvedField {
                    path: path.clone(),
                    target: resolve_field::<E>(path)?,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        let filters = self
            .filters
            .iter()
            .map(resolve_filter::<E>)
            .collect::<Result<Vec<_>, CoreError>>()?;

        let with = self
            .with
            .iter()
            .map(|name| resolve_relation::<E>(name, "eager loading"))
            .collect::<Result<Vec<_>, CoreError>>()?;

        let with_count = self
            .with_count
            .iter()
            .map(|name| {
                let relation = resolve_relation::<E>(name, "counting")?;
                if matches!(relation.kind, RelationKind::BelongsTo { .. }) {
                    return Err(CoreError::UnsupportedRelationKind {
                        relation: name.clone(),
                        context: "counting",
                    });
                }
                Ok(relation)
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        debug!(
            table = %E::base_table(),
            sortable = self.sortable.len(),
            searchable = searchable.len(),
            filters = filters.len(),
            "Resolved repository configuration"
        );

        Ok(ResolvedConfig {
            capabilities: self.capabilities,
            sort_field: self.sort_field,
            sort_type: self.sort_type,
            sortable: self.sortable,
            sort_targets,
            searchable,
            filters,
            scopes: self.scopes,
            global_scopes: self.global_scopes,
            without_global_scopes: self.without_global_scopes,
            with,
            with_count,
            force_pagination: self.force_pagination,
            records_per_page: self.records_per_page,
            pagination_mode: self.pagination_mode,
        })
    }
}

fn resolve_field<E: RepositoryModel>(path: &str) -> Result<FieldTarget<E::Column>, CoreError> {
    match path.split_once('.') {
        None => column_named::<E::Column>(path)
            .map(FieldTarget::Column)
            .ok_or_else(|| {
                CoreError::Configuration(format!(
                    "`{path}` is not a column of `{}`",
                    E::base_table()
                ))
            }),
        Some((TRANSLATIONS, field)) => {
            let Some(translations) = E::translations() else {
                return Err(CoreError::Configuration(format!(
                    "`{}` has no translations for `{path}`",
                    E::base_table()
                )));
            };
            if !IDENTIFIER.is_match(field) {
                return Err(CoreError::Configuration(format!(
                    "`{path}` is not a valid translation field"
                )));
            }
            if !translations.has_column(field) {
                return Err(CoreError::Configuration(format!(
                    "`{field}` is not a column of `{}`",
                    translations.table
                )));
            }
            Ok(FieldTarget::Translation(field.to_string()))
        }
        Some((relation, _)) => Err(CoreError::UnsupportedRelationKind {
            relation: relation.to_string(),
            context: "sorting or searching",
        }),
    }
}

/// A filter field naming both a column and a relation targets the column.
fn resolve_filter<E: RepositoryModel>(
    declaration: &FilterDeclaration,
) -> Result<ResolvedFilter<E::Column>, CoreError> {
    let field = declaration.field.as_str();

    let target = if let Some(column) = column_named::<E::Column>(field) {
        FilterTarget::Column(column)
    } else {
        match E::relation(field) {
            Some(RelationKind::BelongsTo { foreign_key, .. }) => {
                FilterTarget::Column(local_column::<E>(field, foreign_key)?)
            }
            Some(RelationKind::BelongsToMany {
                pivot_table,
                foreign_pivot_key,
                related_pivot_key,
                ..
            }) => FilterTarget::Pivot {
                pivot_table,
                foreign_pivot_key,
                related_pivot_key,
            },
            Some(RelationKind::HasMany { .. }) => {
                return Err(CoreError::UnsupportedRelationKind {
                    relation: field.to_string(),
                    context: "filtering",
                });
            }
            None => {
                return Err(CoreError::Configuration(format!(
                    "filter `{}` targets unknown field `{field}`",
                    declaration.request_key
                )));
            }
        }
    };

    Ok(ResolvedFilter {
        request_key: declaration.request_key.clone(),
        target,
    })
}

fn resolve_relation<E: RepositoryModel>(
    name: &str,
    context: &'static str,
) -> Result<ResolvedRelation<E::Column>, CoreError> {
    if name == TRANSLATIONS
        && let Some(translations) = E::translations()
    {
        return Ok(ResolvedRelation {
            name: name.to_string(),
            kind: RelationKind::HasMany {
                related_table: translations.table,
                foreign_key: translations.foreign_key,
            },
            local: E::key_column(),
        });
    }

    let kind = E::relation(name).ok_or_else(|| {
        CoreError::Configuration(format!(
            "`{}` has no relation `{name}` for {context}",
            E::base_table()
        ))
    })?;

    let local = match kind {
        RelationKind::BelongsTo { foreign_key, .. } => local_column::<E>(name, foreign_key)?,
        RelationKind::HasMany { .. } | RelationKind::BelongsToMany { .. } => E::key_column(),
    };

    Ok(ResolvedRelation {
        name: name.to_string(),
        kind,
        local,
    })
}

fn local_column<E: RepositoryModel>(relation: &str, name: &str) -> Result<E::Column, CoreError> {
    column_named::<E::Column>(name).ok_or_else(|| {
        CoreError::Configuration(format!(
            "relation `{relation}` uses `{name}` which is not a column of `{}`",
            E::base_table()
        ))
    })
}

/// A configuration validated against its model, shared across requests.
#[derive(Debug, Clone)]
pub struct ResolvedConfig<E: RepositoryModel> {
    pub capabilities: Capabilities,
    pub sort_field: Option<String>,
    pub sort_type: SortDirection,
    pub sortable: Vec<String>,
    pub sort_targets: BTreeMap<String, FieldTarget<E::Column>>,
    pub searchable: Vec<ResolvedField<E::Column>>,
    pub filters: Vec<ResolvedFilter<E::Column>>,
    pub scopes: Vec<NamedScope<E>>,
    pub global_scopes: Vec<NamedScope<E>>,
    pub without_global_scopes: GlobalScopeExclusion,
    pub with: Vec<ResolvedRelation<E::Column>>,
    pub with_count: Vec<ResolvedRelation<E::Column>>,
    pub force_pagination: bool,
    pub records_per_page: u64,
    pub pagination_mode: PaginationMode,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::products;

    mod tags {
        use sea_orm::entity::prelude::*;

        use crate::{
            domain::repository::value_objects::RelationKind,
            infrastructure::repository::RepositoryModel,
        };

        #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
        #[sea_orm(table_name = "tags")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub label: String,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}

        impl RepositoryModel for Entity {
            fn key_column() -> Column {
                Column::Id
            }

            fn relation(name: &str) -> Option<RelationKind> {
                match name {
                    "aliases" => Some(RelationKind::HasMany {
                        related_table: "tag_aliases",
                        foreign_key: "tag_id",
                    }),
                    "label" => Some(RelationKind::BelongsToMany {
                        pivot_table: "label_tag",
                        foreign_pivot_key: "tag_id",
                        related_pivot_key: "label_id",
                        related_table: "labels",
                        related_key: "id",
                    }),
                    _ => None,
                }
            }
        }
    }

    #[test]
    fn test_resolve_product_declarations() {
        let config = RepositoryConfig::<products::Entity>::new(Capabilities::ALL)
            .sort_field("title")
            .sortable(["price", "translations.name"])
            .searchable(["title", "translations.name"])
            .filter("status")
            .filter(("brand", "brand"))
            .filter(("category", "categories"))
            .with(["brand", "images"])
            .with_count(["images"])
            .resolve()
            .expect("product configuration resolves");

        assert!(matches!(
            config.sort_targets.get("translations.name"),
            Some(FieldTarget::Translation(field)) if field == "name"
        ));
        assert!(matches!(
            config.sort_targets.get("title"),
            Some(FieldTarget::Column(products::Column::Title))
        ));
        assert!(matches!(
            config.filters[1].target,
            FilterTarget::Column(products::Column::BrandId)
        ));
        assert!(matches!(
            config.filters[2].target,
            FilterTarget::Pivot {
                pivot_table: "category_product",
                ..
            }
        ));
        assert!(matches!(config.with[0].local, products::Column::BrandId));
        assert!(matches!(config.with_count[0].local, products::Column::Id));
        assert_eq!(config.records_per_page, DEFAULT_RECORDS_PER_PAGE);
    }

    #[test]
    fn test_resolve_rejects_unknown_column() {
        let result = RepositoryConfig::<products::Entity>::new(Capabilities::SORT)
            .sortable(["weight"])
            .resolve();
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_resolve_rejects_translations_without_table() {
        let result = RepositoryConfig::<tags::Entity>::new(Capabilities::SEARCH)
            .searchable(["translations.label"])
            .resolve();
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_resolve_rejects_relation_paths() {
        let result = RepositoryConfig::<products::Entity>::new(Capabilities::SORT)
            .sortable(["brand.name"])
            .resolve();
        assert!(matches!(
            result,
            Err(CoreError::UnsupportedRelationKind { ref relation, .. }) if relation == "brand"
        ));
    }

    #[test]
    fn test_resolve_rejects_has_many_filter() {
        let result = RepositoryConfig::<tags::Entity>::new(Capabilities::FILTER)
            .filter(("alias", "aliases"))
            .resolve();
        assert_eq!(
            result.err(),
            Some(CoreError::UnsupportedRelationKind {
                relation: "aliases".to_string(),
                context: "filtering",
            })
        );
    }

    #[test]
    fn test_resolve_rejects_belongs_to_count() {
        let result = RepositoryConfig::<products::Entity>::new(Capabilities::NONE)
            .with_count(["brand"])
            .resolve();
        assert!(matches!(
            result,
            Err(CoreError::UnsupportedRelationKind { context: "counting", .. })
        ));
    }

    #[test]
    fn test_resolve_rejects_unknown_relation_and_zero_page_size() {
        let unknown = RepositoryConfig::<products::Entity>::new(Capabilities::NONE)
            .with(["reviews"])
            .resolve();
        assert!(matches!(unknown, Err(CoreError::Configuration(_))));

        let zero = RepositoryConfig::<products::Entity>::new(Capabilities::PAGINATE)
            .records_per_page(0)
            .resolve();
        assert!(matches!(zero, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_resolve_rejects_invalid_translation_field() {
        let result = RepositoryConfig::<products::Entity>::new(Capabilities::SORT)
            .sortable(["translations.name; drop"])
            .resolve();
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_resolve_rejects_unknown_translation_column() {
        let result = RepositoryConfig::<products::Entity>::new(Capabilities::SEARCH)
            .searchable(["translations.nme"])
            .resolve();
        assert!(matches!(
            result,
            Err(CoreError::Configuration(message)) if message.contains("nme")
        ));

        let sortable = RepositoryConfig::<products::Entity>::new(Capabilities::SORT)
            .sortable(["translations.description"])
            .resolve();
        assert!(sortable.is_ok());
    }

    #[test]
    fn test_filter_prefers_column_over_relation() {
        let config = RepositoryConfig::<tags::Entity>::new(Capabilities::FILTER)
            .filter("label")
            .resolve()
            .expect("config resolves");

        assert!(matches!(
            config.filters[0].target,
            FilterTarget::Column(tags::Column::Label)
        ));
    }
}
