use sea_orm::{ColumnTrait, QueryFilter};

use crate::{
    domain::repository::value_objects::{RelationKind, TranslationTable},
    entity::products::{Column, Entity},
    infrastructure::repository::{NamedScope, RepositoryModel},
};

pub const NOT_DELETED: &str = "not_deleted";

impl RepositoryModel for Entity {
    fn key_column() -> Column {
        Column::Id
    }

    fn route_key() -> Column {
        Column::Slug
    }

    fn translations() -> Option<TranslationTable> {
        Some(TranslationTable {
            table: "product_translations",
            foreign_key: "product_id",
            locale_column: "locale",
            columns: &["name", "description"],
        })
    }

    fn relation(name: &str) -> Option<RelationKind> {
        let relation = match name {
            "brand" => RelationKind::BelongsTo {
                related_table: "brands",
                foreign_key: "brand_id",
                owner_key: "id",
            },
            "images" => RelationKind::HasMany {
                related_table: "product_images",
                foreign_key: "product_id",
            },
            "options" => RelationKind::HasMany {
                related_table: "product_options",
                foreign_key: "product_id",
            },
            "features" => RelationKind::BelongsToMany {
                pivot_table: "feature_product",
                foreign_pivot_key: "product_id",
                related_pivot_key: "feature_id",
                related_table: "product_features",
                related_key: "id",
            },
            "categories" => RelationKind::BelongsToMany {
                pivot_table: "category_product",
                foreign_pivot_key: "product_id",
                related_pivot_key: "category_id",
                related_table: "categories",
                related_key: "id",
            },
            "collections" => RelationKind::BelongsToMany {
                pivot_table: "collection_product",
                foreign_pivot_key: "product_id",
                related_pivot_key: "collection_id",
                related_table: "collections",
                related_key: "id",
            },
            _ => return None,
        };

        Some(relation)
    }

    fn global_scopes() -> Vec<NamedScope<Self>> {
        vec![NamedScope::new(NOT_DELETED, |select| {
            select.filter(Column::DeletedAt.is_null())
        })]
    }
}
