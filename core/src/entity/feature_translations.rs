use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "product_feature_translations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub feature_id: i32,
    pub locale: String,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product_features::Entity",
        from = "Column::FeatureId",
        to = "super::product_features::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ProductFeatures,
}

impl ActiveModelBehavior for ActiveModel {}
