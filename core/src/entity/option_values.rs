use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel,  Serialize, Deserialize)]
#[sea_orm(table_name = "option_values")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub option_id: i32,
    #[sea_orm(column_type = "Double")]
    pub fee: f64,
    pub priority: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product_options::Entity",
        from = "Column::OptionId",
        to = "super::product_options::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ProductOptions,
}

impl ActiveModelBehavior for ActiveModel {}
