use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "option_value_translations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub option_value_id: i32,
    pub locale: String,
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::option_values::Entity",
        from = "Column::OptionValueId",
        to = "super::option_values::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    OptionValues,
}

impl ActiveModelBehavior for ActiveModel {}
