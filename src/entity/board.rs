//! Board entity - posts
//!
//! Table: board

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "board")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "String(Some(30))")]
    pub title: String,

    #[sea_orm(column_type = "String(Some(500))")]
    pub content: String,

    pub created_dtm: DateTimeUtc,

    pub updated_dtm: DateTimeUtc,

    #[sea_orm(nullable)]
    pub created_by: Option<String>,

    #[sea_orm(nullable)]
    pub updated_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
