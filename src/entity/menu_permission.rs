//! MenuPermission entity - role to menu grants
//!
//! Table: menu_permission. Maintained outside this service; read by
//! the user menu query.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_permission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub menu_id: i64,

    #[sea_orm(column_type = "String(Some(64))")]
    pub role_id: String,

    pub can_read: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
