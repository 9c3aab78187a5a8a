//! Menu entity - hierarchical navigation menu
//!
//! Table: menu. Self-referencing through `parent_id`; the tree itself is
//! never materialised on the model, see `crate::menu::tree`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Display name
    #[sea_orm(column_type = "String(Some(100))")]
    pub name: String,

    #[sea_orm(column_type = "String(Some(200))", nullable)]
    pub description: Option<String>,

    /// Route or link target
    #[sea_orm(column_type = "String(Some(255))", nullable)]
    pub url: Option<String>,

    /// Icon class or name
    #[sea_orm(column_type = "String(Some(50))", nullable)]
    pub icon: Option<String>,

    /// Parent menu (None for a root)
    #[sea_orm(nullable)]
    pub parent_id: Option<i64>,

    /// Ordering among siblings
    pub sort_order: i32,

    /// 1-based depth, root = 1
    pub level: i32,

    pub is_active: bool,

    pub is_visible: bool,

    /// menu, button, link ...
    #[sea_orm(column_name = "type", column_type = "String(Some(50))", nullable)]
    pub menu_type: Option<String>,

    /// Permission code
    #[sea_orm(column_type = "String(Some(100))", nullable)]
    pub permission: Option<String>,

    /// Free-form settings (JSON text)
    #[sea_orm(column_type = "Text", nullable)]
    pub config: Option<String>,

    pub created_dtm: DateTimeUtc,

    pub updated_dtm: DateTimeUtc,

    #[sea_orm(nullable)]
    pub created_by: Option<String>,

    #[sea_orm(nullable)]
    pub updated_by: Option<String>,

    /// Soft-delete marker
    pub deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
