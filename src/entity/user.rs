//! User entity - registered accounts
//!
//! Table: app_user

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "String(Some(64))")]
    pub username: String,

    /// bcrypt hash
    #[sea_orm(column_type = "String(Some(128))")]
    #[serde(skip_serializing)]
    pub password: String,

    /// Login name (unique)
    #[sea_orm(column_type = "String(Some(128))", unique)]
    pub email: String,

    /// SHA-256 hex digest of the current refresh token
    #[sea_orm(column_type = "String(Some(64))", nullable)]
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,

    pub created_dtm: DateTimeUtc,

    pub updated_dtm: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Public view of a user (no credentials)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_dtm: DateTimeUtc,
    pub updated_dtm: DateTimeUtc,
}

impl From<Model> for UserResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            created_dtm: model.created_dtm,
            updated_dtm: model.updated_dtm,
        }
    }
}
