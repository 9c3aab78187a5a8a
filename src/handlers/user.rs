//! User handlers

use axum::{extract::Path, response::Json, Extension};
use sea_orm::EntityTrait;

use crate::entity::user::{self, UserResponse};
use crate::error::{AppError, AppResult};
use crate::middleware::DbConn;
use crate::routes::ApiResponse;

/// GET /api/user/:id
pub async fn get_user(
    Extension(db): Extension<DbConn>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let account = user::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or(AppError::UserNotFound)?;
    Ok(Json(ApiResponse::success(UserResponse::from(account))))
}
