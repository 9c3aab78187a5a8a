//! Board handlers
//!
//! Implements post CRUD with keyword search and pagination

use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, Set,
};
use serde::Deserialize;
use validator::Validate;

use crate::db::contains_pattern;
use crate::entity::board;
use crate::error::{AppError, AppResult, OptionExt};
use crate::middleware::{CurrentUser, DbConn};
use crate::pagination::{PageRequest, Paginated};
use crate::routes::ApiResponse;

#[derive(Debug, Default, Deserialize)]
pub struct BoardSearch {
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    #[validate(length(min = 2, max = 30))]
    pub title: String,
    #[validate(length(min = 2, max = 500))]
    pub content: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    #[validate(length(min = 2, max = 30))]
    pub title: Option<String>,
    #[validate(length(min = 2, max = 500))]
    pub content: Option<String>,
}

/// Posts matching `keyword` in title or content, newest first
fn search(keyword: Option<&str>) -> Select<board::Entity> {
    let mut query = board::Entity::find();
    if let Some(term) = keyword.map(str::trim).filter(|k| !k.is_empty()) {
        let pattern = contains_pattern(&term.to_lowercase());
        query = query.filter(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(board::Column::Title))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(board::Column::Content))).like(pattern)),
        );
    }
    query
        .order_by_desc(board::Column::CreatedDtm)
        .order_by_desc(board::Column::Id)
}

/// GET /api/board
pub async fn list_boards(
    Extension(db): Extension<DbConn>,
    Query(search_query): Query<BoardSearch>,
    Query(page): Query<PageRequest>,
) -> AppResult<Json<ApiResponse<Paginated<board::Model>>>> {
    let page = page.normalized();
    let keyword = search_query.keyword.as_deref();

    let total = search(keyword).count(&*db).await?;
    let items = search(keyword)
        .offset(page.offset())
        .limit(page.limit)
        .all(&*db)
        .await?;

    Ok(Json(ApiResponse::success(Paginated::new(items, total, page))))
}

/// GET /api/board/:id
pub async fn get_board(
    Extension(db): Extension<DbConn>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<board::Model>>> {
    let post = board::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found(format!("board {}", id))?;
    Ok(Json(ApiResponse::success(post)))
}

/// POST /api/board
pub async fn create_board(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateBoardRequest>,
) -> AppResult<Json<ApiResponse<board::Model>>> {
    req.validate()?;

    let now = chrono::Utc::now();
    let post = board::ActiveModel {
        title: Set(req.title),
        content: Set(req.content),
        created_dtm: Set(now),
        updated_dtm: Set(now),
        created_by: Set(Some(user.actor_id())),
        updated_by: Set(Some(user.actor_id())),
        ..Default::default()
    }
    .insert(&*db)
    .await?;

    tracing::info!("Board {} created by user {}", post.id, user.id);
    Ok(Json(ApiResponse::success(post)))
}

/// PATCH /api/board/:id
pub async fn update_board(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBoardRequest>,
) -> AppResult<Json<ApiResponse<board::Model>>> {
    req.validate()?;

    let post = board::Entity::find_by_id(id)
        .one(&*db)
        .await?
        .ok_or_not_found(format!("board {}", id))?;

    let mut active: board::ActiveModel = post.into();
    if let Some(title) = req.title {
        active.title = Set(title);
    }
    if let Some(content) = req.content {
        active.content = Set(content);
    }
    active.updated_by = Set(Some(user.actor_id()));
    active.updated_dtm = Set(chrono::Utc::now());
    let post = active.update(&*db).await?;

    Ok(Json(ApiResponse::success(post)))
}

/// DELETE /api/board/:id
pub async fn delete_board(
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    let result = board::Entity::delete_by_id(id).exec(&*db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("board {}", id)));
    }

    tracing::info!("Board {} deleted by user {}", id, user.id);
    Ok(Json(ApiResponse::success_msg("success")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_board_validation() {
        let ok = CreateBoardRequest {
            title: "Hi there".to_string(),
            content: "Body".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short = CreateBoardRequest {
            title: "H".to_string(),
            content: "Body".to_string(),
        };
        let err = AppError::from(short.validate().unwrap_err());
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("title")));

        let long = UpdateBoardRequest {
            content: Some("x".repeat(501)),
            ..Default::default()
        };
        assert!(long.validate().is_err());
        assert!(UpdateBoardRequest::default().validate().is_ok());
    }

    #[test]
    fn test_search_query() {
        let sql = search(Some(" Rust ")).build(DbBackend::Postgres).to_string();
        assert!(sql.contains(r#"LOWER("title") LIKE '%rust%' ESCAPE"#));
        assert!(sql.contains(r#"ORDER BY "board"."created_dtm" DESC"#));

        let all = search(Some("  ")).build(DbBackend::Postgres).to_string();
        assert!(!all.contains("LIKE"));

        let percent = search(Some("100%")).build(DbBackend::Sqlite).to_string();
        assert!(percent.contains(r"'%100\%%'"));
        assert!(!percent.contains("'%100%%'"));
    }
}
