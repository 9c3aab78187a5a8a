//! Menu handlers
//!
//! Thin wrappers around `MenuService`. Every mutating request runs in its own
//! database transaction.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde::Deserialize;
use validator::Validate;

use crate::menu::dto::{MenuQuery, ReorderRequest, UserMenuQuery};
use crate::menu::{CreateMenuRequest, MenuResponse, MenuService, SeaOrmMenuRepository, UpdateMenuRequest};
use crate::error::{AppError, AppResult};
use crate::middleware::{CurrentUser, DbConn};
use crate::pagination::{PageRequest, Paginated};
use crate::routes::ApiResponse;
use crate::state::AppState;

/// Engine bound to `conn` with the configured delete policy
fn menu_service<'a, C: ConnectionTrait + Send + Sync>(
    state: &AppState,
    conn: &'a C,
) -> MenuService<SeaOrmMenuRepository<'a, C>> {
    MenuService::new(SeaOrmMenuRepository::new(conn))
        .with_delete_policy(state.config.menu.delete_policy)
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    /// Physically delete instead of soft delete
    #[serde(default)]
    pub hard: bool,
}

/// POST /api/menus
pub async fn create_menu(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateMenuRequest>,
) -> AppResult<Json<ApiResponse<MenuResponse>>> {
    req.validate()?;

    let txn = db.begin().await?;
    let created = menu_service(&state, &txn)
        .create(req, &user.actor_id())
        .await?;
    txn.commit().await?;

    Ok(Json(ApiResponse::success(created)))
}

/// GET /api/menus
pub async fn list_menus(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<Vec<MenuResponse>>>> {
    let filter = query.into_filter()?;
    let menus = menu_service(&state, &*db).find_all(&filter).await?;
    Ok(Json(ApiResponse::success(menus)))
}

/// GET /api/menus/page
pub async fn page_menus(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Query(query): Query<MenuQuery>,
    Query(page): Query<PageRequest>,
) -> AppResult<Json<ApiResponse<Paginated<MenuResponse>>>> {
    let filter = query.into_filter()?;
    let page = page.normalized();
    let (items, total) = menu_service(&state, &*db).find_page(&filter, page).await?;
    Ok(Json(ApiResponse::success(Paginated::new(items, total, page))))
}

/// GET /api/menus/tree
pub async fn menu_tree(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Query(query): Query<MenuQuery>,
) -> AppResult<Json<ApiResponse<Vec<MenuResponse>>>> {
    let filter = query.into_filter()?;
    let tree = menu_service(&state, &*db).find_menu_tree(&filter).await?;
    Ok(Json(ApiResponse::success(tree)))
}

/// GET /api/menus/user?roleIds=ADMIN,USER
pub async fn user_menus(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<UserMenuQuery>,
) -> AppResult<Json<ApiResponse<Vec<MenuResponse>>>> {
    let role_ids = query.role_ids();
    if role_ids.is_empty() {
        return Err(AppError::Validation("roleIds must not be empty".to_string()));
    }

    let tree = menu_service(&state, &*db)
        .find_user_menus(&user.actor_id(), &role_ids)
        .await?;
    Ok(Json(ApiResponse::success(tree)))
}

/// PATCH /api/menus/reorder
pub async fn reorder_menus(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Json(req): Json<ReorderRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    let txn = db.begin().await?;
    menu_service(&state, &txn).reorder(&req.menu_ids).await?;
    txn.commit().await?;

    Ok(Json(ApiResponse::success_msg("success")))
}

/// GET /api/menus/:id
pub async fn get_menu(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<MenuResponse>>> {
    let menu = menu_service(&state, &*db).find_one(id).await?;
    Ok(Json(ApiResponse::success(menu)))
}

/// PATCH /api/menus/:id
pub async fn update_menu(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateMenuRequest>,
) -> AppResult<Json<ApiResponse<MenuResponse>>> {
    req.validate()?;

    let txn = db.begin().await?;
    let updated = menu_service(&state, &txn)
        .update(id, req, &user.actor_id())
        .await?;
    txn.commit().await?;

    Ok(Json(ApiResponse::success(updated)))
}

/// DELETE /api/menus/:id[?hard=true]
pub async fn delete_menu(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(query): Query<DeleteQuery>,
) -> AppResult<Json<ApiResponse<()>>> {
    let txn = db.begin().await?;
    if query.hard {
        menu_service(&state, &txn).purge(id).await?;
    } else {
        menu_service(&state, &txn).remove(id, &user.actor_id()).await?;
    }
    txn.commit().await?;

    tracing::info!("Menu {} deleted by user {} (hard: {})", id, user.id, query.hard);
    Ok(Json(ApiResponse::success_msg("success")))
}

/// GET /api/menus/:id/children
pub async fn menu_children(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<MenuResponse>>>> {
    let children = menu_service(&state, &*db).find_children(id).await?;
    Ok(Json(ApiResponse::success(children)))
}

/// GET /api/menus/:id/path
pub async fn menu_path(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<String>>> {
    let path = menu_service(&state, &*db).full_path(id).await?;
    Ok(Json(ApiResponse::success(path)))
}

/// GET /api/menus/level/:level
pub async fn menus_by_level(
    State(state): State<AppState>,
    Extension(db): Extension<DbConn>,
    Path(level): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<MenuResponse>>>> {
    if level < 1 {
        return Err(AppError::Validation("level must be at least 1".to_string()));
    }
    let menus = menu_service(&state, &*db).find_by_level(level).await?;
    Ok(Json(ApiResponse::success(menus)))
}
