//! Menu persistence port and its sea-orm implementation

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};

use crate::db::contains_pattern;
use crate::entity::{menu, menu_permission};
use crate::error::AppResult;
use crate::menu::dto::MenuFilter;
use crate::pagination::PageRequest;

/// Columns that bulk operations (reorder, relevel, soft delete) touch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFields {
    pub sort_order: Option<i32>,
    pub level: Option<i32>,
    pub deleted: Option<bool>,
    pub updated_by: Option<String>,
}

impl MenuFields {
    pub fn sort_order(sort_order: i32) -> Self {
        Self {
            sort_order: Some(sort_order),
            ..Default::default()
        }
    }

    pub fn soft_delete(actor: &str) -> Self {
        Self {
            deleted: Some(true),
            updated_by: Some(actor.to_string()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sort_order.is_none()
            && self.level.is_none()
            && self.deleted.is_none()
            && self.updated_by.is_none()
    }

    pub fn apply(&self, menu: &mut menu::Model) {
        if let Some(sort_order) = self.sort_order {
            menu.sort_order = sort_order;
        }
        if let Some(level) = self.level {
            menu.level = level;
        }
        if let Some(deleted) = self.deleted {
            menu.deleted = deleted;
        }
        if let Some(updated_by) = &self.updated_by {
            menu.updated_by = Some(updated_by.clone());
        }
    }
}

/// Storage capabilities the menu engine relies on
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// Raw lookup; soft-deleted rows are returned too
    async fn find_by_id(&self, id: i64) -> AppResult<Option<menu::Model>>;

    /// Live rows matching `filter`, ordered by (sort_order, id)
    async fn find_by_filter(&self, filter: &MenuFilter) -> AppResult<Vec<menu::Model>>;

    /// One page of `find_by_filter` plus the total number of matches
    async fn find_page(
        &self,
        filter: &MenuFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<menu::Model>, u64)>;

    /// Persist a new row; the id of `item` is ignored and assigned by storage
    async fn insert(&self, item: menu::Model) -> AppResult<menu::Model>;

    /// Overwrite an existing row
    async fn save(&self, item: menu::Model) -> AppResult<menu::Model>;

    async fn update_fields(&self, id: i64, fields: MenuFields) -> AppResult<()>;

    /// Direct children of `parent_id`, soft-deleted rows included
    async fn find_by_parent(&self, parent_id: i64) -> AppResult<Vec<menu::Model>>;

    /// Physical delete
    async fn remove(&self, id: i64) -> AppResult<()>;

    /// Live, active and visible menus granted `can_read` to any of `role_ids`,
    /// ordered by (level, sort_order, id). May repeat a menu once per grant.
    async fn find_readable(&self, role_ids: &[String]) -> AppResult<Vec<menu::Model>>;
}

/// sea-orm backed repository over a pool or an open transaction
pub struct SeaOrmMenuRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SeaOrmMenuRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

fn filtered(filter: &MenuFilter) -> Select<menu::Entity> {
    let mut query = menu::Entity::find().filter(menu::Column::Deleted.eq(false));

    match filter.parent_id {
        Some(Some(parent_id)) => query = query.filter(menu::Column::ParentId.eq(parent_id)),
        Some(None) => query = query.filter(menu::Column::ParentId.is_null()),
        None => {}
    }
    if let Some(level) = filter.level {
        query = query.filter(menu::Column::Level.eq(level));
    }
    if let Some(is_active) = filter.is_active {
        query = query.filter(menu::Column::IsActive.eq(is_active));
    }
    if let Some(is_visible) = filter.is_visible {
        query = query.filter(menu::Column::IsVisible.eq(is_visible));
    }
    if let Some(term) = filter.search_term() {
        let pattern = contains_pattern(&term);
        query = query.filter(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(menu::Column::Name))).like(pattern.clone()))
                .add(Expr::expr(Func::lower(Expr::col(menu::Column::Description))).like(pattern)),
        );
    }

    query
        .order_by_asc(menu::Column::SortOrder)
        .order_by_asc(menu::Column::Id)
}

#[async_trait]
impl<'a, C> MenuRepository for SeaOrmMenuRepository<'a, C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn find_by_id(&self, id: i64) -> AppResult<Option<menu::Model>> {
        Ok(menu::Entity::find_by_id(id).one(self.conn).await?)
    }

    async fn find_by_filter(&self, filter: &MenuFilter) -> AppResult<Vec<menu::Model>> {
        Ok(filtered(filter).all(self.conn).await?)
    }

    async fn find_page(
        &self,
        filter: &MenuFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<menu::Model>, u64)> {
        let page = page.normalized();
        let total = filtered(filter).count(self.conn).await?;
        let items = filtered(filter)
            .offset(page.offset())
            .limit(page.limit)
            .all(self.conn)
            .await?;
        Ok((items, total))
    }

    async fn insert(&self, item: menu::Model) -> AppResult<menu::Model> {
        let mut active = menu::ActiveModel::from(item).reset_all();
        active.id = NotSet;
        Ok(active.insert(self.conn).await?)
    }

    async fn save(&self, item: menu::Model) -> AppResult<menu::Model> {
        let active = menu::ActiveModel::from(item).reset_all();
        Ok(active.update(self.conn).await?)
    }

    async fn update_fields(&self, id: i64, fields: MenuFields) -> AppResult<()> {
        if fields.is_empty() {
            return Ok(());
        }

        let mut update = menu::Entity::update_many()
            .col_expr(menu::Column::UpdatedDtm, Expr::value(chrono::Utc::now()))
            .filter(menu::Column::Id.eq(id));
        if let Some(sort_order) = fields.sort_order {
            update = update.col_expr(menu::Column::SortOrder, Expr::value(sort_order));
        }
        if let Some(level) = fields.level {
            update = update.col_expr(menu::Column::Level, Expr::value(level));
        }
        if let Some(deleted) = fields.deleted {
            update = update.col_expr(menu::Column::Deleted, Expr::value(deleted));
        }
        if let Some(updated_by) = fields.updated_by {
            update = update.col_expr(menu::Column::UpdatedBy, Expr::value(updated_by));
        }

        update.exec(self.conn).await?;
        Ok(())
    }

    async fn find_by_parent(&self, parent_id: i64) -> AppResult<Vec<menu::Model>> {
        Ok(menu::Entity::find()
            .filter(menu::Column::ParentId.eq(parent_id))
            .order_by_asc(menu::Column::Id)
            .all(self.conn)
            .await?)
    }

    async fn remove(&self, id: i64) -> AppResult<()> {
        menu::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(())
    }

    async fn find_readable(&self, role_ids: &[String]) -> AppResult<Vec<menu::Model>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }

        let granted = Query::select()
            .column(menu_permission::Column::MenuId)
            .from(menu_permission::Entity)
            .and_where(menu_permission::Column::RoleId.is_in(role_ids.iter().cloned()))
            .and_where(menu_permission::Column::CanRead.eq(true))
            .to_owned();

        let menus = menu::Entity::find()
            .filter(menu::Column::Deleted.eq(false))
            .filter(menu::Column::IsActive.eq(true))
            .filter(menu::Column::IsVisible.eq(true))
            .filter(menu::Column::Id.in_subquery(granted))
            .order_by_asc(menu::Column::Level)
            .order_by_asc(menu::Column::SortOrder)
            .order_by_asc(menu::Column::Id)
            .all(self.conn)
            .await?;
        Ok(menus)
    }
}
