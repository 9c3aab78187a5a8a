//! In-memory menu repository
//!
//! Flat id -> record store with the same filter and ordering semantics as the
//! SQL implementation. `find_readable` behaves like a join and yields one row
//! per matching grant.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::entity::{menu, menu_permission};
use crate::error::{AppError, AppResult};
use crate::menu::dto::MenuFilter;
use crate::menu::repository::{MenuFields, MenuRepository};
use crate::pagination::PageRequest;

#[derive(Debug, Default)]
struct Store {
    menus: BTreeMap<i64, menu::Model>,
    permissions: Vec<menu_permission::Model>,
    next_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryMenuRepository {
    store: Arc<RwLock<Store>>,
}

impl MemoryMenuRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant (or deny) read access on a menu to a role
    pub async fn grant(&self, menu_id: i64, role_id: impl Into<String>, can_read: bool) {
        let mut store = self.store.write().await;
        let id = store.permissions.len() as i64 + 1;
        store.permissions.push(menu_permission::Model {
            id,
            menu_id,
            role_id: role_id.into(),
            can_read,
        });
    }

    /// Number of stored rows, soft-deleted ones included
    pub async fn len(&self) -> usize {
        self.store.read().await.menus.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn sort_siblings(menus: &mut [menu::Model]) {
    menus.sort_by_key(|m| (m.sort_order, m.id));
}

#[async_trait]
impl MenuRepository for MemoryMenuRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<menu::Model>> {
        Ok(self.store.read().await.menus.get(&id).cloned())
    }

    async fn find_by_filter(&self, filter: &MenuFilter) -> AppResult<Vec<menu::Model>> {
        let store = self.store.read().await;
        let mut menus: Vec<menu::Model> = store
            .menus
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        sort_siblings(&mut menus);
        Ok(menus)
    }

    async fn find_page(
        &self,
        filter: &MenuFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<menu::Model>, u64)> {
        let page = page.normalized();
        let menus = self.find_by_filter(filter).await?;
        let total = menus.len() as u64;
        let items = menus
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn insert(&self, mut item: menu::Model) -> AppResult<menu::Model> {
        let mut store = self.store.write().await;
        store.next_id += 1;
        item.id = store.next_id;
        store.menus.insert(item.id, item.clone());
        Ok(item)
    }

    async fn save(&self, item: menu::Model) -> AppResult<menu::Model> {
        let mut store = self.store.write().await;
        match store.menus.get_mut(&item.id) {
            Some(slot) => {
                *slot = item.clone();
                Ok(item)
            }
            None => Err(AppError::MenuNotFound(item.id)),
        }
    }

    async fn update_fields(&self, id: i64, fields: MenuFields) -> AppResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut store = self.store.write().await;
        if let Some(menu) = store.menus.get_mut(&id) {
            fields.apply(menu);
            menu.updated_dtm = chrono::Utc::now();
        }
        Ok(())
    }

    async fn find_by_parent(&self, parent_id: i64) -> AppResult<Vec<menu::Model>> {
        let store = self.store.read().await;
        let mut children: Vec<menu::Model> = store
            .menus
            .values()
            .filter(|m| m.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by_key(|m| m.id);
        Ok(children)
    }

    async fn remove(&self, id: i64) -> AppResult<()> {
        self.store.write().await.menus.remove(&id);
        Ok(())
    }

    async fn find_readable(&self, role_ids: &[String]) -> AppResult<Vec<menu::Model>> {
        let store = self.store.read().await;
        let mut rows: Vec<menu::Model> = store
            .permissions
            .iter()
            .filter(|p| p.can_read && role_ids.contains(&p.role_id))
            .filter_map(|p| store.menus.get(&p.menu_id))
            .filter(|m| !m.deleted && m.is_active && m.is_visible)
            .cloned()
            .collect();
        rows.sort_by_key(|m| (m.level, m.sort_order, m.id));
        Ok(rows)
    }
}

mod tests {
    use super::*;

    fn row(parent_id: Option<i64>, deleted: bool) -> menu::Model {
        let now = chrono::Utc::now();
        menu::Model {
            id: 0,
            name: "row".to_string(),
            description: None,
            url: None,
            icon: None,
            parent_id,
            sort_order: 0,
            level: if parent_id.is_some() { 2 } else { 1 },
            is_active: true,
            is_visible: true,
            menu_type: None,
            permission: None,
            config: None,
            created_dtm: now,
            updated_dtm: now,
            created_by: None,
            updated_by: None,
            deleted,
        }
    }

    #[tokio::test]
    async fn test_find_by_parent_keeps_deleted_rows() {
        let repo = MemoryMenuRepository::new();
        let root = repo.insert(row(None, false)).await.unwrap();
        let gone = repo.insert(row(Some(root.id), true)).await.unwrap();
        let live = repo.insert(row(Some(root.id), false)).await.unwrap();

        let ids: Vec<i64> = repo
            .find_by_parent(root.id)
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![gone.id, live.id]);

        let live_only = repo
            .find_by_filter(&MenuFilter::children_of(root.id))
            .await
            .unwrap();
        assert_eq!(live_only.len(), 1);
    }
}
