//! Menu hierarchy engine
//!
//! Mutations only go through here so that `level`, the acyclic parent graph
//! and soft-delete cascading stay consistent. The service is generic over
//! the storage port; the HTTP layer hands it a transaction-bound repository.

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::Utc;
use futures::future::BoxFuture;

use crate::entity::menu;
use crate::error::{AppError, AppResult};
use crate::menu::checker::has_circular_reference;
use crate::menu::dto::{CreateMenuRequest, MenuFilter, MenuResponse, UpdateMenuRequest};
use crate::menu::repository::{MenuFields, MenuRepository};
use crate::menu::tree;
use crate::menu::{DeletePolicy, MAX_DEPTH, MAX_WALK};
use crate::pagination::PageRequest;

pub struct MenuService<R> {
    repo: R,
    delete_policy: DeletePolicy,
}

/// Level of a new child under `parent`
fn child_level(parent: &menu::Model) -> AppResult<i32> {
    let level = parent.level + 1;
    if level > MAX_DEPTH {
        return Err(AppError::Validation(format!(
            "menu tree is limited to {} levels",
            MAX_DEPTH
        )));
    }
    Ok(level)
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for ch in path.chars() {
        if ch == '/' && out.ends_with('/') {
            continue;
        }
        out.push(ch);
    }
    out
}

impl<R: MenuRepository> MenuService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            delete_policy: DeletePolicy::default(),
        }
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Non-deleted record or `MenuNotFound`
    async fn find_live(&self, id: i64) -> AppResult<menu::Model> {
        match self.repo.find_by_id(id).await? {
            Some(menu) if !menu.deleted => Ok(menu),
            _ => Err(AppError::MenuNotFound(id)),
        }
    }

    pub async fn create(&self, input: CreateMenuRequest, actor: &str) -> AppResult<MenuResponse> {
        let level = match input.parent_id {
            Some(parent_id) => child_level(&self.find_live(parent_id).await?)?,
            None => 1,
        };

        let now = Utc::now();
        let record = menu::Model {
            id: 0,
            name: input.name,
            description: input.description,
            url: input.url,
            icon: input.icon,
            parent_id: input.parent_id,
            sort_order: input.sort_order,
            level,
            is_active: input.is_active,
            is_visible: input.is_visible,
            menu_type: input.menu_type,
            permission: input.permission,
            config: input.config,
            created_dtm: now,
            updated_dtm: now,
            created_by: Some(actor.to_string()),
            updated_by: Some(actor.to_string()),
            deleted: false,
        };

        let saved = self.repo.insert(record).await?;
        tracing::info!(
            "Menu {} '{}' created at level {} by {}",
            saved.id,
            saved.name,
            saved.level,
            actor
        );
        Ok(MenuResponse::from(saved))
    }

    pub async fn find_all(&self, filter: &MenuFilter) -> AppResult<Vec<MenuResponse>> {
        let menus = self.repo.find_by_filter(filter).await?;
        Ok(menus.into_iter().map(MenuResponse::from).collect())
    }

    pub async fn find_page(
        &self,
        filter: &MenuFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<MenuResponse>, u64)> {
        let (menus, total) = self.repo.find_page(filter, page).await?;
        Ok((menus.into_iter().map(MenuResponse::from).collect(), total))
    }

    /// Roots matching `filter`, each with its matching descendants loaded
    /// one level per query
    pub async fn find_menu_tree(&self, filter: &MenuFilter) -> AppResult<Vec<MenuResponse>> {
        let roots = self.repo.find_by_filter(&filter.with_parent(None)).await?;

        let mut nodes = Vec::with_capacity(roots.len());
        for root in roots {
            let mut node = MenuResponse::from(root);
            self.load_children(&mut node, filter, 1).await?;
            nodes.push(node);
        }
        Ok(nodes)
    }

    fn load_children<'s>(
        &'s self,
        node: &'s mut MenuResponse,
        filter: &'s MenuFilter,
        depth: usize,
    ) -> BoxFuture<'s, AppResult<()>> {
        Box::pin(async move {
            if depth > MAX_WALK {
                tracing::warn!("Menu {} is nested deeper than {}, tree cut", node.id, MAX_WALK);
                return Ok(());
            }

            let children = self
                .repo
                .find_by_filter(&filter.with_parent(Some(node.id)))
                .await?;

            let mut loaded = Vec::with_capacity(children.len());
            for child in children {
                let mut child = MenuResponse::from(child);
                self.load_children(&mut child, filter, depth + 1).await?;
                loaded.push(child);
            }

            node.has_children = !loaded.is_empty();
            node.children = loaded;
            Ok(())
        })
    }

    pub async fn find_one(&self, id: i64) -> AppResult<MenuResponse> {
        let menu = self.find_live(id).await?;
        let children = self.repo.find_by_filter(&MenuFilter::children_of(id)).await?;
        Ok(MenuResponse::with_loaded_children(menu, &children))
    }

    pub async fn find_children(&self, id: i64) -> AppResult<Vec<MenuResponse>> {
        self.find_all(&MenuFilter::children_of(id)).await
    }

    pub async fn find_by_level(&self, level: i32) -> AppResult<Vec<MenuResponse>> {
        self.find_all(&MenuFilter::at_level(level)).await
    }

    /// Shallow merge of `patch` onto the menu.
    ///
    /// A `parentId` change is checked for self-reference and cycles, and the
    /// levels of every live descendant are recomputed. Nothing is written
    /// until all checks passed.
    pub async fn update(
        &self,
        id: i64,
        patch: UpdateMenuRequest,
        actor: &str,
    ) -> AppResult<MenuResponse> {
        let mut menu = self.find_live(id).await?;
        let mut relevel = Vec::new();

        if let Some(new_parent) = patch.parent_id {
            let level = match new_parent {
                Some(parent_id) if parent_id == id => return Err(AppError::SelfParent(id)),
                Some(parent_id) => {
                    let parent = self.find_live(parent_id).await?;
                    if has_circular_reference(&self.repo, id, parent_id).await? {
                        return Err(AppError::CycleDetected { id, parent_id });
                    }
                    child_level(&parent)?
                }
                None => 1,
            };

            if level != menu.level {
                relevel = self.descendant_levels(id, level).await?;
            }
            menu.parent_id = new_parent;
            menu.level = level;
        }

        patch.apply_to(&mut menu);
        menu.updated_by = Some(actor.to_string());
        menu.updated_dtm = Utc::now();
        let saved = self.repo.save(menu).await?;

        for (descendant, level) in &relevel {
            let fields = MenuFields {
                level: Some(*level),
                ..Default::default()
            };
            self.repo.update_fields(*descendant, fields).await?;
        }
        if !relevel.is_empty() {
            tracing::debug!("Menu {} moved, {} descendants releveled", id, relevel.len());
        }

        Ok(MenuResponse::from(saved))
    }

    /// Descendants of `id` whose level changes once `id` sits at `level`
    async fn descendant_levels(&self, id: i64, level: i32) -> AppResult<Vec<(i64, i32)>> {
        let live = self.repo.find_by_filter(&MenuFilter::default()).await?;
        let current: HashMap<i64, i32> = live.iter().map(|m| (m.id, m.level)).collect();
        let levels = tree::relevel_descendants(&tree::children_index(&live), id, level);

        if levels.iter().any(|(_, l)| *l > MAX_DEPTH) {
            return Err(AppError::Validation(format!(
                "moving menu {} would nest its subtree deeper than {} levels",
                id, MAX_DEPTH
            )));
        }

        Ok(levels
            .into_iter()
            .filter(|(menu_id, l)| current.get(menu_id) != Some(l))
            .collect())
    }

    /// Soft delete according to the configured `DeletePolicy`
    pub async fn remove(&self, id: i64, actor: &str) -> AppResult<()> {
        self.find_live(id).await?;

        let live = self.repo.find_by_filter(&MenuFilter::default()).await?;
        let subtree = tree::collect_subtree(&tree::children_index(&live), id);
        if self.delete_policy == DeletePolicy::Restrict && subtree.len() > 1 {
            return Err(AppError::HasChildren(id));
        }

        // deepest first, the target last
        for menu_id in &subtree {
            self.repo
                .update_fields(*menu_id, MenuFields::soft_delete(actor))
                .await?;
        }

        tracing::info!("Menu {} removed ({} menus soft-deleted)", id, subtree.len());
        Ok(())
    }

    /// Physical delete of a menu whose descendants are all soft-deleted;
    /// those descendants are deleted with it
    pub async fn purge(&self, id: i64) -> AppResult<()> {
        if self.repo.find_by_id(id).await?.is_none() {
            return Err(AppError::MenuNotFound(id));
        }

        let mut below = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);
        while let Some(parent_id) = queue.pop_front() {
            for child in self.repo.find_by_parent(parent_id).await? {
                if !seen.insert(child.id) {
                    continue;
                }
                if !child.deleted {
                    return Err(AppError::HasChildren(id));
                }
                queue.push_back(child.id);
                below.push(child);
            }
        }

        // deepest first so no row outlives its parent
        let subtree = tree::collect_subtree(&tree::children_index(&below), id);
        for menu_id in &subtree {
            self.repo.remove(*menu_id).await?;
        }

        tracing::info!("Menu {} purged ({} rows deleted)", id, subtree.len());
        Ok(())
    }

    /// Dense 1..N `sort_order` in the given order
    pub async fn reorder(&self, menu_ids: &[i64]) -> AppResult<()> {
        let mut seen = HashSet::with_capacity(menu_ids.len());
        if let Some(dup) = menu_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(AppError::Validation(format!(
                "menu {} appears more than once",
                dup
            )));
        }
        for id in menu_ids {
            self.find_live(*id).await?;
        }

        for (position, id) in menu_ids.iter().enumerate() {
            self.repo
                .update_fields(*id, MenuFields::sort_order(position as i32 + 1))
                .await?;
        }
        Ok(())
    }

    /// Tree of the menus any of `role_ids` may read
    pub async fn find_user_menus(
        &self,
        actor: &str,
        role_ids: &[String],
    ) -> AppResult<Vec<MenuResponse>> {
        let rows = self.repo.find_readable(role_ids).await?;

        let mut seen = HashSet::with_capacity(rows.len());
        let menus: Vec<menu::Model> = rows.into_iter().filter(|m| seen.insert(m.id)).collect();
        tracing::debug!(
            "{} readable menus for {} with roles {:?}",
            menus.len(),
            actor,
            role_ids
        );

        Ok(tree::build_tree(menus))
    }

    /// `url` of the menu prefixed by the urls of its ancestors. The walk
    /// stops at the first ancestor without a url.
    pub async fn full_path(&self, id: i64) -> AppResult<String> {
        let mut current = self.find_live(id).await?;
        let mut segments = vec![current.url.clone().unwrap_or_default()];
        let mut visited = HashSet::from([id]);

        while let Some(parent_id) = current.parent_id {
            let parent = match self.repo.find_by_id(parent_id).await? {
                Some(parent) if !parent.deleted => parent,
                _ => break,
            };
            let url = match parent.url.as_deref() {
                Some(url) if !url.is_empty() => url.to_string(),
                _ => break,
            };
            if !visited.insert(parent.id) || visited.len() > MAX_WALK {
                return Err(AppError::CycleDetected { id, parent_id });
            }
            segments.push(url);
            current = parent;
        }

        if segments.len() == 1 {
            return Ok(segments.remove(0));
        }
        segments.reverse();
        Ok(collapse_slashes(&segments.join("/")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::memory::MemoryMenuRepository;
    use tokio_test::{assert_err, assert_ok};

    const ACTOR: &str = "tester";

    fn service() -> MenuService<MemoryMenuRepository> {
        MenuService::new(MemoryMenuRepository::new())
    }

    async fn add(svc: &MenuService<MemoryMenuRepository>, name: &str, parent: Option<i64>) -> i64 {
        let mut req = CreateMenuRequest::new(name);
        req.parent_id = parent;
        svc.create(req, ACTOR).await.unwrap().id
    }

    async fn stored(svc: &MenuService<MemoryMenuRepository>, id: i64) -> menu::Model {
        svc.repository().find_by_id(id).await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_create_levels() {
        let svc = service();
        let root = add(&svc, "Root", None).await;
        let child = add(&svc, "Child", Some(root)).await;
        let grandchild = add(&svc, "Grandchild", Some(child)).await;

        assert_eq!(stored(&svc, root).await.level, 1);
        assert_eq!(stored(&svc, child).await.level, 2);
        assert_eq!(stored(&svc, grandchild).await.level, 3);

        let record = stored(&svc, child).await;
        assert_eq!(record.created_by.as_deref(), Some(ACTOR));
        assert_eq!(record.updated_by.as_deref(), Some(ACTOR));
        assert!(!record.deleted);
    }

    #[tokio::test]
    async fn test_create_under_missing_parent() {
        let svc = service();
        let err = svc
            .create(CreateMenuRequest::new("Orphan").under(42), ACTOR)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MenuNotFound(42)));
        assert!(svc.repository().is_empty().await);
    }

    #[tokio::test]
    async fn test_create_depth_limit() {
        let svc = service();
        let mut parent = add(&svc, "L1", None).await;
        for level in 2..=MAX_DEPTH {
            parent = add(&svc, &format!("L{}", level), Some(parent)).await;
        }

        let err = svc
            .create(CreateMenuRequest::new("Too deep").under(parent), ACTOR)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_find_all_order_and_soft_delete() {
        let svc = service();
        let mut req = CreateMenuRequest::new("B");
        req.sort_order = 2;
        let b = svc.create(req, ACTOR).await.unwrap().id;
        let mut req = CreateMenuRequest::new("A");
        req.sort_order = 1;
        let a = svc.create(req, ACTOR).await.unwrap().id;
        let mut req = CreateMenuRequest::new("C");
        req.sort_order = 1;
        let c = svc.create(req, ACTOR).await.unwrap().id;

        let ids: Vec<i64> = svc
            .find_all(&MenuFilter::default())
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![a, c, b]);

        svc.remove(c, ACTOR).await.unwrap();
        let ids: Vec<i64> = svc
            .find_all(&MenuFilter::default())
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[tokio::test]
    async fn test_find_all_search() {
        let svc = service();
        let mut req = CreateMenuRequest::new("Settings");
        req.description = Some("User administration".to_string());
        let settings = svc.create(req, ACTOR).await.unwrap().id;
        add(&svc, "Reports", None).await;

        let filter = MenuFilter {
            search: Some(" ADMIN ".to_string()),
            ..Default::default()
        };
        let found = svc.find_all(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, settings);
    }

    #[tokio::test]
    async fn test_find_page() {
        let svc = service();
        for i in 0..5 {
            add(&svc, &format!("Menu {}", i), None).await;
        }

        let (items, total) = svc
            .find_page(&MenuFilter::default(), PageRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(items.iter().map(|m| m.id).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[tokio::test]
    async fn test_find_menu_tree() {
        let svc = service();
        let r1 = add(&svc, "R1", None).await;
        let r2 = add(&svc, "R2", None).await;
        let c1 = add(&svc, "C1", Some(r1)).await;
        let c2 = add(&svc, "C2", Some(r1)).await;

        let tree = svc.find_menu_tree(&MenuFilter::default()).await.unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, r1);
        assert!(tree[0].has_children);
        assert_eq!(
            tree[0].children.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![c1, c2]
        );
        assert!(!tree[0].children[0].has_children);
        assert_eq!(tree[1].id, r2);
        assert!(tree[1].children.is_empty());
        assert!(!tree[1].has_children);
    }

    #[tokio::test]
    async fn test_find_menu_tree_propagates_filter() {
        let svc = service();
        let root = add(&svc, "Root", None).await;
        let shown = add(&svc, "Shown", Some(root)).await;
        let hidden = add(&svc, "Hidden", Some(root)).await;
        svc.update(
            hidden,
            UpdateMenuRequest {
                is_active: Some(false),
                ..Default::default()
            },
            ACTOR,
        )
        .await
        .unwrap();

        let filter = MenuFilter {
            is_active: Some(true),
            ..Default::default()
        };
        let tree = svc.find_menu_tree(&filter).await.unwrap();
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].id, shown);
    }

    #[tokio::test]
    async fn test_find_one() {
        let svc = service();
        let root = add(&svc, "Root", None).await;
        let child = add(&svc, "Child", Some(root)).await;

        let found = svc.find_one(root).await.unwrap();
        assert!(found.has_children);
        assert!(found.children.is_empty());
        assert!(!svc.find_one(child).await.unwrap().has_children);

        svc.remove(child, ACTOR).await.unwrap();
        assert!(matches!(
            svc.find_one(child).await,
            Err(AppError::MenuNotFound(_))
        ));
        assert!(!svc.find_one(root).await.unwrap().has_children);
    }

    #[tokio::test]
    async fn test_children_and_level_lookups() {
        let svc = service();
        let root = add(&svc, "Root", None).await;
        let a = add(&svc, "A", Some(root)).await;
        let b = add(&svc, "B", Some(root)).await;
        add(&svc, "AA", Some(a)).await;

        let children: Vec<i64> = svc
            .find_children(root)
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(children, vec![a, b]);
        assert_eq!(svc.find_by_level(2).await.unwrap().len(), 2);
        assert_eq!(svc.find_by_level(3).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_self_parent() {
        let svc = service();
        let id = add(&svc, "Node", None).await;
        let before = stored(&svc, id).await;

        let err = svc
            .update(id, UpdateMenuRequest::reparent(Some(id)), ACTOR)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SelfParent(_)));
        assert_eq!(stored(&svc, id).await, before);
    }

    #[tokio::test]
    async fn test_update_cycle() {
        let svc = service();
        let a = add(&svc, "A", None).await;
        let b = add(&svc, "B", Some(a)).await;
        let c = add(&svc, "C", Some(b)).await;
        let before = stored(&svc, a).await;

        let mut patch = UpdateMenuRequest::reparent(Some(c));
        patch.name = Some("Renamed".to_string());
        let err = svc.update(a, patch, ACTOR).await.unwrap_err();
        assert!(matches!(err, AppError::CycleDetected { id, parent_id } if id == a && parent_id == c));
        assert_eq!(stored(&svc, a).await, before);
    }

    #[tokio::test]
    async fn test_update_to_missing_parent() {
        let svc = service();
        let a = add(&svc, "A", None).await;
        assert_err!(
            svc.update(a, UpdateMenuRequest::reparent(Some(99)), ACTOR)
                .await
        );
    }

    #[tokio::test]
    async fn test_reparent_relevels_descendants() {
        let svc = service();
        let a = add(&svc, "A", None).await;
        let b = add(&svc, "B", None).await;
        let c = add(&svc, "C", Some(b)).await;
        let d = add(&svc, "D", Some(c)).await;

        let moved = svc
            .update(b, UpdateMenuRequest::reparent(Some(a)), ACTOR)
            .await
            .unwrap();
        assert_eq!(moved.parent_id, Some(a));
        assert_eq!(moved.level, 2);
        assert_eq!(stored(&svc, c).await.level, 3);
        assert_eq!(stored(&svc, d).await.level, 4);

        let back = svc
            .update(b, UpdateMenuRequest::reparent(None), ACTOR)
            .await
            .unwrap();
        assert_eq!(back.level, 1);
        assert!(back.parent_id.is_none());
        assert_eq!(stored(&svc, c).await.level, 2);
        assert_eq!(stored(&svc, d).await.level, 3);
    }

    #[tokio::test]
    async fn test_reparent_respects_depth_limit() {
        let svc = service();
        let mut deep = add(&svc, "L1", None).await;
        for level in 2..MAX_DEPTH {
            deep = add(&svc, &format!("L{}", level), Some(deep)).await;
        }
        let moving = add(&svc, "Moving", None).await;
        let leaf = add(&svc, "Leaf", Some(moving)).await;

        let err = svc
            .update(moving, UpdateMenuRequest::reparent(Some(deep)), ACTOR)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(stored(&svc, moving).await.level, 1);
        assert_eq!(stored(&svc, leaf).await.level, 2);
    }

    #[tokio::test]
    async fn test_update_plain_fields() {
        let svc = service();
        let id = add(&svc, "Old", None).await;
        let patch = UpdateMenuRequest {
            name: Some("New".to_string()),
            url: Some(Some("/new".to_string())),
            ..Default::default()
        };

        let updated = svc.update(id, patch, "editor").await.unwrap();
        assert_eq!(updated.name, "New");
        assert_eq!(updated.url.as_deref(), Some("/new"));
        assert_eq!(updated.level, 1);
        assert_eq!(updated.created_by.as_deref(), Some(ACTOR));
        assert_eq!(updated.updated_by.as_deref(), Some("editor"));
    }

    #[tokio::test]
    async fn test_remove_cascades() {
        let svc = service();
        let a = add(&svc, "A", None).await;
        let b = add(&svc, "B", Some(a)).await;
        let c = add(&svc, "C", Some(b)).await;
        let other = add(&svc, "Other", None).await;

        assert_ok!(svc.remove(a, ACTOR).await);
        for id in [a, b, c] {
            let record = stored(&svc, id).await;
            assert!(record.deleted);
            assert_eq!(record.updated_by.as_deref(), Some(ACTOR));
        }
        let remaining = svc.find_all(&MenuFilter::default()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, other);
        assert_eq!(svc.repository().len().await, 4);
    }

    #[tokio::test]
    async fn test_remove_restrict() {
        let svc = service().with_delete_policy(DeletePolicy::Restrict);
        let a = add(&svc, "A", None).await;
        let b = add(&svc, "B", Some(a)).await;

        assert!(matches!(svc.remove(a, ACTOR).await, Err(AppError::HasChildren(_))));
        assert!(!stored(&svc, a).await.deleted);

        assert_ok!(svc.remove(b, ACTOR).await);
        assert_ok!(svc.remove(a, ACTOR).await);
        assert!(matches!(svc.remove(a, ACTOR).await, Err(AppError::MenuNotFound(_))));
    }

    #[tokio::test]
    async fn test_purge() {
        let svc = service();
        let a = add(&svc, "A", None).await;
        let b = add(&svc, "B", Some(a)).await;

        assert!(matches!(svc.purge(a).await, Err(AppError::HasChildren(_))));
        assert_ok!(svc.purge(b).await);
        assert_ok!(svc.purge(a).await);
        assert!(svc.repository().is_empty().await);
        assert!(matches!(svc.purge(a).await, Err(AppError::MenuNotFound(_))));
    }

    #[tokio::test]
    async fn test_purge_takes_soft_deleted_descendants() {
        let svc = service();
        let a = add(&svc, "A", None).await;
        let b = add(&svc, "B", Some(a)).await;
        let c = add(&svc, "C", Some(b)).await;
        let keep = add(&svc, "Keep", None).await;

        svc.remove(b, "admin").await.unwrap();
        assert!(stored(&svc, c).await.deleted);

        assert_ok!(svc.purge(a).await);
        assert_eq!(svc.repository().len().await, 1);
        assert!(svc.repository().find_by_id(c).await.unwrap().is_none());
        assert!(svc.repository().find_by_id(keep).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reorder() {
        let svc = service();
        for name in ["a", "b", "c", "d", "e", "f", "g", "h"] {
            add(&svc, name, None).await;
        }

        svc.reorder(&[5, 3, 8]).await.unwrap();
        assert_eq!(stored(&svc, 5).await.sort_order, 1);
        assert_eq!(stored(&svc, 3).await.sort_order, 2);
        assert_eq!(stored(&svc, 8).await.sort_order, 3);
        assert_eq!(stored(&svc, 1).await.sort_order, 0);
    }

    #[tokio::test]
    async fn test_reorder_rejects_before_writing() {
        let svc = service();
        let a = add(&svc, "A", None).await;
        let b = add(&svc, "B", None).await;

        assert!(matches!(
            svc.reorder(&[a, b, a]).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            svc.reorder(&[b, 77]).await,
            Err(AppError::MenuNotFound(77))
        ));
        assert_eq!(stored(&svc, b).await.sort_order, 0);
        assert_ok!(svc.reorder(&[]).await);
    }

    #[tokio::test]
    async fn test_find_user_menus() {
        let svc = service();
        let root = add(&svc, "Root", None).await;
        let child = add(&svc, "Child", Some(root)).await;
        let secret = add(&svc, "Secret", Some(root)).await;
        let hidden = add(&svc, "Hidden", None).await;
        svc.update(
            hidden,
            UpdateMenuRequest {
                is_visible: Some(false),
                ..Default::default()
            },
            ACTOR,
        )
        .await
        .unwrap();

        let repo = svc.repository();
        repo.grant(root, "ADMIN", true).await;
        repo.grant(root, "USER", true).await;
        repo.grant(child, "USER", true).await;
        repo.grant(secret, "USER", false).await;
        repo.grant(hidden, "USER", true).await;

        let roles = vec!["ADMIN".to_string(), "USER".to_string()];
        let tree = svc.find_user_menus(ACTOR, &roles).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, root);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].id, child);

        assert!(svc.find_user_menus(ACTOR, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_path() {
        let svc = service();
        let mut req = CreateMenuRequest::new("Admin");
        req.url = Some("/admin/".to_string());
        let admin = svc.create(req, ACTOR).await.unwrap().id;
        let mut req = CreateMenuRequest::new("Users").under(admin);
        req.url = Some("/users".to_string());
        let users = svc.create(req, ACTOR).await.unwrap().id;
        let mut req = CreateMenuRequest::new("Roles").under(users);
        req.url = Some("roles".to_string());
        let roles = svc.create(req, ACTOR).await.unwrap().id;
        let bare = add(&svc, "Bare", None).await;
        let mut req = CreateMenuRequest::new("Under bare").under(bare);
        req.url = Some("/x".to_string());
        let under_bare = svc.create(req, ACTOR).await.unwrap().id;

        assert_eq!(svc.full_path(admin).await.unwrap(), "/admin/");
        assert_eq!(svc.full_path(users).await.unwrap(), "/admin/users");
        assert_eq!(svc.full_path(roles).await.unwrap(), "/admin/users/roles");
        assert_eq!(svc.full_path(bare).await.unwrap(), "");
        assert_eq!(svc.full_path(under_bare).await.unwrap(), "/x");
    }

    #[test]
    fn test_collapse_slashes() {
        assert_eq!(collapse_slashes("//a///b/"), "/a/b/");
        assert_eq!(collapse_slashes("a"), "a");
    }
}
