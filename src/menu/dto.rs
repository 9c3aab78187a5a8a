//! Menu request/response shapes and the query filter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::entity::menu;
use crate::error::{AppError, AppResult};

fn default_true() -> bool {
    true
}

/// Keeps "field absent" (`None`) apart from "field is null" (`Some(None)`)
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn name_not_blank(name: Option<&str>) -> Result<(), ValidationError> {
    match name {
        Some(name) if name.trim().is_empty() => {
            Err(ValidationError::new("blank").with_message("name must not be blank".into()))
        }
        _ => Ok(()),
    }
}

fn create_rules(req: &CreateMenuRequest) -> Result<(), ValidationError> {
    name_not_blank(Some(&req.name))
}

fn update_rules(req: &UpdateMenuRequest) -> Result<(), ValidationError> {
    name_not_blank(req.name.as_deref())
}

/// POST /api/menus body
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "create_rules"))]
pub struct CreateMenuRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub url: Option<String>,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    #[validate(range(min = 1))]
    pub parent_id: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub menu_type: Option<String>,
    #[validate(length(max = 100))]
    pub permission: Option<String>,
    pub config: Option<String>,
}

impl CreateMenuRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            url: None,
            icon: None,
            parent_id: None,
            sort_order: 0,
            is_active: true,
            is_visible: true,
            menu_type: None,
            permission: None,
            config: None,
        }
    }

    pub fn under(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// PATCH /api/menus/:id body. Absent fields stay unchanged; `null` clears
/// a nullable field, and `parentId: null` moves the menu to the root.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "update_rules"))]
pub struct UpdateMenuRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 200))]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 255))]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 50))]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(range(min = 1))]
    pub parent_id: Option<Option<i64>>,
    #[validate(range(min = 0))]
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
    pub is_visible: Option<bool>,
    #[serde(default, rename = "type", deserialize_with = "double_option")]
    #[validate(length(max = 50))]
    pub menu_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 100))]
    pub permission: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub config: Option<Option<String>>,
}

impl UpdateMenuRequest {
    pub fn reparent(parent_id: Option<i64>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Default::default()
        }
    }

    /// Shallow merge of the plain fields. `parent_id` and `level` are owned
    /// by the engine and are not touched here.
    pub fn apply_to(self, menu: &mut menu::Model) {
        if let Some(name) = self.name {
            menu.name = name;
        }
        if let Some(description) = self.description {
            menu.description = description;
        }
        if let Some(url) = self.url {
            menu.url = url;
        }
        if let Some(icon) = self.icon {
            menu.icon = icon;
        }
        if let Some(sort_order) = self.sort_order {
            menu.sort_order = sort_order;
        }
        if let Some(is_active) = self.is_active {
            menu.is_active = is_active;
        }
        if let Some(is_visible) = self.is_visible {
            menu.is_visible = is_visible;
        }
        if let Some(menu_type) = self.menu_type {
            menu.menu_type = menu_type;
        }
        if let Some(permission) = self.permission {
            menu.permission = permission;
        }
        if let Some(config) = self.config {
            menu.config = config;
        }
    }
}

/// PATCH /api/menus/reorder body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub menu_ids: Vec<i64>,
}

/// Which live menus to return. Soft-deleted rows never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFilter {
    /// `None`: any parent, `Some(None)`: roots only, `Some(Some(id))`: children of `id`
    pub parent_id: Option<Option<i64>>,
    pub level: Option<i32>,
    pub is_active: Option<bool>,
    pub is_visible: Option<bool>,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
}

impl MenuFilter {
    pub fn roots() -> Self {
        Self {
            parent_id: Some(None),
            ..Default::default()
        }
    }

    pub fn children_of(id: i64) -> Self {
        Self {
            parent_id: Some(Some(id)),
            ..Default::default()
        }
    }

    pub fn at_level(level: i32) -> Self {
        Self {
            level: Some(level),
            ..Default::default()
        }
    }

    /// Same filter, pinned to one sibling group
    pub fn with_parent(&self, parent_id: Option<i64>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..self.clone()
        }
    }

    /// Lowercased, trimmed search term; blank means no search
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, menu: &menu::Model) -> bool {
        if menu.deleted {
            return false;
        }
        if let Some(parent_id) = self.parent_id {
            if menu.parent_id != parent_id {
                return false;
            }
        }
        if self.level.is_some_and(|level| menu.level != level) {
            return false;
        }
        if self.is_active.is_some_and(|active| menu.is_active != active) {
            return false;
        }
        if self.is_visible.is_some_and(|visible| menu.is_visible != visible) {
            return false;
        }
        match self.search_term() {
            Some(term) => {
                menu.name.to_lowercase().contains(&term)
                    || menu
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}

/// Query string of the menu list endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuQuery {
    /// A number, or `null` for root menus only
    pub parent_id: Option<String>,
    pub level: Option<i32>,
    pub is_active: Option<bool>,
    pub is_visible: Option<bool>,
    pub search: Option<String>,
}

impl MenuQuery {
    pub fn into_filter(self) -> AppResult<MenuFilter> {
        let parent_id = match self.parent_id.as_deref().map(str::trim) {
            None => None,
            Some("") | Some("null") => Some(None),
            Some(raw) => Some(Some(raw.parse::<i64>().map_err(|_| {
                AppError::Validation(format!("parentId must be a number or null, got {}", raw))
            })?)),
        };
        if self.level.is_some_and(|level| level < 1) {
            return Err(AppError::Validation("level must be at least 1".to_string()));
        }

        Ok(MenuFilter {
            parent_id,
            level: self.level,
            is_active: self.is_active,
            is_visible: self.is_visible,
            search: self.search,
        })
    }
}

/// Menu as returned to clients; `children` is only filled by tree queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: i32,
    pub level: i32,
    pub is_active: bool,
    pub is_visible: bool,
    #[serde(rename = "type")]
    pub menu_type: Option<String>,
    pub permission: Option<String>,
    pub config: Option<String>,
    pub created_dtm: DateTime<Utc>,
    pub updated_dtm: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub children: Vec<MenuResponse>,
    pub has_children: bool,
}

impl MenuResponse {
    /// Mapping for a record whose children were loaded alongside it
    pub fn with_loaded_children(model: menu::Model, children: &[menu::Model]) -> Self {
        let mut response = Self::from(model);
        response.has_children = !children.is_empty();
        response
    }
}

impl From<menu::Model> for MenuResponse {
    fn from(m: menu::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            url: m.url,
            icon: m.icon,
            parent_id: m.parent_id,
            sort_order: m.sort_order,
            level: m.level,
            is_active: m.is_active,
            is_visible: m.is_visible,
            menu_type: m.menu_type,
            permission: m.permission,
            config: m.config,
            created_dtm: m.created_dtm,
            updated_dtm: m.updated_dtm,
            created_by: m.created_by,
            updated_by: m.updated_by,
            children: Vec::new(),
            has_children: false,
        }
    }
}

/// Query string of GET /api/menus/user
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMenuQuery {
    /// Comma-separated role ids
    #[serde(default)]
    pub role_ids: String,
}

impl UserMenuQuery {
    pub fn role_ids(&self) -> Vec<String> {
        self.role_ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
