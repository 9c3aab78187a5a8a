//! Menu hierarchy engine
//!
//! Menus form a forest linked by `parent_id`. The engine keeps three
//! invariants on the live (non-deleted) rows: no node is its own ancestor,
//! `level` equals the depth from the root, and removing a node never leaves
//! live orphans behind.
//!
//! Storage is reached only through [`repository::MenuRepository`]; the HTTP
//! layer plugs in the sea-orm implementation, tests use the in-memory one.

use serde::{Deserialize, Serialize};

pub mod checker;
pub mod dto;
#[cfg(test)]
pub(crate) mod memory;
pub mod repository;
pub mod service;
pub mod tree;

pub use dto::{CreateMenuRequest, MenuFilter, MenuResponse, UpdateMenuRequest};
pub use repository::{MenuFields, MenuRepository, SeaOrmMenuRepository};
pub use service::MenuService;

/// Deepest level a menu may sit at
pub const MAX_DEPTH: i32 = 10;

/// Upper bound for any parent-chain walk; only reached on corrupted data
pub const MAX_WALK: usize = 256;

/// How `remove` treats a menu that still has live children
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Soft-delete the whole subtree, deepest nodes first
    #[default]
    Cascade,
    /// Refuse with `HasChildren`
    Restrict,
}
