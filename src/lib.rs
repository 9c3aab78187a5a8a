//! Menuhub - auth, boards and hierarchical menus over HTTP
//!
//! The menu engine in [`menu`] is storage-agnostic; everything else is the
//! axum/sea-orm service around it.

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod jwt;
pub mod menu;
pub mod middleware;
pub mod pagination;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
