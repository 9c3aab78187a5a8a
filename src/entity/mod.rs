//! Entity module - SeaORM entity definitions
//!
//! One module per table

pub mod board;
pub mod menu;
pub mod menu_permission;
pub mod user;
