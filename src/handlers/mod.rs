//! Request handlers module

pub mod auth;
pub mod board;
pub mod menu;
pub mod user;
