//! `SeaORM` Entities

pub mod prelude;

pub mod activity;
pub mod permission;
pub mod role;
pub mod role_permission;
pub mod setting;
pub mod user;
pub mod user_role;
