pub mod admin;
pub mod health;
pub mod menu;
pub mod permissions;
