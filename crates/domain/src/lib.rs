//! Domain entities and invariants for the permission engine.

#![forbid(unsafe_code)]

mod context;
mod menu;
mod permission;
mod role;
mod role_template;
mod user;
mod user_override;

pub use context::EffectivePermissionContext;
pub use menu::{MenuConfigEntry, MenuGroup, MenuItem, default_menu_config};
pub use permission::{PermissionCategory, PermissionSets};
pub use role::Role;
pub use role_template::RoleTemplate;
pub use user::{ProjectRef, UserProfile};
pub use user_override::UserPermissionOverride;
