//! Application services and ports for the permission engine.

#![forbid(unsafe_code)]

mod menu_service;
mod permission_admin_service;
mod permission_ports;
mod permission_service;
#[cfg(test)]
mod test_support;

pub use menu_service::MenuService;
pub use permission_admin_service::PermissionAdminService;
pub use permission_ports::{
    MenuConfigRepository, PermissionCache, PermissionCacheKey, PermissionCachePayload,
    PermissionChangeEvent, PermissionChangeSource, PermissionDataset, PermissionSourceRepository,
    run_invalidation_listener,
};
pub use permission_service::{EffectivePermissionResolver, PermissionService};
