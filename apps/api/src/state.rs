use freightdesk_application::{MenuService, PermissionAdminService, PermissionService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub permission_service: PermissionService,
    pub admin_service: PermissionAdminService,
    pub menu_service: MenuService,
}
