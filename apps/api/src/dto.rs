mod admin;
mod common;
mod menu;
mod permissions;

pub use admin::{
    ApplyTemplateRequest, BulkRoleUpdateRequest, BulkStatusUpdateRequest, CopyPermissionsRequest,
    ResetOverridesRequest, RoleTemplateResponse, SaveRoleTemplateRequest,
    SaveUserOverrideRequest, SaveUserOverridesRequest, UserOverrideResponse,
};
pub use common::{GenericMessageResponse, HealthResponse};
pub use menu::{MenuGroupResponse, UrlAccessResponse};
pub use permissions::{
    PermissionCheckResponse, PermissionContextResponse, ProjectResponse,
};
