use freightdesk_domain::{EffectivePermissionContext, ProjectRef};
use serde::Serialize;
use ts_rs::TS;

/// Resolved permission context for the calling user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-context-response.ts"
)]
pub struct PermissionContextResponse {
    pub user_id: String,
    pub role: String,
    pub current_project: Option<String>,
    pub is_admin: bool,
    pub menu_permissions: Vec<String>,
    pub function_permissions: Vec<String>,
    pub project_permissions: Vec<String>,
    pub data_permissions: Vec<String>,
}

impl From<&EffectivePermissionContext> for PermissionContextResponse {
    fn from(context: &EffectivePermissionContext) -> Self {
        Self {
            user_id: context.user_id.to_string(),
            role: context.role.as_str().to_owned(),
            current_project: context.current_project.map(|id| id.to_string()),
            is_admin: context.is_admin(),
            menu_permissions: context.permissions.menu.iter().cloned().collect(),
            function_permissions: context.permissions.function.iter().cloned().collect(),
            project_permissions: context.permissions.project.iter().cloned().collect(),
            data_permissions: context.permissions.data.iter().cloned().collect(),
        }
    }
}

/// Outcome of a single permission check.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/permission-check-response.ts"
)]
pub struct PermissionCheckResponse {
    pub allowed: bool,
}

/// Project reference entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/project-response.ts"
)]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
}

impl From<ProjectRef> for ProjectResponse {
    fn from(project: ProjectRef) -> Self {
        Self {
            id: project.id.to_string(),
            name: project.name,
        }
    }
}
