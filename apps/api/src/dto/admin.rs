use std::str::FromStr;

use chrono::Utc;
use freightdesk_core::{AppError, ProjectId, UserId};
use freightdesk_domain::{PermissionSets, Role, RoleTemplate, UserPermissionOverride};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// API representation of a role template.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/role-template-response.ts"
)]
pub struct RoleTemplateResponse {
    pub role: String,
    pub display_name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub menu_permissions: Vec<String>,
    pub function_permissions: Vec<String>,
    pub project_permissions: Vec<String>,
    pub data_permissions: Vec<String>,
    pub is_system: bool,
    pub updated_at: String,
}

impl From<RoleTemplate> for RoleTemplateResponse {
    fn from(template: RoleTemplate) -> Self {
        Self {
            role: template.role.as_str().to_owned(),
            display_name: template.display_name,
            description: template.description,
            color: template.color,
            menu_permissions: template.permissions.menu.iter().cloned().collect(),
            function_permissions: template.permissions.function.iter().cloned().collect(),
            project_permissions: template.permissions.project.iter().cloned().collect(),
            data_permissions: template.permissions.data.iter().cloned().collect(),
            is_system: template.is_system,
            updated_at: template.updated_at.to_rfc3339(),
        }
    }
}

/// Incoming payload for role template creation or edits.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/save-role-template-request.ts"
)]
pub struct SaveRoleTemplateRequest {
    pub role: String,
    pub display_name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub menu_permissions: Vec<String>,
    pub function_permissions: Vec<String>,
    pub project_permissions: Vec<String>,
    pub data_permissions: Vec<String>,
}

impl SaveRoleTemplateRequest {
    pub fn into_template(self) -> Result<RoleTemplate, AppError> {
        let now = Utc::now();
        Ok(RoleTemplate {
            role: Role::from_str(self.role.as_str())?,
            display_name: self.display_name,
            description: self.description,
            color: self.color,
            permissions: PermissionSets::from_keys(
                self.menu_permissions,
                self.function_permissions,
                self.project_permissions,
                self.data_permissions,
            ),
            is_system: false,
            created_at: now,
            updated_at: now,
        })
    }
}

/// API representation of one user override row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-override-response.ts"
)]
pub struct UserOverrideResponse {
    pub user_id: String,
    pub project_id: Option<String>,
    pub menu_permissions: Vec<String>,
    pub function_permissions: Vec<String>,
    pub project_permissions: Vec<String>,
    pub data_permissions: Vec<String>,
    pub inherit_role: bool,
    #[ts(type = "unknown")]
    pub custom_settings: Value,
    pub updated_at: String,
}

impl From<UserPermissionOverride> for UserOverrideResponse {
    fn from(row: UserPermissionOverride) -> Self {
        Self {
            user_id: row.user_id.to_string(),
            project_id: row.project_id.map(|id| id.to_string()),
            menu_permissions: row.permissions.menu.iter().cloned().collect(),
            function_permissions: row.permissions.function.iter().cloned().collect(),
            project_permissions: row.permissions.project.iter().cloned().collect(),
            data_permissions: row.permissions.data.iter().cloned().collect(),
            inherit_role: row.inherit_role,
            custom_settings: row.custom_settings,
            updated_at: row.updated_at.to_rfc3339(),
        }
    }
}

/// One override row in a save request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/save-user-override-request.ts"
)]
pub struct SaveUserOverrideRequest {
    #[ts(type = "string")]
    pub user_id: uuid::Uuid,
    #[ts(type = "string | null")]
    pub project_id: Option<uuid::Uuid>,
    pub menu_permissions: Vec<String>,
    pub function_permissions: Vec<String>,
    pub project_permissions: Vec<String>,
    pub data_permissions: Vec<String>,
    pub inherit_role: bool,
    #[ts(type = "unknown")]
    pub custom_settings: Option<Value>,
}

impl SaveUserOverrideRequest {
    pub fn into_override(self) -> UserPermissionOverride {
        let mut row = UserPermissionOverride::new(
            UserId::from_uuid(self.user_id),
            self.project_id.map(ProjectId::from_uuid),
        );
        row.permissions = PermissionSets::from_keys(
            self.menu_permissions,
            self.function_permissions,
            self.project_permissions,
            self.data_permissions,
        );
        row.inherit_role = self.inherit_role;
        row.custom_settings = self.custom_settings.unwrap_or(Value::Null);
        row
    }
}

/// Incoming payload for batch override saves.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/save-user-overrides-request.ts"
)]
pub struct SaveUserOverridesRequest {
    pub overrides: Vec<SaveUserOverrideRequest>,
}

/// Incoming payload for resetting users to their role defaults.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/reset-overrides-request.ts"
)]
pub struct ResetOverridesRequest {
    #[ts(type = "Array<string>")]
    pub user_ids: Vec<uuid::Uuid>,
    #[ts(type = "string | null")]
    pub project_id: Option<uuid::Uuid>,
}

/// Incoming payload for pinning users to a role's template sets.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/apply-template-request.ts"
)]
pub struct ApplyTemplateRequest {
    pub role: String,
    #[ts(type = "Array<string>")]
    pub user_ids: Vec<uuid::Uuid>,
}

/// Incoming payload for copying one user's overrides onto others.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/copy-permissions-request.ts"
)]
pub struct CopyPermissionsRequest {
    #[ts(type = "string")]
    pub source_user_id: uuid::Uuid,
    #[ts(type = "Array<string>")]
    pub target_user_ids: Vec<uuid::Uuid>,
}

/// Incoming payload for bulk role reassignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/bulk-role-update-request.ts"
)]
pub struct BulkRoleUpdateRequest {
    #[ts(type = "Array<string>")]
    pub user_ids: Vec<uuid::Uuid>,
    pub role: String,
}

/// Incoming payload for bulk activation or deactivation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/bulk-status-update-request.ts"
)]
pub struct BulkStatusUpdateRequest {
    #[ts(type = "Array<string>")]
    pub user_ids: Vec<uuid::Uuid>,
    pub is_active: bool,
}
