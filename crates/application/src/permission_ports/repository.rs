use async_trait::async_trait;
use freightdesk_core::{AppResult, ProjectId, UserId};
use freightdesk_domain::{
    MenuConfigEntry, ProjectRef, Role, RoleTemplate, UserPermissionOverride, UserProfile,
};

/// Repository port for the permission backing store.
///
/// Fetches feed the cache; mutations are issued by the admin service and
/// followed by cache invalidation. Adapters must default missing override
/// fields (empty sets, `inherit_role = true`) instead of rejecting rows.
#[async_trait]
pub trait PermissionSourceRepository: Send + Sync {
    /// Returns every role template.
    async fn fetch_role_templates(&self) -> AppResult<Vec<RoleTemplate>>;

    /// Returns all overrides for one user, including the global row.
    async fn fetch_user_overrides(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>>;

    /// Returns the profile for one user, if it exists.
    async fn fetch_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>>;

    /// Returns the project reference list.
    async fn fetch_projects(&self) -> AppResult<Vec<ProjectRef>>;

    /// Creates or replaces the template for a role.
    async fn upsert_role_template(&self, template: RoleTemplate) -> AppResult<()>;

    /// Deletes the template for a role.
    ///
    /// System-template protection is the admin service's responsibility.
    async fn delete_role_template(&self, role: Role) -> AppResult<()>;

    /// Creates or replaces override rows, one per (user, project) pair.
    async fn upsert_user_overrides(
        &self,
        overrides: Vec<UserPermissionOverride>,
    ) -> AppResult<()>;

    /// Deletes the override rows for the given users in one scope.
    async fn delete_user_overrides(
        &self,
        user_ids: &[UserId],
        project_id: Option<ProjectId>,
    ) -> AppResult<()>;

    /// Reassigns the role on the given profiles.
    async fn update_profile_roles(&self, user_ids: &[UserId], role: Role) -> AppResult<()>;

    /// Activates or deactivates the given profiles.
    async fn update_profile_status(&self, user_ids: &[UserId], is_active: bool) -> AppResult<()>;
}

/// Repository port for the dynamic menu table.
#[async_trait]
pub trait MenuConfigRepository: Send + Sync {
    /// Returns every menu configuration row.
    async fn fetch_menu_config(&self) -> AppResult<Vec<MenuConfigEntry>>;
}
