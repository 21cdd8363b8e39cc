use std::collections::HashMap;

use async_trait::async_trait;
use freightdesk_application::{MenuConfigRepository, PermissionSourceRepository};
use freightdesk_core::{AppResult, ProjectId, UserId};
use freightdesk_domain::{
    MenuConfigEntry, ProjectRef, Role, RoleTemplate, UserPermissionOverride, UserProfile,
};
use tokio::sync::RwLock;

/// In-memory permission store for development and tests.
///
/// Serves as the backing store when no database is configured; the API
/// seeds it at startup.
#[derive(Default)]
pub struct InMemoryPermissionRepository {
    templates: RwLock<HashMap<Role, RoleTemplate>>,
    overrides: RwLock<HashMap<(UserId, Option<ProjectId>), UserPermissionOverride>>,
    profiles: RwLock<HashMap<UserId, UserProfile>>,
    projects: RwLock<Vec<ProjectRef>>,
    menu: RwLock<Vec<MenuConfigEntry>>,
}

impl InMemoryPermissionRepository {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a profile.
    pub async fn insert_profile(&self, profile: UserProfile) {
        self.profiles.write().await.insert(profile.user_id, profile);
    }

    /// Inserts a project reference.
    pub async fn insert_project(&self, project: ProjectRef) {
        self.projects.write().await.push(project);
    }

    /// Replaces the menu configuration rows.
    pub async fn set_menu_config(&self, entries: Vec<MenuConfigEntry>) {
        *self.menu.write().await = entries;
    }
}

#[async_trait]
impl PermissionSourceRepository for InMemoryPermissionRepository {
    async fn fetch_role_templates(&self) -> AppResult<Vec<RoleTemplate>> {
        Ok(self.templates.read().await.values().cloned().collect())
    }

    async fn fetch_user_overrides(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        Ok(self
            .overrides
            .read()
            .await
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn fetch_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn fetch_projects(&self) -> AppResult<Vec<ProjectRef>> {
        Ok(self.projects.read().await.clone())
    }

    async fn upsert_role_template(&self, template: RoleTemplate) -> AppResult<()> {
        self.templates.write().await.insert(template.role, template);
        Ok(())
    }

    async fn delete_role_template(&self, role: Role) -> AppResult<()> {
        self.templates.write().await.remove(&role);
        Ok(())
    }

    async fn upsert_user_overrides(
        &self,
        overrides: Vec<UserPermissionOverride>,
    ) -> AppResult<()> {
        let mut rows = self.overrides.write().await;
        for row in overrides {
            rows.insert((row.user_id, row.project_id), row);
        }
        Ok(())
    }

    async fn delete_user_overrides(
        &self,
        user_ids: &[UserId],
        project_id: Option<ProjectId>,
    ) -> AppResult<()> {
        self.overrides
            .write()
            .await
            .retain(|(user_id, scope), _| !(user_ids.contains(user_id) && *scope == project_id));
        Ok(())
    }

    async fn update_profile_roles(&self, user_ids: &[UserId], role: Role) -> AppResult<()> {
        let mut profiles = self.profiles.write().await;
        for user_id in user_ids {
            if let Some(profile) = profiles.get_mut(user_id) {
                profile.role = role;
            }
        }
        Ok(())
    }

    async fn update_profile_status(&self, user_ids: &[UserId], is_active: bool) -> AppResult<()> {
        let mut profiles = self.profiles.write().await;
        for user_id in user_ids {
            if let Some(profile) = profiles.get_mut(user_id) {
                profile.is_active = is_active;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MenuConfigRepository for InMemoryPermissionRepository {
    async fn fetch_menu_config(&self) -> AppResult<Vec<MenuConfigEntry>> {
        Ok(self.menu.read().await.clone())
    }
}
