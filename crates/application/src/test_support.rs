//! Fake port implementations shared by the service test modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use freightdesk_core::{AppError, AppResult, ProjectId, UserId};
use freightdesk_domain::{
    MenuConfigEntry, ProjectRef, Role, RoleTemplate, UserPermissionOverride, UserProfile,
};
use tokio::sync::Mutex;

use crate::permission_ports::{
    MenuConfigRepository, PermissionCache, PermissionCacheKey, PermissionCachePayload,
    PermissionDataset, PermissionSourceRepository,
};

/// In-memory backing store with a switchable failure mode.
#[derive(Default)]
pub(crate) struct FakeRepository {
    pub templates: Mutex<Vec<RoleTemplate>>,
    pub overrides: Mutex<Vec<UserPermissionOverride>>,
    pub profiles: Mutex<Vec<UserProfile>>,
    pub projects: Mutex<Vec<ProjectRef>>,
    pub fail_fetches: AtomicBool,
    pub template_fetches: AtomicU32,
    pub deleted_override_scopes: Mutex<Vec<(Vec<UserId>, Option<ProjectId>)>>,
}

impl FakeRepository {
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    fn unreachable_error(&self) -> Option<AppError> {
        self.fail_fetches
            .load(Ordering::SeqCst)
            .then(|| AppError::Internal("backing store unreachable".to_owned()))
    }
}

#[async_trait]
impl PermissionSourceRepository for FakeRepository {
    async fn fetch_role_templates(&self) -> AppResult<Vec<RoleTemplate>> {
        self.template_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.unreachable_error() {
            return Err(error);
        }
        Ok(self.templates.lock().await.clone())
    }

    async fn fetch_user_overrides(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        if let Some(error) = self.unreachable_error() {
            return Err(error);
        }
        Ok(self
            .overrides
            .lock()
            .await
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn fetch_profile(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        if let Some(error) = self.unreachable_error() {
            return Err(error);
        }
        Ok(self
            .profiles
            .lock()
            .await
            .iter()
            .find(|profile| profile.user_id == user_id)
            .cloned())
    }

    async fn fetch_projects(&self) -> AppResult<Vec<ProjectRef>> {
        if let Some(error) = self.unreachable_error() {
            return Err(error);
        }
        Ok(self.projects.lock().await.clone())
    }

    async fn upsert_role_template(&self, template: RoleTemplate) -> AppResult<()> {
        let mut templates = self.templates.lock().await;
        templates.retain(|existing| existing.role != template.role);
        templates.push(template);
        Ok(())
    }

    async fn delete_role_template(&self, role: Role) -> AppResult<()> {
        self.templates.lock().await.retain(|existing| existing.role != role);
        Ok(())
    }

    async fn upsert_user_overrides(
        &self,
        overrides: Vec<UserPermissionOverride>,
    ) -> AppResult<()> {
        let mut rows = self.overrides.lock().await;
        for incoming in overrides {
            rows.retain(|existing| {
                !(existing.user_id == incoming.user_id
                    && existing.project_id == incoming.project_id)
            });
            rows.push(incoming);
        }
        Ok(())
    }

    async fn delete_user_overrides(
        &self,
        user_ids: &[UserId],
        project_id: Option<ProjectId>,
    ) -> AppResult<()> {
        self.overrides.lock().await.retain(|existing| {
            !(user_ids.contains(&existing.user_id) && existing.project_id == project_id)
        });
        self.deleted_override_scopes
            .lock()
            .await
            .push((user_ids.to_vec(), project_id));
        Ok(())
    }

    async fn update_profile_roles(&self, user_ids: &[UserId], role: Role) -> AppResult<()> {
        for profile in self.profiles.lock().await.iter_mut() {
            if user_ids.contains(&profile.user_id) {
                profile.role = role;
            }
        }
        Ok(())
    }

    async fn update_profile_status(&self, user_ids: &[UserId], is_active: bool) -> AppResult<()> {
        for profile in self.profiles.lock().await.iter_mut() {
            if user_ids.contains(&profile.user_id) {
                profile.is_active = is_active;
            }
        }
        Ok(())
    }
}

/// Cache fake without expiry; entries live until invalidated.
#[derive(Default)]
pub(crate) struct MapCache {
    entries: Mutex<HashMap<PermissionCacheKey, PermissionCachePayload>>,
}

impl MapCache {
    pub async fn seed(&self, key: PermissionCacheKey, payload: PermissionCachePayload) {
        self.entries.lock().await.insert(key, payload);
    }
}

#[async_trait]
impl PermissionCache for MapCache {
    async fn get(&self, key: &PermissionCacheKey) -> Option<PermissionCachePayload> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn set(&self, key: PermissionCacheKey, payload: PermissionCachePayload) {
        self.entries.lock().await.insert(key, payload);
    }

    async fn invalidate(&self, key: &PermissionCacheKey) {
        self.entries.lock().await.remove(key);
    }

    async fn invalidate_dataset(&self, dataset: PermissionDataset) {
        self.entries
            .lock()
            .await
            .retain(|key, _| key.dataset() != dataset);
    }

    async fn invalidate_all(&self) {
        self.entries.lock().await.clear();
    }
}

/// Menu table fake with a switchable failure mode.
#[derive(Default)]
pub(crate) struct FakeMenuRepository {
    pub rows: Mutex<Vec<MenuConfigEntry>>,
    pub fail_fetches: AtomicBool,
    pub fetches: AtomicU32,
}

#[async_trait]
impl MenuConfigRepository for FakeMenuRepository {
    async fn fetch_menu_config(&self) -> AppResult<Vec<MenuConfigEntry>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(AppError::Internal("menu table unreachable".to_owned()));
        }
        Ok(self.rows.lock().await.clone())
    }
}
