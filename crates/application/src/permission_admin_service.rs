use std::sync::Arc;

use chrono::Utc;
use freightdesk_core::{AppError, AppResult, ProjectId, UserId};
use freightdesk_domain::{Role, RoleTemplate, UserPermissionOverride};
use tracing::info;

use crate::permission_ports::{
    PermissionCache, PermissionDataset, PermissionSourceRepository,
};
use crate::permission_service::PermissionService;

/// Administrative edits to templates, overrides and role assignments.
///
/// Every operation requires the actor to be an administrator or to hold the
/// `manage_permissions` function key, and invalidates the affected cached
/// dataset so changes apply within one resolution.
#[derive(Clone)]
pub struct PermissionAdminService {
    repository: Arc<dyn PermissionSourceRepository>,
    cache: Arc<dyn PermissionCache>,
    permissions: PermissionService,
}

impl PermissionAdminService {
    /// Creates the admin service over the backing-store and cache ports.
    #[must_use]
    pub fn new(
        repository: Arc<dyn PermissionSourceRepository>,
        cache: Arc<dyn PermissionCache>,
        permissions: PermissionService,
    ) -> Self {
        Self {
            repository,
            cache,
            permissions,
        }
    }

    /// Lists all stored role templates, bypassing the cache for a fresh read.
    pub async fn list_role_templates(&self, actor: UserId) -> AppResult<Vec<RoleTemplate>> {
        self.ensure_can_manage(actor).await?;
        self.repository.fetch_role_templates().await
    }

    /// Creates or replaces the template for a role.
    ///
    /// The system flag of an existing template is preserved; edits cannot
    /// turn a seeded template into a deletable one.
    pub async fn save_role_template(
        &self,
        actor: UserId,
        mut template: RoleTemplate,
    ) -> AppResult<()> {
        self.ensure_can_manage(actor).await?;
        let existing = self.repository.fetch_role_templates().await?;
        if let Some(found) = existing.iter().find(|row| row.role == template.role) {
            template.is_system = found.is_system;
            template.created_at = found.created_at;
        }
        template.updated_at = Utc::now();
        let role = template.role;
        self.repository.upsert_role_template(template).await?;
        self.cache
            .invalidate_dataset(PermissionDataset::RoleTemplates)
            .await;
        info!(%actor, role = role.as_str(), "role template saved");
        Ok(())
    }

    /// Deletes a non-system role template; its role falls back to the
    /// hard-coded default.
    pub async fn delete_role_template(&self, actor: UserId, role: Role) -> AppResult<()> {
        self.ensure_can_manage(actor).await?;
        let templates = self.repository.fetch_role_templates().await?;
        match templates.iter().find(|template| template.role == role) {
            None => {
                return Err(AppError::NotFound(format!(
                    "no template stored for role {}",
                    role.as_str()
                )));
            }
            Some(template) if template.is_system => {
                return Err(AppError::Validation(format!(
                    "template for role {} is system-managed and cannot be deleted",
                    role.as_str()
                )));
            }
            Some(_) => {}
        }

        self.repository.delete_role_template(role).await?;
        self.cache
            .invalidate_dataset(PermissionDataset::RoleTemplates)
            .await;
        info!(%actor, role = role.as_str(), "role template deleted");
        Ok(())
    }

    /// Lists every override stored for one user.
    pub async fn list_user_overrides(
        &self,
        actor: UserId,
        user_id: UserId,
    ) -> AppResult<Vec<UserPermissionOverride>> {
        self.ensure_can_manage(actor).await?;
        self.repository.fetch_user_overrides(user_id).await
    }

    /// Creates or replaces overrides, one per (user, project) scope.
    pub async fn save_user_overrides(
        &self,
        actor: UserId,
        mut overrides: Vec<UserPermissionOverride>,
    ) -> AppResult<()> {
        self.ensure_can_manage(actor).await?;
        if overrides.is_empty() {
            return Err(AppError::Validation("no overrides to save".to_owned()));
        }

        let now = Utc::now();
        for row in &mut overrides {
            row.created_by.get_or_insert(actor);
            row.updated_at = now;
        }
        let affected = overrides.len();
        self.repository.upsert_user_overrides(overrides).await?;
        self.cache
            .invalidate_dataset(PermissionDataset::UserOverrides)
            .await;
        info!(%actor, affected, "user overrides saved");
        Ok(())
    }

    /// Deletes the overrides in one scope so the users fall back to their
    /// role templates.
    pub async fn reset_to_role_default(
        &self,
        actor: UserId,
        user_ids: &[UserId],
        project_id: Option<ProjectId>,
    ) -> AppResult<()> {
        self.ensure_can_manage(actor).await?;
        if user_ids.is_empty() {
            return Err(AppError::Validation("no users to reset".to_owned()));
        }

        self.repository
            .delete_user_overrides(user_ids, project_id)
            .await?;
        self.cache
            .invalidate_dataset(PermissionDataset::UserOverrides)
            .await;
        info!(%actor, affected = user_ids.len(), "user overrides reset to role defaults");
        Ok(())
    }

    /// Pins users to a role's current template sets via exclusive global
    /// overrides; later template edits no longer affect them.
    pub async fn apply_template_to_users(
        &self,
        actor: UserId,
        role: Role,
        user_ids: &[UserId],
    ) -> AppResult<()> {
        self.ensure_can_manage(actor).await?;
        if user_ids.is_empty() {
            return Err(AppError::Validation("no users to apply the template to".to_owned()));
        }

        let templates = self.repository.fetch_role_templates().await?;
        let permissions = templates
            .into_iter()
            .find(|template| template.role == role)
            .map_or_else(|| RoleTemplate::default_for(role).permissions, |t| t.permissions);

        let overrides = user_ids
            .iter()
            .map(|&user_id| {
                let mut row = UserPermissionOverride::new(user_id, None);
                row.permissions = permissions.clone();
                row.inherit_role = false;
                row.created_by = Some(actor);
                row
            })
            .collect();
        self.repository.upsert_user_overrides(overrides).await?;
        self.cache
            .invalidate_dataset(PermissionDataset::UserOverrides)
            .await;
        info!(%actor, role = role.as_str(), affected = user_ids.len(), "template applied to users");
        Ok(())
    }

    /// Copies one user's overrides (all scopes) onto a set of target users.
    pub async fn copy_user_permissions(
        &self,
        actor: UserId,
        source: UserId,
        targets: &[UserId],
    ) -> AppResult<()> {
        self.ensure_can_manage(actor).await?;
        if targets.is_empty() {
            return Err(AppError::Validation("no users to copy to".to_owned()));
        }

        let source_rows = self.repository.fetch_user_overrides(source).await?;
        if source_rows.is_empty() {
            return Err(AppError::NotFound(format!(
                "user {source} has no overrides to copy"
            )));
        }

        let now = Utc::now();
        let copies = targets
            .iter()
            .filter(|&&target| target != source)
            .flat_map(|&target| {
                source_rows.iter().map(move |row| UserPermissionOverride {
                    user_id: target,
                    created_by: Some(actor),
                    created_at: now,
                    updated_at: now,
                    ..row.clone()
                })
            })
            .collect();
        self.repository.upsert_user_overrides(copies).await?;
        self.cache
            .invalidate_dataset(PermissionDataset::UserOverrides)
            .await;
        info!(%actor, %source, affected = targets.len(), "user overrides copied");
        Ok(())
    }

    /// Reassigns a set of users to a role.
    pub async fn bulk_update_user_roles(
        &self,
        actor: UserId,
        user_ids: &[UserId],
        role: Role,
    ) -> AppResult<()> {
        self.ensure_can_manage(actor).await?;
        if user_ids.is_empty() {
            return Err(AppError::Validation("no users to reassign".to_owned()));
        }

        self.repository.update_profile_roles(user_ids, role).await?;
        self.cache
            .invalidate_dataset(PermissionDataset::Profiles)
            .await;
        info!(%actor, role = role.as_str(), affected = user_ids.len(), "user roles reassigned");
        Ok(())
    }

    /// Activates or deactivates a set of users.
    ///
    /// Deactivated users resolve to the empty context on their next check.
    pub async fn bulk_update_user_status(
        &self,
        actor: UserId,
        user_ids: &[UserId],
        is_active: bool,
    ) -> AppResult<()> {
        self.ensure_can_manage(actor).await?;
        if user_ids.is_empty() {
            return Err(AppError::Validation("no users to update".to_owned()));
        }

        self.repository.update_profile_status(user_ids, is_active).await?;
        self.cache
            .invalidate_dataset(PermissionDataset::Profiles)
            .await;
        info!(%actor, is_active, affected = user_ids.len(), "user status updated");
        Ok(())
    }

    async fn ensure_can_manage(&self, actor: UserId) -> AppResult<()> {
        let context = self.permissions.context(actor, None).await;
        if context.is_admin() || context.has_function_access("manage_permissions") {
            return Ok(());
        }

        Err(AppError::Forbidden(
            "permission management requires an administrator".to_owned(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use freightdesk_core::{AppError, UserId};
    use freightdesk_domain::{
        PermissionSets, Role, RoleTemplate, UserPermissionOverride, UserProfile,
    };

    use crate::permission_service::PermissionService;
    use crate::test_support::{FakeRepository, MapCache};

    use super::PermissionAdminService;

    struct Harness {
        repository: Arc<FakeRepository>,
        service: PermissionAdminService,
        admin: UserId,
        viewer: UserId,
    }

    async fn harness() -> Harness {
        let repository = Arc::new(FakeRepository::default());
        let cache = Arc::new(MapCache::default());
        let admin = UserId::new();
        let viewer = UserId::new();
        repository.profiles.lock().await.extend([
            UserProfile {
                user_id: admin,
                role: Role::Admin,
                is_active: true,
                display_name: "Admin".to_owned(),
            },
            UserProfile {
                user_id: viewer,
                role: Role::Viewer,
                is_active: true,
                display_name: "Viewer".to_owned(),
            },
        ]);

        let permissions = PermissionService::from_ports(repository.clone(), cache.clone());
        let service = PermissionAdminService::new(repository.clone(), cache, permissions);
        Harness {
            repository,
            service,
            admin,
            viewer,
        }
    }

    #[tokio::test]
    async fn non_admin_without_manage_key_is_forbidden() {
        let harness = harness().await;
        let result = harness
            .service
            .list_role_templates(harness.viewer)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn manage_permissions_key_grants_access_without_admin_role() {
        let harness = harness().await;
        let mut grant = UserPermissionOverride::new(harness.viewer, None);
        grant.permissions =
            PermissionSets::from_keys(vec![], vec!["manage_permissions"], vec![], vec![]);
        harness.repository.overrides.lock().await.push(grant);

        assert!(
            harness
                .service
                .list_role_templates(harness.viewer)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn system_templates_cannot_be_deleted() {
        let harness = harness().await;
        harness
            .repository
            .templates
            .lock()
            .await
            .push(RoleTemplate::default_for(Role::Finance));

        let result = harness
            .service
            .delete_role_template(harness.admin, Role::Finance)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(harness.repository.templates.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn deleting_a_custom_template_removes_it() {
        let harness = harness().await;
        let mut custom = RoleTemplate::default_for(Role::Partner);
        custom.is_system = false;
        harness.repository.templates.lock().await.push(custom);

        let result = harness
            .service
            .delete_role_template(harness.admin, Role::Partner)
            .await;
        assert!(result.is_ok());
        assert!(harness.repository.templates.lock().await.is_empty());
    }

    #[tokio::test]
    async fn saved_overrides_are_stamped_with_the_actor() {
        let harness = harness().await;
        let subject = UserId::new();
        let result = harness
            .service
            .save_user_overrides(harness.admin, vec![UserPermissionOverride::new(subject, None)])
            .await;
        assert!(result.is_ok());

        let rows = harness.repository.overrides.lock().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].created_by, Some(harness.admin));
    }

    #[tokio::test]
    async fn reset_records_the_requested_scope() {
        let harness = harness().await;
        let subject = UserId::new();
        harness
            .repository
            .overrides
            .lock()
            .await
            .push(UserPermissionOverride::new(subject, None));

        let result = harness
            .service
            .reset_to_role_default(harness.admin, &[subject], None)
            .await;
        assert!(result.is_ok());

        assert!(harness.repository.overrides.lock().await.is_empty());
        assert_eq!(
            harness.repository.deleted_override_scopes.lock().await.as_slice(),
            &[(vec![subject], None)]
        );
    }

    #[tokio::test]
    async fn apply_template_pins_users_with_exclusive_overrides() {
        let harness = harness().await;
        let subject = UserId::new();
        let result = harness
            .service
            .apply_template_to_users(harness.admin, Role::Finance, &[subject])
            .await;
        assert!(result.is_ok());

        let rows = harness.repository.overrides.lock().await;
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].inherit_role);
        assert_eq!(
            rows[0].permissions,
            RoleTemplate::default_for(Role::Finance).permissions
        );
    }

    #[tokio::test]
    async fn copy_skips_the_source_user_and_requires_source_rows() {
        let harness = harness().await;
        let source = UserId::new();
        let target = UserId::new();

        let empty = harness
            .service
            .copy_user_permissions(harness.admin, source, &[target])
            .await;
        assert!(matches!(empty, Err(AppError::NotFound(_))));

        let mut row = UserPermissionOverride::new(source, None);
        row.permissions = PermissionSets::from_keys(vec!["finance"], vec![], vec![], vec![]);
        harness.repository.overrides.lock().await.push(row);

        let result = harness
            .service
            .copy_user_permissions(harness.admin, source, &[target, source])
            .await;
        assert!(result.is_ok());

        let rows = harness.repository.overrides.lock().await;
        assert_eq!(rows.len(), 2);
        let copied = rows.iter().find(|row| row.user_id == target);
        assert!(
            copied
                .is_some_and(|row| row.permissions.menu.contains("finance")
                    && row.created_by == Some(harness.admin))
        );
    }

    #[tokio::test]
    async fn bulk_role_update_rewrites_profiles() {
        let harness = harness().await;
        let result = harness
            .service
            .bulk_update_user_roles(harness.admin, &[harness.viewer], Role::Operator)
            .await;
        assert!(result.is_ok());

        let profiles = harness.repository.profiles.lock().await;
        let profile = profiles
            .iter()
            .find(|profile| profile.user_id == harness.viewer);
        assert!(profile.is_some_and(|profile| profile.role == Role::Operator));
    }

    #[tokio::test]
    async fn bulk_status_update_locks_users_out() {
        let harness = harness().await;
        let result = harness
            .service
            .bulk_update_user_status(harness.admin, &[harness.viewer], false)
            .await;
        assert!(result.is_ok());

        let profiles = harness.repository.profiles.lock().await;
        let profile = profiles
            .iter()
            .find(|profile| profile.user_id == harness.viewer);
        assert!(profile.is_some_and(|profile| !profile.is_active));
        drop(profiles);

        // The deactivated user now resolves to the empty context.
        let context = harness.service.permissions.context(harness.viewer, None).await;
        assert!(context.permissions.is_empty());
    }

    #[tokio::test]
    async fn empty_batches_are_rejected() {
        let harness = harness().await;
        let result = harness
            .service
            .bulk_update_user_roles(harness.admin, &[], Role::Viewer)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
