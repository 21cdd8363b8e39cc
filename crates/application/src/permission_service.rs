use std::sync::Arc;

use freightdesk_core::{ProjectId, UserId};
use freightdesk_domain::{EffectivePermissionContext, PermissionCategory, ProjectRef, Role};

use crate::permission_ports::{PermissionCache, PermissionSourceRepository};

mod resolver;
#[cfg(test)]
mod tests;

pub use resolver::EffectivePermissionResolver;

/// Facade for permission checks; the only surface the rest of the
/// application may depend on.
///
/// Every method degrades instead of failing: a resolution problem yields a
/// deny, never an error on a render path.
#[derive(Clone)]
pub struct PermissionService {
    resolver: EffectivePermissionResolver,
}

impl PermissionService {
    /// Creates the facade over a resolver.
    #[must_use]
    pub fn new(resolver: EffectivePermissionResolver) -> Self {
        Self { resolver }
    }

    /// Creates the facade directly from the two ports.
    #[must_use]
    pub fn from_ports(
        repository: Arc<dyn PermissionSourceRepository>,
        cache: Arc<dyn PermissionCache>,
    ) -> Self {
        Self::new(EffectivePermissionResolver::new(repository, cache))
    }

    /// Resolves the effective context for a user in an optional project
    /// scope. Never fails; see the resolver for degradation rules.
    pub async fn context(
        &self,
        user_id: UserId,
        project: Option<ProjectId>,
    ) -> EffectivePermissionContext {
        self.resolver.resolve(user_id, None, project).await
    }

    /// Resolves a context for an already-known role, skipping the profile
    /// lookup.
    pub async fn context_for_role(
        &self,
        user_id: UserId,
        role: Role,
        project: Option<ProjectId>,
    ) -> EffectivePermissionContext {
        self.resolver.resolve(user_id, Some(role), project).await
    }

    /// Single-key membership check in one category.
    pub async fn check(
        &self,
        user_id: UserId,
        project: Option<ProjectId>,
        category: PermissionCategory,
        key: &str,
    ) -> bool {
        self.context(user_id, project).await.has_access(category, key)
    }

    /// Menu category check in the global scope.
    pub async fn has_menu_access(&self, user_id: UserId, key: &str) -> bool {
        self.check(user_id, None, PermissionCategory::Menu, key).await
    }

    /// Function category check in the global scope.
    pub async fn has_function_access(&self, user_id: UserId, key: &str) -> bool {
        self.check(user_id, None, PermissionCategory::Function, key).await
    }

    /// Project category check in the global scope.
    pub async fn has_project_access(&self, user_id: UserId, key: &str) -> bool {
        self.check(user_id, None, PermissionCategory::Project, key).await
    }

    /// Data category check in the global scope.
    pub async fn has_data_access(&self, user_id: UserId, key: &str) -> bool {
        self.check(user_id, None, PermissionCategory::Data, key).await
    }

    /// Returns whether the user currently resolves to an administrator.
    pub async fn is_admin(&self, user_id: UserId) -> bool {
        self.context(user_id, None).await.is_admin()
    }

    /// Returns the projects the user may see; empty when unavailable.
    ///
    /// Holders of the `project.view_all` key (administrators included) see
    /// the whole reference list; everyone else sees only the projects they
    /// hold a project-scoped override for.
    pub async fn accessible_projects(&self, user_id: UserId) -> Vec<ProjectRef> {
        let projects = self.resolver.load_projects().await.unwrap_or_default();
        let context = self.context(user_id, None).await;
        if context.is_admin() || context.has_project_access("project.view_all") {
            return projects;
        }

        let overrides = self
            .resolver
            .load_user_overrides(user_id)
            .await
            .unwrap_or_default();
        projects
            .into_iter()
            .filter(|project| {
                overrides
                    .iter()
                    .any(|row| row.project_id == Some(project.id))
            })
            .collect()
    }

    /// Drops every cached entry and eagerly refetches the shared datasets.
    ///
    /// Called after administrative bulk edits so the editor observes its
    /// own changes without waiting for the notification round-trip.
    pub async fn refresh(&self) {
        self.resolver.refresh().await;
    }
}
