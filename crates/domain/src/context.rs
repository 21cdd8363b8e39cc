use freightdesk_core::{ProjectId, UserId};
use serde::{Deserialize, Serialize};

use crate::{PermissionCategory, PermissionSets, Role, RoleTemplate, UserPermissionOverride};

/// Resolved permissions for one user in one scope at a point in time.
///
/// The context is derived, never persisted, and never mutated in place;
/// every resolution produces a fresh value. All membership checks are pure
/// reads over the resolved sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePermissionContext {
    /// User the context was resolved for.
    pub user_id: UserId,
    /// Role the resolution used.
    pub role: Role,
    /// Project scope of the resolution, when set.
    pub current_project: Option<ProjectId>,
    /// Effective permission sets.
    pub permissions: PermissionSets,
}

impl EffectivePermissionContext {
    /// Computes the effective sets from a role template and an optional
    /// override.
    ///
    /// Merge precedence:
    /// - no override: template sets, or the hard-coded default for the role
    ///   when the store holds no template;
    /// - override with `inherit_role == false`: override sets exactly;
    /// - override with `inherit_role == true`: per-category union of the
    ///   template-or-default sets and the override sets.
    #[must_use]
    pub fn compute(
        user_id: UserId,
        role: Role,
        current_project: Option<ProjectId>,
        template: Option<&RoleTemplate>,
        user_override: Option<&UserPermissionOverride>,
    ) -> Self {
        let role_sets = template
            .map(|found| found.permissions.clone())
            .unwrap_or_else(|| RoleTemplate::default_for(role).permissions);

        let permissions = match user_override {
            None => role_sets,
            Some(found) if !found.inherit_role => found.permissions.clone(),
            Some(found) => role_sets.union(&found.permissions),
        };

        Self {
            user_id,
            role,
            current_project,
            permissions,
        }
    }

    /// Creates a no-access context for callers awaiting data.
    ///
    /// Used on cold start and when the identity has no role yet: checks all
    /// fail but the context itself always exists.
    #[must_use]
    pub fn empty(user_id: UserId, current_project: Option<ProjectId>) -> Self {
        Self {
            user_id,
            role: Role::Viewer,
            current_project,
            permissions: PermissionSets::empty(),
        }
    }

    /// Returns whether the context belongs to an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns whether a key is granted in one category.
    ///
    /// Administrators bypass explicit set membership entirely.
    #[must_use]
    pub fn has_access(&self, category: PermissionCategory, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        if self.is_admin() {
            return true;
        }

        self.permissions.contains(category, key)
    }

    /// Menu category membership check.
    #[must_use]
    pub fn has_menu_access(&self, key: &str) -> bool {
        self.has_access(PermissionCategory::Menu, key)
    }

    /// Function category membership check.
    #[must_use]
    pub fn has_function_access(&self, key: &str) -> bool {
        self.has_access(PermissionCategory::Function, key)
    }

    /// Project category membership check.
    #[must_use]
    pub fn has_project_access(&self, key: &str) -> bool {
        self.has_access(PermissionCategory::Project, key)
    }

    /// Data category membership check.
    #[must_use]
    pub fn has_data_access(&self, key: &str) -> bool {
        self.has_access(PermissionCategory::Data, key)
    }

    /// Returns whether any of the keys is granted in any category.
    pub fn has_any_permission<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> bool {
        keys.into_iter().any(|key| self.holds_in_any_category(key))
    }

    /// Returns whether every key is granted in at least one category.
    pub fn has_all_permissions<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> bool {
        keys.into_iter().all(|key| self.holds_in_any_category(key))
    }

    /// Role membership shim for call sites that still branch on role names.
    #[must_use]
    pub fn has_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    fn holds_in_any_category(&self, key: &str) -> bool {
        PermissionCategory::all()
            .iter()
            .any(|category| self.has_access(*category, key))
    }
}
