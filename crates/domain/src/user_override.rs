use chrono::{DateTime, Utc};
use freightdesk_core::{ProjectId, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PermissionSets;

/// Per-user deviation from role defaults.
///
/// At most one override exists per (user, project) pair; a `project_id` of
/// `None` is the user's global override. `inherit_role` decides whether the
/// override's sets are unioned with the role template (additive) or replace
/// it entirely (exclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPermissionOverride {
    /// User the override applies to.
    pub user_id: UserId,
    /// Optional project scope; `None` means the global override.
    pub project_id: Option<ProjectId>,
    /// Override permission sets.
    pub permissions: PermissionSets,
    /// Additive (union with role template) when true, exclusive when false.
    pub inherit_role: bool,
    /// Opaque per-user settings; not interpreted by the resolver.
    pub custom_settings: Value,
    /// Administrator who created the override, when recorded.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl UserPermissionOverride {
    /// Creates an additive override with empty sets.
    #[must_use]
    pub fn new(user_id: UserId, project_id: Option<ProjectId>) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            project_id,
            permissions: PermissionSets::empty(),
            inherit_role: true,
            custom_settings: Value::Null,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns whether this override matches a resolution scope.
    ///
    /// A project-scoped resolution matches only the override for that exact
    /// project; a global resolution matches only the global override.
    #[must_use]
    pub fn matches_scope(&self, user_id: UserId, project_id: Option<ProjectId>) -> bool {
        self.user_id == user_id && self.project_id == project_id
    }
}

#[cfg(test)]
mod tests {
    use freightdesk_core::{ProjectId, UserId};

    use super::UserPermissionOverride;

    #[test]
    fn project_override_does_not_match_global_scope() {
        let user_id = UserId::new();
        let project_id = ProjectId::new();
        let scoped = UserPermissionOverride::new(user_id, Some(project_id));

        assert!(scoped.matches_scope(user_id, Some(project_id)));
        assert!(!scoped.matches_scope(user_id, None));
        assert!(!scoped.matches_scope(user_id, Some(ProjectId::new())));
    }
}
