use freightdesk_core::{ProjectId, UserId};
use serde::{Deserialize, Serialize};

use crate::Role;

/// Profile fields the permission engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Profile owner.
    pub user_id: UserId,
    /// Assigned role.
    pub role: Role,
    /// Deactivated users resolve to no access.
    pub is_active: bool,
    /// Display name shown in admin listings.
    pub display_name: String,
}

/// Reference-list entry for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    /// Project identifier.
    pub id: ProjectId,
    /// Project display name.
    pub name: String,
}
