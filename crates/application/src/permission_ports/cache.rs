use async_trait::async_trait;
use freightdesk_core::UserId;
use freightdesk_domain::{
    MenuConfigEntry, ProjectRef, RoleTemplate, UserPermissionOverride, UserProfile,
};

/// Logical datasets held by the cache; change events are scoped to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionDataset {
    /// The role template collection.
    RoleTemplates,
    /// Per-user override collections.
    UserOverrides,
    /// Per-user profile records.
    Profiles,
    /// The project reference list.
    Projects,
    /// The dynamic menu table.
    MenuConfig,
}

/// Cache entry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionCacheKey {
    /// All role templates.
    RoleTemplates,
    /// Overrides for one user (all projects).
    UserOverrides(UserId),
    /// Profile for one user.
    Profile(UserId),
    /// The project reference list.
    Projects,
    /// The menu configuration rows.
    MenuConfig,
}

impl PermissionCacheKey {
    /// Returns the logical dataset this key belongs to.
    #[must_use]
    pub fn dataset(&self) -> PermissionDataset {
        match self {
            Self::RoleTemplates => PermissionDataset::RoleTemplates,
            Self::UserOverrides(_) => PermissionDataset::UserOverrides,
            Self::Profile(_) => PermissionDataset::Profiles,
            Self::Projects => PermissionDataset::Projects,
            Self::MenuConfig => PermissionDataset::MenuConfig,
        }
    }
}

/// Cached payload, one variant per dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum PermissionCachePayload {
    /// All role templates.
    RoleTemplates(Vec<RoleTemplate>),
    /// Overrides for one user.
    UserOverrides(Vec<UserPermissionOverride>),
    /// Profile lookup result (a missing profile is itself cacheable).
    Profile(Option<UserProfile>),
    /// The project reference list.
    Projects(Vec<ProjectRef>),
    /// The menu configuration rows.
    MenuConfig(Vec<MenuConfigEntry>),
}

/// In-process, time-expiring cache port.
///
/// Entries expire whole; an expired entry reads as a miss. Concurrent
/// misses may both fetch and both set; the last write wins, which is
/// acceptable because staleness is bounded by the TTL and by event-driven
/// invalidation.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Returns the payload when an entry exists and is younger than the TTL.
    async fn get(&self, key: &PermissionCacheKey) -> Option<PermissionCachePayload>;

    /// Stores a payload, unconditionally overwriting any prior entry.
    async fn set(&self, key: PermissionCacheKey, payload: PermissionCachePayload);

    /// Removes one entry; removing an absent entry is a no-op.
    async fn invalidate(&self, key: &PermissionCacheKey);

    /// Removes every entry belonging to one dataset.
    async fn invalidate_dataset(&self, dataset: PermissionDataset);

    /// Clears every entry.
    async fn invalidate_all(&self);
}
