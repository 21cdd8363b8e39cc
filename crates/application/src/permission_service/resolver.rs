use std::sync::Arc;
use std::time::Duration;

use freightdesk_core::{ProjectId, UserId};
use freightdesk_domain::{
    EffectivePermissionContext, PermissionSets, ProjectRef, Role, RoleTemplate,
    UserPermissionOverride, UserProfile,
};
use tokio::time::timeout;
use tracing::warn;

use crate::permission_ports::{
    PermissionCache, PermissionCacheKey, PermissionCachePayload, PermissionSourceRepository,
};

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Computes effective permission contexts from cached store data.
///
/// Resolution is infallible: any fetch failure, timeout, malformed cached
/// payload or missing profile degrades toward "no access" and is logged,
/// never propagated.
#[derive(Clone)]
pub struct EffectivePermissionResolver {
    repository: Arc<dyn PermissionSourceRepository>,
    cache: Arc<dyn PermissionCache>,
    fetch_timeout: Duration,
}

impl EffectivePermissionResolver {
    /// Creates a resolver over the backing-store and cache ports.
    #[must_use]
    pub fn new(
        repository: Arc<dyn PermissionSourceRepository>,
        cache: Arc<dyn PermissionCache>,
    ) -> Self {
        Self {
            repository,
            cache,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Overrides the backing-store fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Resolves the effective context for one user and scope.
    ///
    /// When `role` is `None` it is read from the cached profile; a missing
    /// or deactivated profile resolves to the empty context. A role whose
    /// template row is absent falls back to the hard-coded default
    /// template; an unreachable store with a cold cache resolves to empty
    /// sets instead (deny, do not guess).
    pub async fn resolve(
        &self,
        user_id: UserId,
        role: Option<Role>,
        project: Option<ProjectId>,
    ) -> EffectivePermissionContext {
        let role = match role {
            Some(role) => role,
            None => match self.load_profile(user_id).await {
                Some(profile) if profile.is_active => profile.role,
                Some(_) | None => return EffectivePermissionContext::empty(user_id, project),
            },
        };

        let templates = self.load_role_templates().await;
        let overrides = self.load_user_overrides(user_id).await;

        let user_override = overrides
            .as_deref()
            .and_then(|rows| rows.iter().find(|row| row.matches_scope(user_id, project)));

        match templates {
            Some(rows) => {
                let template = rows.iter().find(|template| template.role == role);
                EffectivePermissionContext::compute(user_id, role, project, template, user_override)
            }
            None => {
                // Store unreachable and nothing cached: pass an empty
                // template so the hard-coded defaults are not granted on
                // the strength of no data at all.
                let unavailable = RoleTemplate {
                    permissions: PermissionSets::empty(),
                    ..RoleTemplate::default_for(role)
                };
                EffectivePermissionContext::compute(
                    user_id,
                    role,
                    project,
                    Some(&unavailable),
                    user_override,
                )
            }
        }
    }

    /// Drops every cached entry, then eagerly rewarms the shared datasets.
    pub(crate) async fn refresh(&self) {
        self.cache.invalidate_all().await;
        self.load_role_templates().await;
        self.load_projects().await;
    }

    pub(crate) async fn load_role_templates(&self) -> Option<Vec<RoleTemplate>> {
        match self.cache.get(&PermissionCacheKey::RoleTemplates).await {
            Some(PermissionCachePayload::RoleTemplates(rows)) => return Some(rows),
            Some(_) => {
                warn!("cached role template payload had the wrong shape; refetching");
                self.cache.invalidate(&PermissionCacheKey::RoleTemplates).await;
            }
            None => {}
        }

        match timeout(self.fetch_timeout, self.repository.fetch_role_templates()).await {
            Ok(Ok(rows)) => {
                self.cache
                    .set(
                        PermissionCacheKey::RoleTemplates,
                        PermissionCachePayload::RoleTemplates(rows.clone()),
                    )
                    .await;
                Some(rows)
            }
            Ok(Err(error)) => {
                warn!(%error, "role template fetch failed");
                None
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.fetch_timeout.as_secs(),
                    "role template fetch timed out"
                );
                None
            }
        }
    }

    pub(crate) async fn load_user_overrides(
        &self,
        user_id: UserId,
    ) -> Option<Vec<UserPermissionOverride>> {
        let key = PermissionCacheKey::UserOverrides(user_id);
        match self.cache.get(&key).await {
            Some(PermissionCachePayload::UserOverrides(rows)) => return Some(rows),
            Some(_) => {
                warn!(%user_id, "cached override payload had the wrong shape; refetching");
                self.cache.invalidate(&key).await;
            }
            None => {}
        }

        match timeout(self.fetch_timeout, self.repository.fetch_user_overrides(user_id)).await {
            Ok(Ok(rows)) => {
                self.cache
                    .set(key, PermissionCachePayload::UserOverrides(rows.clone()))
                    .await;
                Some(rows)
            }
            Ok(Err(error)) => {
                warn!(%user_id, %error, "user override fetch failed");
                None
            }
            Err(_) => {
                warn!(
                    %user_id,
                    timeout_secs = self.fetch_timeout.as_secs(),
                    "user override fetch timed out"
                );
                None
            }
        }
    }

    pub(crate) async fn load_profile(&self, user_id: UserId) -> Option<UserProfile> {
        let key = PermissionCacheKey::Profile(user_id);
        match self.cache.get(&key).await {
            Some(PermissionCachePayload::Profile(profile)) => return profile,
            Some(_) => {
                warn!(%user_id, "cached profile payload had the wrong shape; refetching");
                self.cache.invalidate(&key).await;
            }
            None => {}
        }

        match timeout(self.fetch_timeout, self.repository.fetch_profile(user_id)).await {
            Ok(Ok(profile)) => {
                self.cache
                    .set(key, PermissionCachePayload::Profile(profile.clone()))
                    .await;
                profile
            }
            Ok(Err(error)) => {
                warn!(%user_id, %error, "profile fetch failed");
                None
            }
            Err(_) => {
                warn!(
                    %user_id,
                    timeout_secs = self.fetch_timeout.as_secs(),
                    "profile fetch timed out"
                );
                None
            }
        }
    }

    pub(crate) async fn load_projects(&self) -> Option<Vec<ProjectRef>> {
        match self.cache.get(&PermissionCacheKey::Projects).await {
            Some(PermissionCachePayload::Projects(rows)) => return Some(rows),
            Some(_) => {
                warn!("cached project payload had the wrong shape; refetching");
                self.cache.invalidate(&PermissionCacheKey::Projects).await;
            }
            None => {}
        }

        match timeout(self.fetch_timeout, self.repository.fetch_projects()).await {
            Ok(Ok(rows)) => {
                self.cache
                    .set(
                        PermissionCacheKey::Projects,
                        PermissionCachePayload::Projects(rows.clone()),
                    )
                    .await;
                Some(rows)
            }
            Ok(Err(error)) => {
                warn!(%error, "project list fetch failed");
                None
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.fetch_timeout.as_secs(),
                    "project list fetch timed out"
                );
                None
            }
        }
    }
}
