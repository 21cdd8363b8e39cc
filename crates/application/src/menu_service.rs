use std::sync::Arc;

use freightdesk_domain::{
    EffectivePermissionContext, MenuConfigEntry, MenuGroup, default_menu_config,
};
use tracing::warn;

use crate::permission_ports::{
    MenuConfigRepository, PermissionCache, PermissionCacheKey, PermissionCachePayload,
};

/// Projects menu configuration into what a resolved context may see.
///
/// Configuration comes from the menu table when a repository is wired, the
/// built-in table otherwise; a failing or empty table falls back to the
/// built-in one so navigation never disappears.
#[derive(Clone)]
pub struct MenuService {
    repository: Option<Arc<dyn MenuConfigRepository>>,
    cache: Arc<dyn PermissionCache>,
    static_entries: Vec<MenuConfigEntry>,
}

impl MenuService {
    /// Creates the service; pass `None` to serve the built-in menu only.
    #[must_use]
    pub fn new(
        repository: Option<Arc<dyn MenuConfigRepository>>,
        cache: Arc<dyn PermissionCache>,
    ) -> Self {
        Self {
            repository,
            cache,
            static_entries: default_menu_config(),
        }
    }

    /// Returns the menu groups visible to one resolved context.
    pub async fn menu_for(&self, context: &EffectivePermissionContext) -> Vec<MenuGroup> {
        let entries = self.load_entries().await;
        let groups = MenuGroup::assemble(&entries);
        MenuGroup::visible_for(&groups, context)
    }

    /// Maps a route back to its menu key, when one is configured.
    pub async fn menu_key_for_url(&self, url: &str) -> Option<String> {
        self.load_entries()
            .await
            .into_iter()
            .find(|entry| entry.is_active && entry.url.as_deref() == Some(url))
            .map(|entry| entry.key)
    }

    /// Returns whether a context may open a route.
    ///
    /// Unknown routes are denied for everyone, administrators included; a
    /// route has to be in the menu table before anyone can be authorized
    /// for it.
    pub async fn check_url_access(
        &self,
        context: &EffectivePermissionContext,
        url: &str,
    ) -> bool {
        match self.menu_key_for_url(url).await {
            Some(key) => context.has_menu_access(&key),
            None => false,
        }
    }

    /// Drops the cached menu configuration and eagerly refetches it.
    pub async fn refresh(&self) {
        self.cache.invalidate(&PermissionCacheKey::MenuConfig).await;
        self.load_entries().await;
    }

    async fn load_entries(&self) -> Vec<MenuConfigEntry> {
        let Some(repository) = &self.repository else {
            return self.static_entries.clone();
        };

        match self.cache.get(&PermissionCacheKey::MenuConfig).await {
            Some(PermissionCachePayload::MenuConfig(rows)) => return rows,
            Some(_) => {
                warn!("cached menu payload had the wrong shape; refetching");
                self.cache.invalidate(&PermissionCacheKey::MenuConfig).await;
            }
            None => {}
        }

        match repository.fetch_menu_config().await {
            Ok(rows) if rows.is_empty() => {
                warn!("menu table is empty; serving the built-in menu");
                self.static_entries.clone()
            }
            Ok(rows) => {
                self.cache
                    .set(
                        PermissionCacheKey::MenuConfig,
                        PermissionCachePayload::MenuConfig(rows.clone()),
                    )
                    .await;
                rows
            }
            Err(error) => {
                warn!(%error, "menu fetch failed; serving the built-in menu");
                self.static_entries.clone()
            }
        }
    }
}
