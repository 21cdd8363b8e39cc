use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use freightdesk_application::{
    PermissionCache, PermissionCacheKey, PermissionCachePayload, PermissionDataset,
};
use tokio::sync::RwLock;
use tokio::time::Instant;

const DEFAULT_TTL: Duration = Duration::from_secs(120);

struct CacheEntry {
    payload: PermissionCachePayload,
    expires_at: Instant,
}

/// In-process permission cache with per-entry expiry.
///
/// Entries expire whole after the configured TTL; an expired entry reads
/// as a miss and is removed lazily on the next access.
pub struct InMemoryPermissionCache {
    entries: RwLock<HashMap<PermissionCacheKey, CacheEntry>>,
    ttl: Duration,
}

impl InMemoryPermissionCache {
    /// Creates a cache with the default two-minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Creates a cache with a custom TTL.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

impl Default for InMemoryPermissionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PermissionCache for InMemoryPermissionCache {
    async fn get(&self, key: &PermissionCacheKey) -> Option<PermissionCachePayload> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Some(entry.payload.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // The entry was present but expired; drop it under the write lock,
        // rechecking in case a writer replaced it meanwhile.
        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= now)
        {
            entries.remove(key);
        }
        None
    }

    async fn set(&self, key: PermissionCacheKey, payload: PermissionCachePayload) {
        let entry = CacheEntry {
            payload,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    async fn invalidate(&self, key: &PermissionCacheKey) {
        self.entries.write().await.remove(key);
    }

    async fn invalidate_dataset(&self, dataset: PermissionDataset) {
        self.entries
            .write()
            .await
            .retain(|key, _| key.dataset() != dataset);
    }

    async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use freightdesk_application::{
        PermissionCache, PermissionCacheKey, PermissionCachePayload, PermissionDataset,
    };
    use freightdesk_core::UserId;

    use super::InMemoryPermissionCache;

    fn projects_payload() -> PermissionCachePayload {
        PermissionCachePayload::Projects(vec![])
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_the_ttl() {
        let cache = InMemoryPermissionCache::with_ttl(Duration::from_secs(120));
        cache
            .set(PermissionCacheKey::Projects, projects_payload())
            .await;

        tokio::time::advance(Duration::from_secs(119)).await;
        assert!(cache.get(&PermissionCacheKey::Projects).await.is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get(&PermissionCacheKey::Projects).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn set_restarts_the_clock() {
        let cache = InMemoryPermissionCache::with_ttl(Duration::from_secs(120));
        cache
            .set(PermissionCacheKey::Projects, projects_payload())
            .await;

        tokio::time::advance(Duration::from_secs(100)).await;
        cache
            .set(PermissionCacheKey::Projects, projects_payload())
            .await;

        tokio::time::advance(Duration::from_secs(100)).await;
        assert!(cache.get(&PermissionCacheKey::Projects).await.is_some());
    }

    #[tokio::test]
    async fn dataset_invalidation_spares_other_datasets() {
        let cache = InMemoryPermissionCache::new();
        let user_id = UserId::new();
        cache
            .set(PermissionCacheKey::Projects, projects_payload())
            .await;
        cache
            .set(
                PermissionCacheKey::UserOverrides(user_id),
                PermissionCachePayload::UserOverrides(vec![]),
            )
            .await;
        cache
            .set(
                PermissionCacheKey::Profile(user_id),
                PermissionCachePayload::Profile(None),
            )
            .await;

        cache
            .invalidate_dataset(PermissionDataset::UserOverrides)
            .await;

        assert!(
            cache
                .get(&PermissionCacheKey::UserOverrides(user_id))
                .await
                .is_none()
        );
        assert!(cache.get(&PermissionCacheKey::Projects).await.is_some());
        assert!(cache.get(&PermissionCacheKey::Profile(user_id)).await.is_some());
    }

    #[tokio::test]
    async fn invalidation_is_idempotent() {
        let cache = InMemoryPermissionCache::new();
        cache.invalidate(&PermissionCacheKey::Projects).await;
        cache
            .set(PermissionCacheKey::Projects, projects_payload())
            .await;
        cache.invalidate(&PermissionCacheKey::Projects).await;
        cache.invalidate(&PermissionCacheKey::Projects).await;
        assert!(cache.get(&PermissionCacheKey::Projects).await.is_none());

        cache.invalidate_all().await;
        cache.invalidate_all().await;
    }
}
